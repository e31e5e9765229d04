// SPDX-License-Identifier: AGPL-3.0-or-later

/// `Document` storage errors.
#[derive(thiserror::Error, Debug)]
pub enum DocumentStorageError {
    /// Error returned from the database.
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// Two racing creations exhausted all allocation attempts for a fresh document number.
    #[error("could not allocate a unique document number after {0} attempts")]
    NumberAllocation(u32),
}

/// Visit log storage errors.
#[derive(thiserror::Error, Debug)]
pub enum VisitStorageError {
    /// Error returned from the database.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
