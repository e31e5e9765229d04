// SPDX-License-Identifier: AGPL-3.0-or-later

//! Implementations of all storage operations on [`crate::db::SqlStore`].
mod document;
mod visit;

pub use document::{mint_verify_token, next_document_number};
