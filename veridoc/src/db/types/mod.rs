// SPDX-License-Identifier: AGPL-3.0-or-later

//! Domain types handed between the stores, the HTTP handlers and the visit logger.
mod document;
mod visit;

pub use document::{Document, DocumentFields};
pub use visit::{NewVisit, Visit};
