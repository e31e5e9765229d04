// SPDX-License-Identifier: AGPL-3.0-or-later

//! # veridoc
//!
//! Document verification web service. Administrators register documents and
//! receive a sequential document number plus a random verification token,
//! third parties verify authenticity by visiting the token URL which renders
//! a templated confirmation page. Every public verification-page access is
//! recorded by a best-effort visit logger.
#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]

mod bus;
mod config;
mod context;
mod db;
mod geo;
mod http;
mod manager;
mod node;
mod templates;
mod visits;

#[cfg(test)]
mod test_utils;

pub use crate::config::Configuration;
pub use crate::node::Node;
