// SPDX-License-Identifier: AGPL-3.0-or-later

mod client;
mod config;
mod db;
mod helpers;
mod node;
mod runner;

pub use client::{http_test_client, login, TestClient};
pub use config::TestConfiguration;
pub use db::initialize_db;
pub use helpers::sample_fields;
pub use node::TestNode;
pub use runner::test_runner;
