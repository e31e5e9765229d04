// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::Serialize;
use veridoc::Configuration;

const CONFIG_FILE_NAME: &str = "config.toml";

type ConfigFilePath = Option<PathBuf>;

/// Get configuration from 1. .toml file, 2. environment variables and 3. command line arguments
/// (in that order, meaning that later configuration sources take precedence over the earlier
/// ones).
pub fn load_config() -> Result<(ConfigFilePath, Configuration)> {
    // Parse command line arguments first to get optional config file path
    let cli = Cli::parse();

    // Determine if a config file path was provided or if we should look for it in the current
    // directory
    let config_file_path: ConfigFilePath = match &cli.config {
        Some(path) => {
            if !path.exists() {
                bail!("Config file '{}' does not exist", path.display());
            }

            Some(path.clone())
        }
        None => try_determine_config_file_path(),
    };

    let mut figment = Figment::from(Serialized::defaults(Configuration::default()));
    if let Some(path) = &config_file_path {
        figment = figment.merge(Toml::file(path));
    }

    let config = figment
        .merge(Env::raw())
        .merge(Serialized::defaults(cli))
        .extract()?;

    Ok((config_file_path, config))
}

/// Configuration derived from command line arguments.
///
/// All arguments are optional and don't get serialized to Figment when they're None. This is to
/// assure that default values do not overwrite all previous settings, especially when they haven't
/// been set.
#[derive(Parser, Serialize, Debug)]
#[command(
    name = "veridoc",
    about = "Document verification web service",
    long_about = None,
    version
)]
struct Cli {
    /// Path to an optional "config.toml" file for further configuration.
    ///
    /// When not set the program will try to find a `config.toml` file in the same folder the
    /// program is executed in.
    #[arg(short = 'c', long, value_name = "PATH")]
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<PathBuf>,

    /// URL / connection string to PostgreSQL or SQLite database. Defaults to an in-memory SQLite
    /// database.
    ///
    /// WARNING: By default your documents will not persist after shutdown. Set a database
    /// connection url for production settings to not loose data.
    #[arg(short = 'd', long, value_name = "CONNECTION_STRING")]
    #[serde(skip_serializing_if = "Option::is_none")]
    database_url: Option<String>,

    /// Maximum number of connections that the database pool should maintain. Defaults to 32.
    #[arg(long, value_name = "COUNT")]
    #[serde(skip_serializing_if = "Option::is_none")]
    database_max_connections: Option<u32>,

    /// HTTP port serving the verification pages and the admin API. Defaults to 3000.
    #[arg(short = 'p', long, value_name = "PORT")]
    #[serde(skip_serializing_if = "Option::is_none")]
    http_port: Option<u16>,

    /// Username checked by the admin login endpoint.
    ///
    /// WARNING: The development default is "admin", always set your own credentials for
    /// production settings.
    #[arg(short = 'u', long, value_name = "USERNAME")]
    #[serde(skip_serializing_if = "Option::is_none")]
    admin_username: Option<String>,

    /// Password checked by the admin login endpoint.
    #[arg(short = 'w', long, value_name = "PASSWORD")]
    #[serde(skip_serializing_if = "Option::is_none")]
    admin_password: Option<String>,

    /// Lifetime of an authenticated admin session in seconds. Defaults to 24 hours.
    #[arg(long, value_name = "SECONDS")]
    #[serde(skip_serializing_if = "Option::is_none")]
    session_ttl_secs: Option<u64>,

    /// Fixed prefix for generated document numbers. Defaults to "DOC".
    #[arg(long, value_name = "PREFIX")]
    #[serde(skip_serializing_if = "Option::is_none")]
    document_number_prefix: Option<String>,

    /// Path to a MaxMind country database file used to geolocate verification-page visits.
    ///
    /// When not set, visits are still recorded but without country information.
    #[arg(short = 'g', long, value_name = "PATH")]
    #[serde(skip_serializing_if = "Option::is_none")]
    geoip_database_path: Option<PathBuf>,

    /// Directory holding the static HTML templates.
    #[arg(short = 't', long, value_name = "PATH")]
    #[serde(skip_serializing_if = "Option::is_none")]
    templates_base_path: Option<PathBuf>,
}

fn try_determine_config_file_path() -> Option<PathBuf> {
    // Find config file in current folder
    let mut current_dir = std::env::current_dir().expect("Could not determine current directory");
    current_dir.push(CONFIG_FILE_NAME);

    if current_dir.exists() {
        Some(current_dir)
    } else {
        None
    }
}
