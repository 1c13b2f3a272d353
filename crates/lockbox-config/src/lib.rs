// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Lockbox credential bot.
//!
//! TOML files are layered over compiled defaults following the XDG
//! hierarchy, then `LOCKBOX_*` environment variables are applied on top.
//! Secrets (bot token, webhook secret, encryption key) are expected to come
//! from the environment. Every struct rejects unknown keys, and failures are
//! reported as miette diagnostics with typo suggestions.
//!
//! ```no_run
//! use lockbox_config::load_and_validate;
//!
//! let config = load_and_validate(None).expect("config errors");
//! println!("listening on {}:{}", config.server.host, config.server.port);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::LockboxConfig;

/// Load configuration and validate it.
///
/// With `explicit` set, that file is layered above the XDG hierarchy.
/// Figment errors are converted into diagnostics that point into the
/// offending TOML file when possible.
pub fn load_and_validate(explicit: Option<&Path>) -> Result<LockboxConfig, Vec<ConfigError>> {
    let loaded = match explicit {
        Some(path) => loader::load_config_from_path(path),
        None => loader::load_config(),
    };

    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = collect_toml_sources(explicit);
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from a TOML string (no files, no environment) and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<LockboxConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Read every candidate TOML file so diagnostics can show source spans.
fn collect_toml_sources(explicit: Option<&Path>) -> Vec<(String, String)> {
    let mut candidates = loader::standard_paths();
    if let Some(path) = explicit {
        candidates.push(path.to_path_buf());
    }

    candidates
        .into_iter()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
