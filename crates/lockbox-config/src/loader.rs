// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `/etc/lockbox/lockbox.toml`, then
//! `~/.config/lockbox/lockbox.toml`, then `./lockbox.toml`, with `LOCKBOX_*`
//! environment variables applied last.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::LockboxConfig;

const SYSTEM_CONFIG: &str = "/etc/lockbox/lockbox.toml";
const LOCAL_CONFIG: &str = "lockbox.toml";

/// Section prefixes for environment keys, most specific first.
const ENV_SECTIONS: &[(&str, &str)] = &[
    ("bot_webhook_", "bot.webhook."),
    ("bot_", "bot."),
    ("logger_", "logger."),
    ("server_", "server."),
    ("storage_", "storage."),
    ("secrets_", "secrets."),
];

/// The XDG hierarchy, lowest priority first.
pub fn standard_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("lockbox").join(LOCAL_CONFIG));
    }
    paths.push(PathBuf::from(LOCAL_CONFIG));
    paths
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<LockboxConfig, figment::Error> {
    build_figment(None).extract()
}

/// Load configuration with an explicit file layered above the standard hierarchy.
pub fn load_config_from_path(path: &Path) -> Result<LockboxConfig, figment::Error> {
    build_figment(Some(path)).extract()
}

/// Load configuration from a TOML string only. Used by tests.
pub fn load_config_from_str(toml_content: &str) -> Result<LockboxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LockboxConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Build the layered Figment before extraction.
pub fn build_figment(explicit: Option<&Path>) -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(LockboxConfig::default()));
    for path in standard_paths() {
        figment = figment.merge(Toml::file(path));
    }
    if let Some(path) = explicit {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env_provider())
}

/// `LOCKBOX_SECRETS_BOT_TOKEN` must land on `secrets.bot_token`, so keys are
/// mapped by known section prefix rather than split on every underscore.
fn env_provider() -> Env {
    Env::prefixed("LOCKBOX_").map(|key| env_key_to_path(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env key to its dotted config path.
pub fn env_key_to_path(key: &str) -> String {
    ENV_SECTIONS
        .iter()
        .find_map(|(prefix, section)| {
            key.strip_prefix(prefix)
                .map(|rest| format!("{section}{rest}"))
        })
        .unwrap_or_else(|| key.to_string())
}
