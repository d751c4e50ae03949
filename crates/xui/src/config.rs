//! CLI configuration: a thin wrapper around `xui_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--host, --port, --username, etc.).

use xui_api::PanelConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use xui_config::{Config, Profile, config_path, load_config_or_default, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Apply connection flag overrides onto a profile.
fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if let Some(port) = global.port {
        profile.port = port;
    }
    if let Some(ref path) = global.path {
        profile.path.clone_from(path);
    }
    if let Some(ref scheme) = global.scheme {
        profile.scheme.clone_from(scheme);
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
}

/// Build the `PanelConfig` for this invocation.
///
/// Uses the active profile when one exists; otherwise `--host` (or
/// `XUI_HOST`) alone is enough, with the remaining settings defaulted.
/// Returns the profile name alongside for error messages.
pub fn resolve_panel_config(global: &GlobalOpts) -> Result<(PanelConfig, String), CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
            available.sort();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None => {
            let Some(ref host) = global.host else {
                return Err(CliError::NoConfig {
                    path: config_path().display().to_string(),
                });
            };
            Profile::new(host.clone())
        }
    };

    apply_overrides(&mut profile, global);

    let panel = xui_config::profile_to_panel_config(&profile, &profile_name, &cfg.defaults)?;
    Ok((panel, profile_name))
}
