// config.rs — Where the gate sends people (`[gate]` in config.toml).

use serde::{Deserialize, Serialize};

use crate::error::GateError;

/// Destinations and public patterns used by [`AccessGate`](crate::AccessGate).
///
/// Surfaces match their exact path and anything below it, so
/// `/onboarding/step-2` is still the onboarding surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GateConfig {
    /// Where unauthenticated actors are sent.
    #[serde(default = "default_entry_point")]
    pub entry_point: String,

    /// Where authenticated actors land when they ask for a public-only page.
    #[serde(default = "default_destination")]
    pub default_destination: String,

    #[serde(default = "default_password_change_path")]
    pub password_change_path: String,

    #[serde(default = "default_onboarding_path")]
    pub onboarding_path: String,

    /// Public-only destinations (glob patterns). The entry point is always
    /// one of them.
    #[serde(default = "default_public_patterns")]
    pub public_patterns: Vec<String>,
}

fn default_entry_point() -> String {
    "/".to_string()
}

fn default_destination() -> String {
    "/dashboard".to_string()
}

fn default_password_change_path() -> String {
    "/change-password".to_string()
}

fn default_onboarding_path() -> String {
    "/onboarding".to_string()
}

fn default_public_patterns() -> Vec<String> {
    vec!["/login".to_string(), "/signup".to_string()]
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            entry_point: default_entry_point(),
            default_destination: default_destination(),
            password_change_path: default_password_change_path(),
            onboarding_path: default_onboarding_path(),
            public_patterns: default_public_patterns(),
        }
    }
}

impl GateConfig {
    /// Reject patterns the glob crate cannot parse. At evaluation time a bad
    /// pattern simply never matches, so this is the only place it surfaces.
    pub fn validate(&self) -> Result<(), GateError> {
        for pattern in &self.public_patterns {
            glob::Pattern::new(pattern).map_err(|e| GateError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
        }
        for path in [
            &self.entry_point,
            &self.default_destination,
            &self.password_change_path,
            &self.onboarding_path,
        ] {
            if !path.starts_with('/') {
                return Err(GateError::InvalidSurface(path.clone()));
            }
        }
        Ok(())
    }
}
