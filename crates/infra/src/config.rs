//! Process configuration, read from environment variables.
//!
//! | variable                   | default   |
//! |----------------------------|-----------|
//! | `SCRIVENER_ID_PREFIX`      | `E`       |
//! | `SCRIVENER_RETAIN_DELETED` | `false`   |
//! | `RUST_LOG`                 | `info`    |

use crate::repository::DeletionPolicy;

pub const ID_PREFIX_VAR: &str = "SCRIVENER_ID_PREFIX";
pub const RETAIN_DELETED_VAR: &str = "SCRIVENER_RETAIN_DELETED";
pub const LOG_FILTER_VAR: &str = "RUST_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Prefix for generated editor ids (`E` gives `E1`, `E2`, ...).
    pub id_prefix: String,
    pub deletion_policy: DeletionPolicy,
    /// `tracing-subscriber` filter directive.
    pub log_filter: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            id_prefix: "E".to_string(),
            deletion_policy: DeletionPolicy::ReleaseSlot,
            log_filter: "info".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    ///
    /// Blank values count as unset. An unparseable boolean keeps the default
    /// and logs a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let id_prefix = get(ID_PREFIX_VAR)
            .map(|v| v.trim().to_string())
            .unwrap_or(defaults.id_prefix);

        let deletion_policy = match get(RETAIN_DELETED_VAR) {
            None => defaults.deletion_policy,
            Some(raw) => match raw.trim().to_ascii_lowercase().parse::<bool>() {
                Ok(true) => DeletionPolicy::RetainHistory,
                Ok(false) => DeletionPolicy::ReleaseSlot,
                Err(_) => {
                    tracing::warn!(
                        value = %raw,
                        "{RETAIN_DELETED_VAR} is not true/false; using default"
                    );
                    defaults.deletion_policy
                }
            },
        };

        let log_filter = get(LOG_FILTER_VAR).unwrap_or(defaults.log_filter);

        Self {
            id_prefix,
            deletion_policy,
            log_filter,
        }
    }
}
