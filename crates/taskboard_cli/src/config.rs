//! Runtime configuration resolved from the environment.
//!
//! | variable              | default                             |
//! |-----------------------|-------------------------------------|
//! | `TASKBOARD_DB_PATH`   | `<temp_dir>/taskboard.sqlite3`      |
//! | `TASKBOARD_LOG_LEVEL` | `debug` (debug build) / `info`      |
//! | `TASKBOARD_LOG_DIR`   | unset: file logging disabled        |

use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "TASKBOARD_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "TASKBOARD_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "TASKBOARD_LOG_DIR";
const DEFAULT_DB_FILE_NAME: &str = "taskboard.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskboardConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl TaskboardConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: read(LOG_LEVEL_VAR)
                .unwrap_or_else(|| taskboard_core::default_log_level().to_string()),
            log_dir: read(LOG_DIR_VAR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TaskboardConfig, DB_PATH_VAR, LOG_DIR_VAR, LOG_LEVEL_VAR};
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn defaults_apply_when_unset_or_blank() {
        let config = TaskboardConfig::from_lookup(|name| {
            (name == LOG_DIR_VAR).then(|| "   ".to_string())
        });
        assert_eq!(
            config.db_path,
            std::env::temp_dir().join("taskboard.sqlite3")
        );
        assert_eq!(config.log_level, taskboard_core::default_log_level());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn explicit_values_are_trimmed() {
        let vars = HashMap::from([
            (DB_PATH_VAR, " /data/board.sqlite3 "),
            (LOG_LEVEL_VAR, "warn"),
            (LOG_DIR_VAR, "/var/log/taskboard"),
        ]);
        let config =
            TaskboardConfig::from_lookup(|name| vars.get(name).map(|value| value.to_string()));
        assert_eq!(config.db_path, PathBuf::from("/data/board.sqlite3"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir.as_deref(), Some("/var/log/taskboard"));
    }
}
