//! Configuration loading and management
//!
//! Resolves the yap home (`--home`, `YAP_HOME`, `~/.yap`) and parses the
//! optional `<home>/config.toml`.

use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, IoContext, Result};
use crate::sort::SortKey;

/// Home used when neither `--home` nor `YAP_HOME` is given
pub const DEFAULT_HOME: &str = "~/.yap";

/// Environment variable that overrides the home directory
pub const HOME_ENV: &str = "YAP_HOME";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// List command settings
    #[serde(default)]
    pub list: ListConfig,
}

/// Settings for `yap list`
#[derive(Debug, Clone, Deserialize)]
pub struct ListConfig {
    /// Max rows shown by `list completed` (0 = no limit)
    #[serde(default = "default_completed_limit")]
    pub completed_limit: usize,

    /// Ordering of `list pending`: created or due
    #[serde(default = "default_pending_sort")]
    pub pending_sort: SortKey,
}

fn default_completed_limit() -> usize {
    20
}

fn default_pending_sort() -> SortKey {
    SortKey::Created
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            completed_limit: default_completed_limit(),
            pending_sort: default_pending_sort(),
        }
    }
}

impl Config {
    /// Load configuration from a `config.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::InvalidConfig(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration if the file exists, defaults otherwise
    ///
    /// A file that exists but does not parse is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        match self.list.pending_sort {
            SortKey::Created | SortKey::Due => Ok(()),
            other => Err(Error::InvalidConfig(format!(
                "list.pending_sort must be created or due, not {}",
                serde_json::to_string(&other)?
            ))),
        }
    }
}

/// Pick the home directory: explicit value (flag or `YAP_HOME`), else
/// [`DEFAULT_HOME`]. A leading `~` is expanded.
pub fn resolve_home(explicit: Option<&Path>) -> Result<PathBuf> {
    let raw = explicit.unwrap_or_else(|| Path::new(DEFAULT_HOME));
    if raw.as_os_str().is_empty() {
        return Err(Error::InvalidConfig("home directory cannot be empty".to_string()));
    }
    expand_tilde(raw)
}

/// Replace a leading `~` component with the user's home directory.
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => {
            let base = directories::BaseDirs::new().ok_or_else(|| {
                Error::InvalidConfig("cannot determine the user's home directory".to_string())
            })?;
            Ok(base.home_dir().join(components.as_path()))
        }
        _ => Ok(path.to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_expected() {
        let cfg = Config::default();
        assert_eq!(cfg.list.completed_limit, 20);
        assert_eq!(cfg.list.pending_sort, SortKey::Created);
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[list]
completed_limit = 5
pending_sort = "due"
"#,
        )
        .unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.list.completed_limit, 5);
        assert_eq!(cfg.list.pending_sort, SortKey::Due);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[list]\ncompleted_limit = 0\n").unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.list.completed_limit, 0);
        assert_eq!(cfg.list.pending_sort, SortKey::Created);
    }

    #[test]
    fn invalid_pending_sort_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[list]\npending_sort = \"completed\"\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(m) if m.contains("pending_sort")));
    }

    #[test]
    fn malformed_file_is_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[list\n").unwrap();

        assert!(matches!(
            Config::load_or_default(&path),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn load_or_default_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_or_default(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg.list.completed_limit, 20);
    }

    #[test]
    fn explicit_home_wins() {
        let home = resolve_home(Some(Path::new("/tmp/elsewhere"))).unwrap();
        assert_eq!(home, PathBuf::from("/tmp/elsewhere"));
    }

    #[test]
    fn tilde_is_expanded() {
        let home = resolve_home(None).unwrap();
        assert!(!home.starts_with("~"));
        assert!(home.ends_with(".yap"));

        let nested = expand_tilde(Path::new("~/notes/yap")).unwrap();
        assert!(nested.ends_with("notes/yap"));
        assert!(!nested.starts_with("~"));
    }

    #[test]
    fn tilde_inside_path_is_left_alone() {
        let path = expand_tilde(Path::new("/srv/~/yap")).unwrap();
        assert_eq!(path, PathBuf::from("/srv/~/yap"));
    }
}
