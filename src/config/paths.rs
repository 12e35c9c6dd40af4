//! Config file location
//!
//! First match wins: `FLUXTREE_CONFIG` naming the file itself,
//! `FLUXTREE_CONFIG_DIR` naming its directory, then the platform config
//! directory from `directories` (which honours `XDG_CONFIG_HOME` on Linux).

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.yaml";

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn platform_config_dir() -> PathBuf {
    ProjectDirs::from("io", "fluxcd", "fluxtree")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".fluxtree"))
}

/// Pick the config file from the explicit file, the directory override and the
/// platform default, in that order
fn resolve(
    file: Option<PathBuf>,
    dir: Option<PathBuf>,
    platform: impl FnOnce() -> PathBuf,
) -> PathBuf {
    file.unwrap_or_else(|| dir.unwrap_or_else(platform).join(CONFIG_FILE))
}

pub fn root_config_path() -> PathBuf {
    resolve(
        env_path("FLUXTREE_CONFIG"),
        env_path("FLUXTREE_CONFIG_DIR"),
        platform_config_dir,
    )
}

pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform() -> PathBuf {
        PathBuf::from("/platform/fluxtree")
    }

    #[test]
    fn test_explicit_file_wins() {
        let path = resolve(
            Some(PathBuf::from("/etc/fluxtree.yaml")),
            Some(PathBuf::from("/ignored")),
            platform,
        );
        assert_eq!(path, PathBuf::from("/etc/fluxtree.yaml"));
    }

    #[test]
    fn test_dir_override_then_platform() {
        assert_eq!(
            resolve(None, Some(PathBuf::from("/srv/cfg")), platform),
            PathBuf::from("/srv/cfg/config.yaml")
        );
        assert_eq!(
            resolve(None, None, platform),
            PathBuf::from("/platform/fluxtree/config.yaml")
        );
    }

    #[test]
    fn test_ensure_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        assert!(ensure_dir(Path::new("")).is_ok());
    }
}
