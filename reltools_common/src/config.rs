use crate::{AppConfig, RelToolsError};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "reltools.toml";

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub path: PathBuf,
    pub exists: bool,
    pub portable: bool,
}

pub fn load_config(prefer_portable: bool) -> Result<LoadedConfig, RelToolsError> {
    let (path, portable) = resolve_config_path(prefer_portable)?;
    let mut loaded = load_config_from(&path)?;
    loaded.portable = portable;
    Ok(loaded)
}

/// Load a config from an explicit path, falling back to defaults when it is absent
pub fn load_config_from(path: &Path) -> Result<LoadedConfig, RelToolsError> {
    let exists = path.exists();

    let config = if exists {
        let data = fs::read_to_string(path)?;
        toml::from_str(&data).map_err(|e| RelToolsError::Serialization(e.to_string()))?
    } else {
        AppConfig::default()
    };

    if config.unzip_workers == 0 {
        return Err(RelToolsError::Config(format!(
            "unzip_workers must be at least 1 in {}",
            path.display()
        )));
    }

    Ok(LoadedConfig {
        config,
        path: path.to_path_buf(),
        exists,
        portable: false,
    })
}

fn resolve_config_path(prefer_portable: bool) -> Result<(PathBuf, bool), RelToolsError> {
    if let Some(portable_path) = portable_config_path() {
        if prefer_portable || portable_path.exists() {
            return Ok((portable_path, true));
        }
    }

    let dirs = ProjectDirs::from("", "reltools", "reltools")
        .ok_or_else(|| RelToolsError::Config("Unable to determine config directory".to_string()))?;
    Ok((dirs.config_dir().join(CONFIG_FILE_NAME), false))
}

fn portable_config_path() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(|dir| dir.join(CONFIG_FILE_NAME)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExtractorKind;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let loaded = load_config_from(&temp_dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(!loaded.exists);
        assert_eq!(loaded.config.unzip_workers, 10);
    }

    #[test]
    fn test_reads_existing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "extractor = \"builtin\"\nbytecode_diff = true\n").unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert!(loaded.exists);
        assert_eq!(loaded.config.extractor, ExtractorKind::Builtin);
        assert!(loaded.config.bytecode_diff);
    }

    #[test]
    fn test_portable_is_reported_on_loaded_config_only() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        // older files may still carry the key; it is ignored
        fs::write(&path, "portable_mode = true\nunzip_workers = 4\n").unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert!(!loaded.portable);
        assert_eq!(loaded.config.unzip_workers, 4);
    }

    #[test]
    fn test_invalid_toml_is_serialization_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "unzip_workers = \"many\"").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, RelToolsError::Serialization(_)));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "unzip_workers = 0").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, RelToolsError::Config(_)));
    }
}
