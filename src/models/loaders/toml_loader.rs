use crate::error::{AppResult, ConfigError};
use crate::models::location::LocationFile;
use std::fs;
use std::path::Path;

/// 从 TOML 文件加载结构化位置配置
pub fn load_location_toml(toml_path: &Path) -> AppResult<LocationFile> {
    let content = fs::read_to_string(toml_path).map_err(|source| ConfigError::ReadFailed {
        path: toml_path.to_path_buf(),
        source,
    })?;

    let file: LocationFile = toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
        path: toml_path.to_path_buf(),
        source,
    })?;

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_load_location_toml_bad_syntax() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("system.toml");
        fs::write(&path, "processor = ").unwrap();

        let err = load_location_toml(&path).unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::TomlParseFailed { .. })));
    }
}
