//! 位置配置解析服务 - 业务能力层
//!
//! 只负责"把一个配置项解析成绝对路径"这一能力。
//! 每次查询都重新读取配置文件，不做缓存。

use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError};
use crate::models::location::{LocationKey, TargetCheck};
use crate::models::loaders::load_location_toml;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// 协议路径模板中的板变量占位符
pub const PLATE_VAR_PLACEHOLDER: &str = "{plateVar}";

/// 读取按行定位的配置文件：跳过前 `line_offset` 行，返回下一行去掉首尾空白后的内容
///
/// 文件不存在返回 `ConfigNotFound`，目标行不存在或为空返回 `ConfigValueMissing`。
pub fn resolve(file_path: &Path, line_offset: usize) -> AppResult<String> {
    let key = LocationKey::from_offset(line_offset)
        .map(LocationKey::name)
        .unwrap_or("value");
    resolve_line(file_path, line_offset, key)
}

fn resolve_line(file_path: &Path, line_offset: usize, key: &'static str) -> AppResult<String> {
    if !file_path.is_file() {
        return Err(ConfigError::ConfigNotFound {
            path: file_path.to_path_buf(),
        }
        .into());
    }

    let file = File::open(file_path).map_err(|source| ConfigError::ReadFailed {
        path: file_path.to_path_buf(),
        source,
    })?;

    let line = match BufReader::new(file).lines().nth(line_offset) {
        Some(Ok(line)) => line,
        Some(Err(source)) => {
            return Err(ConfigError::ReadFailed {
                path: file_path.to_path_buf(),
                source,
            }
            .into())
        }
        None => return Err(AppError::value_missing(file_path, Some(line_offset), key)),
    };

    let value = line.trim();
    if value.is_empty() {
        return Err(AppError::value_missing(file_path, Some(line_offset), key));
    }
    Ok(value.to_string())
}

/// 位置配置的来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationSource {
    /// 结构化 TOML 文件
    Structured(PathBuf),
    /// 旧版按行定位文件
    Positional(PathBuf),
}

/// 位置配置解析器
///
/// 职责：
/// - 按名称查询处理程序、输出目录、协议文件、数据目录、查看器
/// - 把相对路径拼接到根目录上
/// - 按配置项要求检查路径是否存在
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    source: LocationSource,
    root: PathBuf,
}

impl ConfigResolver {
    pub fn new(source: LocationSource, root: impl Into<PathBuf>) -> Self {
        Self {
            source,
            root: root.into(),
        }
    }

    /// 根据程序配置选择来源：TOML 文件存在时优先，否则使用旧版位置文件
    pub fn from_config(config: &Config) -> Self {
        let source = if config.location_toml.is_file() {
            LocationSource::Structured(config.location_toml.clone())
        } else {
            LocationSource::Positional(config.location_file.clone())
        };
        debug!("位置配置来源: {:?}", source);
        Self::new(source, config.root.clone())
    }

    pub fn source(&self) -> &LocationSource {
        &self.source
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 读取某个配置项的原始文本
    pub fn raw(&self, key: LocationKey) -> AppResult<String> {
        match &self.source {
            LocationSource::Positional(path) => resolve_line(path, key.offset(), key.name()),
            LocationSource::Structured(path) => {
                if !path.is_file() {
                    return Err(ConfigError::ConfigNotFound { path: path.clone() }.into());
                }
                let file = load_location_toml(path)?;
                file.get(key)
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .ok_or_else(|| AppError::value_missing(path, None, key.name()))
            }
        }
    }

    /// 把配置值拼接到根目录上并按要求检查存在性（绝对路径原样保留）
    pub fn resolve_target(&self, key: LocationKey, value: &str) -> AppResult<PathBuf> {
        let target = self.root.join(value);
        let exists = match key.check() {
            TargetCheck::File | TargetCheck::FileAfterSubstitution => target.is_file(),
            TargetCheck::Directory => target.is_dir(),
            TargetCheck::None => true,
        };
        if !exists {
            return Err(AppError::target_missing(key.name(), target));
        }
        Ok(target)
    }

    /// 处理程序可执行文件
    pub fn processor(&self) -> AppResult<PathBuf> {
        let value = self.raw(LocationKey::Processor)?;
        self.resolve_target(LocationKey::Processor, &value)
    }

    /// 读板仪输出目录
    pub fn output_dir(&self) -> AppResult<PathBuf> {
        let value = self.raw(LocationKey::OutputDir)?;
        self.resolve_target(LocationKey::OutputDir, &value)
    }

    /// 协议文件路径，替换 `{plateVar}` 之后再检查是否存在
    pub fn protocol_path(&self, plate_var: &str) -> AppResult<PathBuf> {
        let template = self.raw(LocationKey::Protocol)?;
        let value = template.replace(PLATE_VAR_PLACEHOLDER, plate_var);
        self.resolve_target(LocationKey::Protocol, &value)
    }

    /// 数据/合并输出目录
    pub fn data_dir(&self) -> AppResult<PathBuf> {
        let value = self.raw(LocationKey::DataDir)?;
        self.resolve_target(LocationKey::DataDir, &value)
    }

    /// 表格查看器，不检查存在性，交给启动时报错
    pub fn viewer(&self) -> AppResult<PathBuf> {
        let value = self.raw(LocationKey::Viewer)?;
        self.resolve_target(LocationKey::Viewer, &value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// 按行写出旧版位置文件
    fn write_positional(dir: &Path, lines: &[&str]) -> PathBuf {
        let path = dir.join("system.location");
        fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    #[test]
    fn test_resolve_trims_target_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_positional(dir.path(), &["# cli", "  Tool/cli.exe  ", "# out", "Out"]);

        assert_eq!(resolve(&path, 1).unwrap(), "Tool/cli.exe");
        assert_eq!(resolve(&path, 3).unwrap(), "Out");
    }

    #[test]
    fn test_resolve_short_file_is_missing_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_positional(dir.path(), &["a", "b", "c"]);

        let err = resolve(&path, 3).unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::ConfigValueMissing { offset: Some(3), .. })
        ));
    }

    #[test]
    fn test_resolve_blank_line_is_missing_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_positional(dir.path(), &["a", "   ", "c"]);

        let err = resolve(&path, 1).unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::ConfigValueMissing { key: "processor", .. })
        ));
    }

    #[test]
    fn test_resolve_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve(&dir.path().join("system.location"), 1).unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_named_lookups_check_existence() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        fs::create_dir_all(root.join("Tool")).unwrap();
        fs::create_dir_all(root.join("Out")).unwrap();
        fs::write(root.join("Tool/cli.exe"), "").unwrap();
        fs::write(root.join("Tool/protocol_A.assay"), "").unwrap();

        let path = write_positional(
            dir.path(),
            &[
                "# cli",
                "Tool/cli.exe",
                "# out",
                "Out",
                "# protocol",
                "Tool/protocol_{plateVar}.assay",
                "# data",
                "Missing",
                "# viewer",
                "viewer.exe",
            ],
        );
        let resolver = ConfigResolver::new(LocationSource::Positional(path), &root);

        assert_eq!(resolver.processor().unwrap(), root.join("Tool/cli.exe"));
        assert_eq!(resolver.output_dir().unwrap(), root.join("Out"));
        assert_eq!(
            resolver.protocol_path("A").unwrap(),
            root.join("Tool/protocol_A.assay")
        );
        assert!(matches!(
            resolver.protocol_path("B").unwrap_err(),
            AppError::Config(ConfigError::ConfigTargetMissing { key: "protocol", .. })
        ));
        assert!(matches!(
            resolver.data_dir().unwrap_err(),
            AppError::Config(ConfigError::ConfigTargetMissing { key: "data_dir", .. })
        ));
        // 查看器不检查存在性
        assert_eq!(resolver.viewer().unwrap(), root.join("viewer.exe"));
    }

    #[test]
    fn test_structured_source_matches_positional() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        fs::create_dir_all(root.join("Out")).unwrap();

        let toml_path = dir.path().join("system.toml");
        fs::write(&toml_path, "output_dir = 'Out'\nviewer = ''\n").unwrap();
        let resolver = ConfigResolver::new(LocationSource::Structured(toml_path), &root);

        assert_eq!(resolver.output_dir().unwrap(), root.join("Out"));
        assert!(matches!(
            resolver.viewer().unwrap_err(),
            AppError::Config(ConfigError::ConfigValueMissing { offset: None, key: "viewer", .. })
        ));
    }

    #[test]
    fn test_from_config_prefers_toml() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::rooted_at(dir.path(), dir.path());

        let resolver = ConfigResolver::from_config(&config);
        assert_eq!(resolver.source(), &LocationSource::Positional(config.location_file.clone()));

        fs::write(&config.location_toml, "").unwrap();
        let resolver = ConfigResolver::from_config(&config);
        assert_eq!(resolver.source(), &LocationSource::Structured(config.location_toml.clone()));
    }
}
