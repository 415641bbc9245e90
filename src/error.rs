use std::path::PathBuf;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 位置配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 参数模板错误
    #[error("模板错误: {0}")]
    Template(#[from] TemplateError),
    /// 用户选择不完整
    #[error("输入错误: {0}")]
    Selection(#[from] SelectionError),
    /// 启动外部程序错误
    #[error("启动错误: {0}")]
    Launch(#[from] LaunchError),
    /// 合并 CSV 错误
    #[error("合并错误: {0}")]
    Merge(#[from] MergeError),
    /// 文件操作错误
    #[error("文件错误 ({}): {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 位置配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件不存在
    #[error("缺少配置文件: {}", path.display())]
    ConfigNotFound { path: PathBuf },
    /// 指定行（或字段）不存在或为空
    #[error("配置文件 {} 中 [{key}]{} 为空或不存在", path.display(), describe_offset(*offset))]
    ConfigValueMissing {
        path: PathBuf,
        offset: Option<usize>,
        key: &'static str,
    },
    /// 解析出的路径在磁盘上不存在
    #[error("[{key}] 指向的路径不存在: {}", target.display())]
    ConfigTargetMissing { key: &'static str, target: PathBuf },
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({}): {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({}): {source}", path.display())]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// 参数模板错误
#[derive(Debug, Error)]
pub enum TemplateError {
    /// 模板文件不存在
    #[error("参数模板不存在: {}", path.display())]
    TemplateMissing { path: PathBuf },
    /// 模板没有可用的行
    #[error("参数模板没有可用的参数行: {}", path.display())]
    TemplateEmpty { path: PathBuf },
    /// 读取模板失败
    #[error("读取参数模板失败 ({}): {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 用户选择错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// 没有选择板类型或没有输入条码
    #[error("请先选择板类型并输入条码")]
    MissingSelection,
    /// 未选择板数
    #[error("请先选择板数")]
    NoPlatesSelected,
    /// 文件尚未重命名确认
    #[error("文件尚未处理，请先处理样本文件")]
    FilesNotProcessed,
}

/// 启动外部程序错误
#[derive(Debug, Error)]
pub enum LaunchError {
    /// 无法启动进程
    #[error("第 {plate} 板启动失败 ({}): {source}", program.display())]
    LaunchFailed {
        plate: usize,
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 合并 CSV 错误
#[derive(Debug, Error)]
pub enum MergeError {
    /// 没有匹配条码的文件
    #[error("没有与条码 {identifier} 匹配的 CSV 文件")]
    NoMatchingFiles { identifier: String },
    /// 第一个文件没有表头
    #[error("文件没有非空表头行: {}", path.display())]
    MissingHeader { path: PathBuf },
    /// 打开表格查看器失败
    #[error("打开表格查看器失败 ({}): {source}", viewer.display())]
    ViewerLaunchFailed {
        viewer: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn describe_offset(offset: Option<usize>) -> String {
    offset.map(|o| format!(" (第 {} 行)", o)).unwrap_or_default()
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件操作错误
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }

    /// 创建配置值缺失错误
    pub fn value_missing(path: impl Into<PathBuf>, offset: Option<usize>, key: &'static str) -> Self {
        AppError::Config(ConfigError::ConfigValueMissing {
            path: path.into(),
            offset,
            key,
        })
    }

    /// 创建配置目标不存在错误
    pub fn target_missing(key: &'static str, target: impl Into<PathBuf>) -> Self {
        AppError::Config(ConfigError::ConfigTargetMissing {
            key,
            target: target.into(),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
