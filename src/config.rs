use std::path::{Path, PathBuf};

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 旧版按行定位的位置文件 (system.location)
    pub location_file: PathBuf,
    /// 结构化位置配置 (system.toml)，存在时优先使用
    pub location_toml: PathBuf,
    /// 参数模板文件 (Arguments.template)
    pub template_file: PathBuf,
    /// 相对路径的根目录
    pub root: PathBuf,
    /// 重命名时只挑选该扩展名的文件，None 表示不过滤
    pub rename_extension: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        let exe_dir = exe_dir();
        Self {
            location_file: exe_dir.join("system.location"),
            location_toml: exe_dir.join("system.toml"),
            template_file: exe_dir.join("Arguments.template"),
            root: default_root(),
            rename_extension: None,
            verbose_logging: false,
            output_log_file: "plate_console.log".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            location_file: std::env::var("PLATE_LOCATION_FILE").map(PathBuf::from).unwrap_or(default.location_file),
            location_toml: std::env::var("PLATE_LOCATION_TOML").map(PathBuf::from).unwrap_or(default.location_toml),
            template_file: std::env::var("PLATE_TEMPLATE_FILE").map(PathBuf::from).unwrap_or(default.template_file),
            root: std::env::var("PLATE_ROOT").map(PathBuf::from).unwrap_or(default.root),
            rename_extension: std::env::var("PLATE_RENAME_EXTENSION")
                .ok()
                .map(|v| v.trim().trim_start_matches('.').to_string())
                .filter(|v| !v.is_empty())
                .or(default.rename_extension),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("PLATE_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }

    /// 以指定目录为基准构造配置（测试和便携部署使用）
    pub fn rooted_at(base_dir: &Path, root: &Path) -> Self {
        Self {
            location_file: base_dir.join("system.location"),
            location_toml: base_dir.join("system.toml"),
            template_file: base_dir.join("Arguments.template"),
            root: root.to_path_buf(),
            ..Self::default()
        }
    }
}

/// 可执行文件所在目录，取不到时退回当前目录
fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_root() -> PathBuf {
    std::env::var("ProgramFiles(x86)")
        .or_else(|_| std::env::var("ProgramFiles"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/opt"))
}
