//! 位置配置数据模型
//!
//! 旧版 `system.location` 是按行定位的纯文本文件，每个偏移量代表一个含义；
//! 新版 `system.toml` 用显式字段名表达同一组值。

use serde::Deserialize;
use std::fmt::Display;

/// 位置配置中的各项取值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationKey {
    /// 处理程序可执行文件
    Processor,
    /// 读板仪输出目录
    OutputDir,
    /// 协议文件路径模板（可含 `{plateVar}`）
    Protocol,
    /// 数据/合并输出目录
    DataDir,
    /// 表格查看器可执行文件
    Viewer,
}

/// 解析后的路径需要做的存在性检查
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetCheck {
    /// 必须是已存在的文件
    File,
    /// 必须是已存在的目录
    Directory,
    /// 占位符替换后才检查文件
    FileAfterSubstitution,
    /// 不检查
    None,
}

impl LocationKey {
    pub const ALL: [LocationKey; 5] = [
        LocationKey::Processor,
        LocationKey::OutputDir,
        LocationKey::Protocol,
        LocationKey::DataDir,
        LocationKey::Viewer,
    ];

    /// 旧版位置文件中的行偏移（从 0 开始），一经定义不再改动
    pub fn offset(self) -> usize {
        match self {
            LocationKey::Processor => 1,
            LocationKey::OutputDir => 3,
            LocationKey::Protocol => 5,
            LocationKey::DataDir => 7,
            LocationKey::Viewer => 9,
        }
    }

    /// 结构化配置中的字段名
    pub fn name(self) -> &'static str {
        match self {
            LocationKey::Processor => "processor",
            LocationKey::OutputDir => "output_dir",
            LocationKey::Protocol => "protocol",
            LocationKey::DataDir => "data_dir",
            LocationKey::Viewer => "viewer",
        }
    }

    pub fn check(self) -> TargetCheck {
        match self {
            LocationKey::Processor => TargetCheck::File,
            LocationKey::OutputDir | LocationKey::DataDir => TargetCheck::Directory,
            LocationKey::Protocol => TargetCheck::FileAfterSubstitution,
            LocationKey::Viewer => TargetCheck::None,
        }
    }

    /// 按行偏移反查
    pub fn from_offset(offset: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.offset() == offset)
    }
}

impl Display for LocationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// `system.toml` 文件内容
///
/// 所有字段都是可选的，缺失的字段在查询时才报错，与旧版逐行读取的行为一致。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationFile {
    pub processor: Option<String>,
    pub output_dir: Option<String>,
    pub protocol: Option<String>,
    pub data_dir: Option<String>,
    pub viewer: Option<String>,
}

impl LocationFile {
    pub fn get(&self, key: LocationKey) -> Option<&str> {
        let value = match key {
            LocationKey::Processor => &self.processor,
            LocationKey::OutputDir => &self.output_dir,
            LocationKey::Protocol => &self.protocol,
            LocationKey::DataDir => &self.data_dir,
            LocationKey::Viewer => &self.viewer,
        };
        value.as_deref()
    }
}
