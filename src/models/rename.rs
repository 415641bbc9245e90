//! 重命名结果

use std::fmt::Display;
use std::path::PathBuf;
use std::time::SystemTime;

/// 单个文件的重命名结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameResult {
    /// 原文件名
    pub original: String,
    /// 目标文件名
    pub destination: String,
    /// 失败原因，成功时为 None
    pub error: Option<String>,
}

impl RenameResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl Display for RenameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.error {
            None => write!(f, "{} -> {}", self.original, self.destination),
            Some(e) => write!(f, "{} -> {}: {}", self.original, self.destination, e),
        }
    }
}

/// 一次重命名批次的汇总
#[derive(Debug, Clone, Default)]
pub struct RenameReport {
    pub results: Vec<RenameResult>,
}

impl RenameReport {
    pub fn successes(&self) -> impl Iterator<Item = &RenameResult> {
        self.results.iter().filter(|r| r.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &RenameResult> {
        self.results.iter().filter(|r| !r.is_success())
    }

    /// 有文件且全部成功
    pub fn all_succeeded(&self) -> bool {
        !self.results.is_empty() && self.results.iter().all(RenameResult::is_success)
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// 面向操作员的汇总文本
    pub fn summary(&self) -> String {
        if self.all_succeeded() {
            let mut text = String::from("已重命名文件:\n");
            for r in self.successes() {
                text.push_str(&format!("{}\n", r));
            }
            text
        } else {
            let mut text = String::from("部分文件无法重命名:\n");
            for r in self.failures() {
                text.push_str(&format!("{}\n", r));
            }
            text
        }
    }
}

/// 预览列表中的一个候选文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// 完整路径，重命名时直接使用，不从显示名重建
    pub path: PathBuf,
    /// 显示用文件名
    pub name: String,
    pub modified: SystemTime,
}

impl Display for CandidateFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let local: chrono::DateTime<chrono::Local> = self.modified.into();
        write!(f, "{}  ({})", self.name, local.format("%Y-%m-%d %H:%M"))
    }
}
