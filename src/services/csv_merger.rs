//! CSV 合并服务 - 业务能力层
//!
//! 把同一条码的各板 CSV 结果合并成一个文件：表头取第一个文件，
//! 每个文件跳过开头空行和自己的表头后，按文件名顺序依次拼接。

use crate::error::{AppError, AppResult, MergeError};
use crate::infrastructure::process_runner::ProcessRunner;
use crate::infrastructure::prompt::Prompt;
use crate::services::config_resolver::ConfigResolver;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 合并结果存放的子目录
pub const PROCESSED_DIR: &str = "Processed";

/// 一次合并的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// 已写出合并文件；查看器打开失败时附带原因，合并文件仍然有效
    Merged {
        path: PathBuf,
        sources: Vec<PathBuf>,
        viewer_error: Option<String>,
    },
    /// 操作员取消
    Declined,
}

/// 找出目录中以 `identifier` 开头、以 `.csv` 结尾的文件（只看顶层），按文件名排序
pub fn find_matches(data_dir: &Path, identifier: &str) -> AppResult<Vec<PathBuf>> {
    let entries = fs::read_dir(data_dir).map_err(|e| AppError::io(data_dir, e))?;
    let mut matches = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| AppError::io(data_dir, e))?;
        let name = entry.file_name().to_string_lossy().to_string();
        let is_csv = name.to_ascii_lowercase().ends_with(".csv");
        if !name.starts_with(identifier) || !is_csv {
            continue;
        }
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            matches.push(entry.path());
        }
    }

    matches.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(matches)
}

/// 合并后文件的路径：`{data_dir}/Processed/{identifier}_processed.csv`
pub fn merged_path(data_dir: &Path, identifier: &str) -> PathBuf {
    data_dir
        .join(PROCESSED_DIR)
        .join(format!("{}_processed.csv", identifier))
}

/// 按给定顺序合并 `identifier` 的结果文件并写出
pub fn merge_files(identifier: &str, files: &[PathBuf], output: &Path) -> AppResult<()> {
    let first = files.first().ok_or_else(|| MergeError::NoMatchingFiles {
        identifier: identifier.to_string(),
    })?;

    let first_content = read_csv(first)?;
    let header = first_content
        .lines()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| MergeError::MissingHeader { path: first.clone() })?
        .to_string();

    let mut merged = String::new();
    merged.push_str(&header);
    merged.push('\n');

    for file in files {
        let content = if file == first {
            first_content.clone()
        } else {
            read_csv(file)?
        };
        for line in body_lines(&content) {
            merged.push_str(line);
            merged.push('\n');
        }
    }

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;
    }
    fs::write(output, merged).map_err(|e| AppError::io(output, e))?;
    Ok(())
}

/// 跳过开头空行，再跳过一行表头，其余原样保留（包括空行）
fn body_lines(content: &str) -> impl Iterator<Item = &str> {
    content.lines().skip_while(|l| l.trim().is_empty()).skip(1)
}

/// 读取 CSV，非 UTF-8 字节替换为 U+FFFD
fn read_csv(path: &Path) -> AppResult<String> {
    let bytes = fs::read(path).map_err(|e| AppError::io(path, e))?;
    let content = String::from_utf8_lossy(&bytes);
    Ok(content.trim_start_matches('\u{feff}').to_string())
}

/// CSV 合并器
///
/// 职责：
/// - 在数据目录中查找同一条码的结果文件
/// - 请操作员确认后合并
/// - 用表格查看器打开合并结果
#[derive(Debug, Clone)]
pub struct CsvMerger {
    resolver: ConfigResolver,
}

impl CsvMerger {
    pub fn new(resolver: ConfigResolver) -> Self {
        Self { resolver }
    }

    pub fn merge<P, R>(&self, identifier: &str, prompt: &P, runner: &R) -> AppResult<MergeOutcome>
    where
        P: Prompt + ?Sized,
        R: ProcessRunner,
    {
        let data_dir = self.resolver.data_dir()?;
        let sources = find_matches(&data_dir, identifier)?;

        if sources.is_empty() {
            return Err(MergeError::NoMatchingFiles {
                identifier: identifier.to_string(),
            }
            .into());
        }

        let listing = sources
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        if !prompt.ask("合并文件", &format!("待合并文件: {}", listing)).is_yes() {
            info!("操作员取消合并");
            return Ok(MergeOutcome::Declined);
        }

        let output = merged_path(&data_dir, identifier);
        merge_files(identifier, &sources, &output)?;
        info!("✓ 合并文件已生成: {}", output.display());

        let viewer_error = match self.open_viewer(&output, runner) {
            Ok(()) => None,
            Err(e) => {
                warn!("⚠️ {}", e);
                Some(e.to_string())
            }
        };

        Ok(MergeOutcome::Merged {
            path: output,
            sources,
            viewer_error,
        })
    }

    fn open_viewer<R: ProcessRunner>(&self, merged: &Path, runner: &R) -> AppResult<()> {
        let viewer = self.resolver.viewer()?;
        runner
            .spawn_detached(&viewer, &[merged])
            .map_err(|source| MergeError::ViewerLaunchFailed { viewer, source })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines_of(path: &Path) -> Vec<String> {
        fs::read_to_string(path).unwrap().lines().map(str::to_string).collect()
    }

    #[test]
    fn test_merge_concatenates_bodies_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        fs::write(&a, "H\n1\n2\n").unwrap();
        fs::write(&b, "H\n3\n").unwrap();

        let out = dir.path().join("out.csv");
        merge_files("S", &[a, b], &out).unwrap();
        assert_eq!(lines_of(&out), vec!["H", "1", "2", "3"]);
    }

    #[test]
    fn test_merge_skips_leading_blank_lines_and_keeps_inner_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        fs::write(&a, "\n  \nH1,H2\r\n1,2\r\n\r\n3,4\r\n").unwrap();
        fs::write(&b, "\nother,header\n5,6").unwrap();

        let out = dir.path().join("Processed").join("out.csv");
        merge_files("S", &[a, b], &out).unwrap();
        assert_eq!(lines_of(&out), vec!["H1,H2", "1,2", "", "3,4", "5,6"]);
    }

    #[test]
    fn test_merge_first_file_without_header() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        fs::write(&a, "\n\n").unwrap();

        let err = merge_files("S", &[a], &dir.path().join("out.csv")).unwrap_err();
        assert!(matches!(err, AppError::Merge(MergeError::MissingHeader { .. })));
    }

    #[test]
    fn test_merge_tolerates_non_utf8_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("S.1.csv");
        let b = dir.path().join("S.2.csv");
        fs::write(&a, b"\xef\xbb\xbfWell,Temp \xb0C\nA1,37\n").unwrap();
        fs::write(&b, b"Well,Temp \xb0C\nA2,38\n").unwrap();

        let out = dir.path().join("out.csv");
        merge_files("S", &[a, b], &out).unwrap();
        assert_eq!(lines_of(&out), vec!["Well,Temp \u{fffd}C", "A1,37", "A2,38"]);
    }

    #[test]
    fn test_merge_empty_list_names_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let err = merge_files("S1", &[], &dir.path().join("out.csv")).unwrap_err();
        match err {
            AppError::Merge(MergeError::NoMatchingFiles { identifier }) => assert_eq!(identifier, "S1"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!dir.path().join("out.csv").exists());
    }

    #[test]
    fn test_find_matches_prefix_extension_and_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["S1.2.csv", "S1.1.CSV", "S1.1.xlsx", "T1.1.csv", "S1.10.csv"] {
            fs::write(dir.path().join(name), "H\n").unwrap();
        }
        fs::create_dir(dir.path().join(PROCESSED_DIR)).unwrap();
        fs::write(merged_path(dir.path(), "S1"), "H\n").unwrap();

        let found: Vec<String> = find_matches(dir.path(), "S1")
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(found, vec!["S1.1.CSV", "S1.10.csv", "S1.2.csv"]);
    }

    #[test]
    fn test_merged_path_layout() {
        assert_eq!(
            merged_path(Path::new("/data"), "S1"),
            Path::new("/data").join("Processed").join("S1_processed.csv")
        );
    }
}
