//! 文件重命名服务 - 业务能力层
//!
//! 把输出目录中最新的 N 个文件改名为 `{条码}.{板号}{扩展名}`，
//! 目标已存在时追加 `(1)`、`(2)`… 后缀，绝不覆盖已有文件。

use crate::error::{AppError, AppResult};
use crate::models::rename::{CandidateFile, RenameReport, RenameResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

/// 文件重命名器
#[derive(Debug, Clone, Default)]
pub struct FileRenamer {
    /// 只挑选该扩展名的文件（不含点，不区分大小写）
    extension: Option<String>,
}

impl FileRenamer {
    pub fn new(extension: Option<String>) -> Self {
        Self {
            extension: extension.map(|e| e.trim_start_matches('.').to_ascii_lowercase()),
        }
    }

    /// 选出最近修改的 `count` 个文件，按修改时间从旧到新排列（同一时间按文件名）
    pub fn select_recent(&self, output_dir: &Path, count: usize) -> AppResult<Vec<CandidateFile>> {
        let mut files = self.list_candidates(output_dir)?;

        // 新的在前，同一时间按文件名保证结果可复现
        files.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));
        files.truncate(count);
        files.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.name.cmp(&b.name)));

        Ok(files)
    }

    /// 预览列表：与重命名使用同一套挑选规则，按新到旧显示
    pub fn preview(&self, output_dir: &Path, count: usize) -> AppResult<Vec<CandidateFile>> {
        let mut files = self.select_recent(output_dir, count)?;
        files.reverse();
        Ok(files)
    }

    /// 重新挑选最新的文件并重命名
    pub fn rename_batch(&self, output_dir: &Path, identifier: &str, plate_count: usize) -> AppResult<RenameReport> {
        let selected = self.select_recent(output_dir, plate_count)?;
        Ok(rename_files(output_dir, identifier, &selected))
    }

    fn list_candidates(&self, output_dir: &Path) -> AppResult<Vec<CandidateFile>> {
        let entries = fs::read_dir(output_dir).map_err(|e| AppError::io(output_dir, e))?;
        let mut files = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| AppError::io(output_dir, e))?;
            let metadata = match entry.metadata() {
                Ok(m) if m.is_file() => m,
                Ok(_) => continue,
                Err(e) => {
                    warn!("无法读取文件信息 {}: {}", entry.path().display(), e);
                    continue;
                }
            };

            let path = entry.path();
            if !self.matches_extension(&path) {
                continue;
            }

            files.push(CandidateFile {
                name: entry.file_name().to_string_lossy().to_string(),
                path,
                modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            });
        }

        Ok(files)
    }

    fn matches_extension(&self, path: &Path) -> bool {
        match &self.extension {
            None => true,
            Some(wanted) => path
                .extension()
                .map(|e| e.to_string_lossy().eq_ignore_ascii_case(wanted))
                .unwrap_or(false),
        }
    }
}

/// 带点的扩展名，没有扩展名时为空串
fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// 找到一个不存在的目标路径：先试 `{id}.{idx}{ext}`，再依次试 `{id}.{idx}({n}){ext}`
pub fn unique_destination(dir: &Path, identifier: &str, plate_index: usize, extension: &str) -> PathBuf {
    let desired = dir.join(format!("{}.{}{}", identifier, plate_index, extension));
    if !desired.exists() {
        return desired;
    }

    let mut suffix = 1usize;
    loop {
        let candidate = dir.join(format!("{}.{}({}){}", identifier, plate_index, suffix, extension));
        if !candidate.exists() {
            return candidate;
        }
        suffix += 1;
    }
}

/// 重命名操作员确认过的文件
///
/// 按修改时间从旧到新依次编号为第 1..N 块板。
/// 单个文件失败只记录在该文件的结果里，不影响其余文件。
pub fn rename_files(output_dir: &Path, identifier: &str, files: &[CandidateFile]) -> RenameReport {
    let mut ordered: Vec<&CandidateFile> = files.iter().collect();
    ordered.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.name.cmp(&b.name)));

    let mut report = RenameReport::default();
    for (idx, file) in ordered.into_iter().enumerate() {
        let plate_index = idx + 1;
        let extension = extension_of(&file.path);
        let destination = unique_destination(output_dir, identifier, plate_index, &extension);
        let destination_name = file_name_of(&destination);

        let error = match move_without_clobber(&file.path, &destination) {
            Ok(()) => {
                debug!("重命名: {} -> {}", file.name, destination_name);
                None
            }
            Err(e) => {
                warn!("重命名失败: {} -> {}: {}", file.name, destination_name, e);
                Some(e.to_string())
            }
        };

        report.results.push(RenameResult {
            original: file.name.clone(),
            destination: destination_name,
            error,
        });
    }
    report
}

/// 移动文件，绝不覆盖目标
///
/// 先建硬链接再删源文件，目标已存在时由文件系统原子地拒绝。
/// 不支持硬链接的文件系统退回到"检查后改名"，检查与改名之间仍有空隙。
fn move_without_clobber(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::hard_link(source, destination) {
        Ok(()) => {
            if let Err(e) = fs::remove_file(source) {
                let _ = fs::remove_file(destination);
                return Err(e);
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(already_exists(destination)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(e),
        Err(e) => {
            debug!("无法建立硬链接 ({}), 改用普通改名", e);
            if destination.exists() {
                return Err(already_exists(destination));
            }
            fs::rename(source, destination)
        }
    }
}

fn already_exists(destination: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("目标已存在: {}", destination.display()),
    )
}

/// 在后台线程中重命名确认过的文件，避免阻塞交互界面
pub async fn rename_in_background(
    output_dir: PathBuf,
    identifier: String,
    files: Vec<CandidateFile>,
) -> anyhow::Result<RenameReport> {
    let report = tokio::task::spawn_blocking(move || rename_files(&output_dir, &identifier, &files)).await?;
    Ok(report)
}
