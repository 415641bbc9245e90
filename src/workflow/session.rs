//! 操作会话
//!
//! 保存操作员的选择，以及"样本文件已处理"这道闸门。
//! 闸门只在一次全部成功的重命名之后打开（或由操作员显式确认）。

use crate::error::SelectionError;
use crate::models::rename::RenameReport;
use crate::models::selection::PlateSelection;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub selection: PlateSelection,
    files_processed: bool,
}

impl Session {
    pub fn new(selection: PlateSelection) -> Self {
        Self {
            selection,
            files_processed: false,
        }
    }

    pub fn files_processed(&self) -> bool {
        self.files_processed
    }

    /// 操作员确认文件已处理
    pub fn mark_processed(&mut self) {
        self.files_processed = true;
    }

    /// 根据重命名结果更新闸门，返回闸门是否打开
    pub fn apply_rename_report(&mut self, report: &RenameReport) -> bool {
        if report.all_succeeded() {
            self.files_processed = true;
        }
        debug!("重命名后闸门状态: {}", self.files_processed);
        self.files_processed
    }

    /// 启动前检查：选择完整，且文件已处理
    pub fn check_ready(&self) -> Result<(), SelectionError> {
        self.selection.require_complete()?;
        if !self.files_processed {
            return Err(SelectionError::FilesNotProcessed);
        }
        Ok(())
    }
}
