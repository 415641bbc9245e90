//! 逐板启动器 - 编排层
//!
//! ## 职责
//!
//! 对第 1..N 块板依次构建参数并运行处理程序。
//!
//! ## 顺序保证
//!
//! 处理程序在同一次运行的多次调用之间共享状态，所以第 k+1 块板
//! 只有在第 k 块板的进程退出后才会启动。这里不做任何并发。
//!
//! ## 失败策略
//!
//! - 选择不完整或文件未处理：立即失败，一块板也不启动
//! - 单块板参数构建失败、启动失败或非零退出：记录到该板的结果，继续下一块板

use crate::error::{AppResult, LaunchError};
use crate::infrastructure::process_runner::{ProcessExit, ProcessRunner};
use crate::services::argument_template::ArgumentBuilder;
use crate::workflow::{PlateCtx, Session};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// 调用方未提供板变量时使用的默认值
pub const DEFAULT_PLATE_VAR: &str = "";

/// 单块板的运行状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlateStatus {
    /// 进程已退出
    Exited(ProcessExit),
    /// 参数构建失败（例如协议文件不存在）
    ArgumentsFailed(String),
    /// 进程无法启动
    LaunchFailed(String),
}

/// 单块板的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlateOutcome {
    pub ctx: PlateCtx,
    pub arguments: Option<String>,
    pub status: PlateStatus,
}

impl PlateOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(&self.status, PlateStatus::Exited(exit) if exit.success())
    }
}

/// 一次启动的汇总
#[derive(Debug, Clone, Default)]
pub struct LaunchReport {
    pub outcomes: Vec<PlateOutcome>,
}

impl LaunchReport {
    pub fn success(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.success()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}

/// 逐板启动器
pub struct PlateLauncher<R> {
    processor: PathBuf,
    builder: ArgumentBuilder,
    runner: R,
}

impl<R: ProcessRunner> PlateLauncher<R> {
    pub fn new(processor: PathBuf, builder: ArgumentBuilder, runner: R) -> Self {
        Self {
            processor,
            builder,
            runner,
        }
    }

    /// 依次启动全部板
    pub async fn launch_all(&self, session: &Session) -> AppResult<LaunchReport> {
        let plate_count = session.selection.require_plates()?;
        let identifier = session.selection.identifier();
        let mut report = LaunchReport::default();

        for plate_index in 1..=plate_count {
            session.check_ready()?;

            let plate_var = session.selection.plate_var(plate_index, DEFAULT_PLATE_VAR);
            let ctx = PlateCtx::new(plate_index, plate_count, plate_var, identifier.clone());
            let outcome = self.launch_one(&session.selection.plate_type, ctx).await;
            report.outcomes.push(outcome);
        }

        Ok(report)
    }

    /// 启动单块板并等待进程退出
    async fn launch_one(&self, plate_type: &str, ctx: PlateCtx) -> PlateOutcome {
        let arguments = match self
            .builder
            .build(plate_type, DEFAULT_PLATE_VAR, &ctx.identifier, ctx.plate_index)
        {
            Ok(arguments) => arguments,
            Err(e) => {
                error!("{} ❌ 参数构建失败: {}", ctx, e);
                return PlateOutcome {
                    ctx,
                    arguments: None,
                    status: PlateStatus::ArgumentsFailed(e.to_string()),
                };
            }
        };

        info!("{} 🚀 启动处理程序: {} {}", ctx, self.processor.display(), arguments);

        let status = match self.runner.run_to_completion(&self.processor, &arguments).await {
            Ok(exit) => {
                if !exit.waited {
                    warn!("{} ⚠️ 无法确认处理程序的退出状态", ctx);
                } else if exit.success() {
                    info!("{} ✓ 处理程序已退出", ctx);
                } else {
                    warn!("{} ⚠️ 处理程序退出码: {:?}", ctx, exit.code);
                }
                PlateStatus::Exited(exit)
            }
            Err(source) => {
                let e = LaunchError::LaunchFailed {
                    plate: ctx.plate_index,
                    program: self.processor.clone(),
                    source,
                };
                error!("{} ❌ {}", ctx, e);
                PlateStatus::LaunchFailed(e.to_string())
            }
        };

        PlateOutcome {
            ctx,
            arguments: Some(arguments),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, SelectionError};
    use crate::models::selection::PlateSelection;
    use crate::services::argument_template::ArgumentTemplate;
    use crate::services::config_resolver::{ConfigResolver, LocationSource};
    use std::io;
    use std::path::Path;
    use std::sync::Mutex;

    /// 记录调用的执行器：每次调用都记下"开始"和"结束"
    #[derive(Default)]
    struct RecordingRunner {
        events: Mutex<Vec<String>>,
        fail_on: Option<usize>,
        exit_code: i32,
    }

    impl ProcessRunner for RecordingRunner {
        async fn run_to_completion(&self, _program: &Path, arguments: &str) -> io::Result<ProcessExit> {
            let call = {
                let mut events = self.events.lock().unwrap();
                let call = events.iter().filter(|e| e.starts_with("start")).count() + 1;
                events.push(format!("start {}", arguments));
                call
            };
            if Some(call) == self.fail_on {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
            }
            tokio::task::yield_now().await;
            self.events.lock().unwrap().push(format!("exit {}", arguments));
            Ok(ProcessExit::with_code(self.exit_code))
        }

        fn spawn_detached(&self, _program: &Path, _arguments: &[&Path]) -> io::Result<()> {
            Ok(())
        }
    }

    fn builder(dir: &Path) -> ArgumentBuilder {
        for var in ["A", "B", "C"] {
            std::fs::write(dir.join(format!("p{}.assay", var)), "").unwrap();
        }
        let location = dir.join("system.location");
        std::fs::write(&location, "\n\n\n\n\np{plateVar}.assay\n").unwrap();
        ArgumentBuilder::new(
            ArgumentTemplate::from_fragments(["-p [PlateVar] -b [Hbarcode] -n *"]),
            ConfigResolver::new(LocationSource::Positional(location), dir),
        )
    }

    fn ready_session(count: usize, plate_type: &str, barcode: &str) -> Session {
        let mut session = Session::new(PlateSelection::new(count, plate_type, barcode));
        session.mark_processed();
        session
    }

    #[tokio::test]
    async fn test_launch_all_is_sequential_and_ordered() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = PlateLauncher::new(PathBuf::from("cli"), builder(dir.path()), RecordingRunner::default());

        let report = launcher.launch_all(&ready_session(2, "AB", "Sample 1!")).await.unwrap();

        assert_eq!(report.total(), 2);
        assert_eq!(report.success(), 2);
        let events = launcher.runner.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "start -p A -b Sample 1 -n 1",
                "exit -p A -b Sample 1 -n 1",
                "start -p B -b Sample 1 -n 2",
                "exit -p B -b Sample 1 -n 2",
            ]
        );
    }

    #[tokio::test]
    async fn test_launch_failure_does_not_stop_later_plates() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner {
            fail_on: Some(1),
            ..Default::default()
        };
        let launcher = PlateLauncher::new(PathBuf::from("cli"), builder(dir.path()), runner);

        let report = launcher.launch_all(&ready_session(3, "ABC", "X")).await.unwrap();

        assert!(matches!(report.outcomes[0].status, PlateStatus::LaunchFailed(_)));
        assert!(report.outcomes[1].succeeded());
        assert!(report.outcomes[2].succeeded());
        assert_eq!(report.failed(), 1);
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner {
            exit_code: 2,
            ..Default::default()
        };
        let launcher = PlateLauncher::new(PathBuf::from("cli"), builder(dir.path()), runner);

        let report = launcher.launch_all(&ready_session(1, "A", "X")).await.unwrap();
        assert_eq!(
            report.outcomes[0].status,
            PlateStatus::Exited(ProcessExit::with_code(2))
        );
        assert_eq!(report.success(), 0);
    }

    #[tokio::test]
    async fn test_missing_protocol_only_fails_that_plate() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = PlateLauncher::new(PathBuf::from("cli"), builder(dir.path()), RecordingRunner::default());

        // 第二块板的板变量 Z 没有对应的协议文件
        let report = launcher.launch_all(&ready_session(3, "AZC", "X")).await.unwrap();
        assert!(report.outcomes[0].succeeded());
        assert!(matches!(report.outcomes[1].status, PlateStatus::ArgumentsFailed(_)));
        assert_eq!(report.outcomes[1].arguments, None);
        assert!(report.outcomes[2].succeeded());
    }

    #[tokio::test]
    async fn test_gate_and_selection_fail_fast() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = PlateLauncher::new(PathBuf::from("cli"), builder(dir.path()), RecordingRunner::default());

        let unprocessed = Session::new(PlateSelection::new(2, "AB", "X"));
        let err = launcher.launch_all(&unprocessed).await.unwrap_err();
        assert!(matches!(err, AppError::Selection(SelectionError::FilesNotProcessed)));

        let err = launcher.launch_all(&ready_session(2, "AB", "  ")).await.unwrap_err();
        assert!(matches!(err, AppError::Selection(SelectionError::MissingSelection)));

        let err = launcher.launch_all(&ready_session(0, "AB", "X")).await.unwrap_err();
        assert!(matches!(err, AppError::Selection(SelectionError::NoPlatesSelected)));

        assert!(launcher.runner.events.lock().unwrap().is_empty());
    }
}
