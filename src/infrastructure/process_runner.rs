//! 外部进程执行器 - 基础设施层
//!
//! 唯一接触操作系统进程的地方，只暴露"运行到结束"和"启动后不管"两种能力

use std::future::Future;
use std::io;
use std::path::Path;
use std::process::ExitStatus;
use tokio::process::Command;
use tracing::{debug, warn};

/// 外部进程的退出结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    /// 退出码，被信号终止或等待失败时为 None
    pub code: Option<i32>,
    /// 是否成功等到了进程退出
    pub waited: bool,
}

impl ProcessExit {
    pub fn with_code(code: i32) -> Self {
        Self {
            code: Some(code),
            waited: true,
        }
    }

    /// 等待出错时的结果，不视为致命错误
    pub fn unknown() -> Self {
        Self {
            code: None,
            waited: false,
        }
    }

    /// 退出码为 0，或者没能等到退出（进程已启动，按已启动处理）
    pub fn success(&self) -> bool {
        !self.waited || self.code == Some(0)
    }
}

impl From<ExitStatus> for ProcessExit {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
            waited: true,
        }
    }
}

/// 进程执行能力
///
/// 职责：
/// - 启动处理程序并等待退出
/// - 启动查看器后立即返回
/// - 不认识板、条码、模板
pub trait ProcessRunner {
    /// 启动程序并等待其退出；只有启动失败才返回错误
    fn run_to_completion(&self, program: &Path, arguments: &str) -> impl Future<Output = io::Result<ProcessExit>> + Send;

    /// 启动程序，不等待
    fn spawn_detached(&self, program: &Path, arguments: &[&Path]) -> io::Result<()>;
}

/// 基于 tokio 的进程执行器
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

/// 把参数字符串交给命令：Windows 下原样传递，其他平台按 shell 规则拆分
fn apply_arguments(command: &mut Command, arguments: &str) -> io::Result<()> {
    #[cfg(windows)]
    {
        command.raw_arg(arguments);
    }
    #[cfg(not(windows))]
    {
        let args = shell_words::split(arguments).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        command.args(args);
    }
    Ok(())
}

impl ProcessRunner for TokioProcessRunner {
    async fn run_to_completion(&self, program: &Path, arguments: &str) -> io::Result<ProcessExit> {
        let mut command = Command::new(program);
        apply_arguments(&mut command, arguments)?;
        debug!("启动: {} {}", program.display(), arguments);

        let mut child = command.spawn()?;

        match child.wait().await {
            Ok(status) => Ok(ProcessExit::from(status)),
            Err(e) => {
                warn!("等待进程退出时出错（忽略）: {}", e);
                Ok(ProcessExit::unknown())
            }
        }
    }

    fn spawn_detached(&self, program: &Path, arguments: &[&Path]) -> io::Result<()> {
        let child = Command::new(program).args(arguments).spawn()?;
        debug!("已启动 {} (pid: {:?})", program.display(), child.id());
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_to_completion_reports_exit_code() {
        let runner = TokioProcessRunner::new();

        let ok = runner.run_to_completion(Path::new("sh"), "-c 'exit 0'").await.unwrap();
        assert!(ok.success());

        let failed = runner.run_to_completion(Path::new("sh"), "-c 'exit 3'").await.unwrap();
        assert_eq!(failed, ProcessExit::with_code(3));
        assert!(!failed.success());
    }

    #[test]
    fn test_unwaited_exit_counts_as_started() {
        assert!(ProcessExit::unknown().success());
        let killed = ProcessExit {
            code: None,
            waited: true,
        };
        assert!(!killed.success());
    }

    #[tokio::test]
    async fn test_run_missing_program_fails_to_start() {
        let runner = TokioProcessRunner::new();
        let result = runner
            .run_to_completion(Path::new("/definitely/not/here/processor"), "")
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unbalanced_quotes_rejected() {
        let runner = TokioProcessRunner::new();
        let err = runner.run_to_completion(Path::new("sh"), "-c 'exit 0").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
