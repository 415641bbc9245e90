//! 控制台应用 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，按操作员的动作依次执行三个阶段：
//!
//! 1. **重命名**：预览最新的输出文件，确认后改名为 `{条码}.{板号}{扩展名}`
//! 2. **启动**：逐板运行处理程序，一块板结束后才开始下一块
//! 3. **合并**：把同一条码的 CSV 结果合并，并用表格查看器打开
//!
//! 三个阶段之间严格串行，没有共享的可变状态；
//! 重命名放到后台线程，等待外部进程用异步等待，界面保持响应。

use crate::config::Config;
use crate::error::SelectionError;
use crate::infrastructure::process_runner::{ProcessRunner, TokioProcessRunner};
use crate::infrastructure::prompt::Prompt;
use crate::models::rename::{CandidateFile, RenameReport};
use crate::models::selection::PlateSelection;
use crate::orchestrator::plate_launcher::{LaunchReport, PlateLauncher, PlateStatus};
use crate::services::argument_template::{ArgumentBuilder, ArgumentTemplate};
use crate::services::config_resolver::ConfigResolver;
use crate::services::csv_merger::{CsvMerger, MergeOutcome};
use crate::services::file_renamer::{rename_in_background, FileRenamer};
use crate::utils::logging::{init_log_file, log_phase_start, log_startup, print_launch_stats, truncate_text};
use crate::workflow::Session;
use anyhow::{Context, Result};
use tracing::{info, warn};

/// 应用主结构
pub struct App<R = TokioProcessRunner> {
    config: Config,
    resolver: ConfigResolver,
    renamer: FileRenamer,
    prompt: Box<dyn Prompt>,
    runner: R,
}

impl App<TokioProcessRunner> {
    /// 初始化应用
    pub fn initialize(config: Config, prompt: Box<dyn Prompt>) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)
            .with_context(|| format!("无法写入日志文件: {}", config.output_log_file))?;

        let app = Self::with_runner(config, prompt, TokioProcessRunner::new());
        log_startup(
            &app.config.root.display().to_string(),
            &format!("{:?}", app.resolver.source()),
        );
        Ok(app)
    }
}

impl<R: ProcessRunner + Clone> App<R> {
    pub fn with_runner(config: Config, prompt: Box<dyn Prompt>, runner: R) -> Self {
        let resolver = ConfigResolver::from_config(&config);
        let renamer = FileRenamer::new(config.rename_extension.clone());
        Self {
            config,
            resolver,
            renamer,
            prompt,
            runner,
        }
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// 预览将被重命名的文件（新到旧）
    pub fn preview(&self, selection: &PlateSelection) -> Result<Vec<CandidateFile>> {
        let output_dir = self.resolver.output_dir().context("系统输出目录错误")?;
        let files = self.renamer.preview(&output_dir, selection.effective_count())?;
        Ok(files)
    }

    /// 重命名阶段
    ///
    /// 操作员取消或目录为空时返回 None；否则返回本批结果，并据此更新闸门
    pub async fn rename_phase(&self, session: &mut Session) -> Result<Option<RenameReport>> {
        let output_dir = self.resolver.output_dir().context("系统输出目录错误")?;
        session.selection.require_complete()?;

        let identifier = session.selection.identifier();
        let count = session.selection.effective_count();
        log_phase_start("重命名", &identifier);

        let candidates = self.renamer.preview(&output_dir, count)?;
        if candidates.is_empty() {
            self.prompt
                .notify("未找到文件", &format!("{} 中没有找到文件", output_dir.display()));
            return Ok(None);
        }

        let listing = candidates
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        if !self
            .prompt
            .ask("待重命名文件", &format!("最近的文件:\n{}", listing))
            .is_yes()
        {
            info!("操作员表示不是本次的板，未做任何修改");
            return Ok(None);
        }

        // 只改名操作员确认过的这批文件
        let report = rename_in_background(output_dir, identifier, candidates).await?;

        if session.apply_rename_report(&report) {
            self.prompt.notify("重命名完成", &report.summary());
        } else {
            self.prompt.notify("重命名出错", &report.summary());
        }
        Ok(Some(report))
    }

    /// 启动阶段：逐板运行处理程序
    pub async fn launch_phase(&self, session: &Session) -> Result<LaunchReport> {
        session.selection.require_plates()?;
        session.check_ready()?;
        log_phase_start("启动处理程序", &session.selection.identifier());

        let processor = self.resolver.processor().context("处理程序路径错误")?;
        let template = ArgumentTemplate::load(&self.config.template_file)?;
        let builder = ArgumentBuilder::new(template, self.resolver.clone());
        let launcher = PlateLauncher::new(processor, builder, self.runner.clone());

        let report = launcher.launch_all(session).await?;

        for outcome in &report.outcomes {
            let plate = outcome.ctx.plate_index;
            match &outcome.status {
                PlateStatus::Exited(exit) if exit.success() => {
                    self.prompt.notify("已启动", &format!("第 {} 板处理完成", plate));
                }
                PlateStatus::Exited(exit) => {
                    self.prompt.notify(
                        "处理程序异常退出",
                        &format!("第 {} 板退出码: {:?}", plate, exit.code),
                    );
                }
                PlateStatus::ArgumentsFailed(e) | PlateStatus::LaunchFailed(e) => {
                    let arguments = outcome.arguments.as_deref().unwrap_or_default();
                    self.prompt.notify(
                        "启动处理程序出错",
                        &format!("第 {} 板: {}\n参数: {}", plate, e, truncate_text(arguments, 200)),
                    );
                }
            }
        }

        print_launch_stats(
            report.success(),
            report.failed(),
            report.total(),
            &self.config.output_log_file,
        );
        Ok(report)
    }

    /// 合并阶段
    pub fn merge_phase(&self, selection: &PlateSelection) -> Result<MergeOutcome> {
        let identifier = selection.identifier();
        if identifier.is_empty() {
            return Err(SelectionError::MissingSelection.into());
        }
        log_phase_start("合并", &identifier);

        let merger = CsvMerger::new(self.resolver.clone());
        let outcome = merger.merge(&identifier, &*self.prompt, &self.runner)?;

        if let MergeOutcome::Merged {
            path,
            viewer_error: Some(e),
            ..
        } = &outcome
        {
            self.prompt.notify(
                "打开表格",
                &format!("合并文件已生成: {}\n但打开表格查看器时出错: {}", path.display(), e),
            );
        }
        Ok(outcome)
    }

    /// 完整流程：重命名 → 逐板启动 → 可选合并
    pub async fn run(&self, session: &mut Session) -> Result<()> {
        self.rename_phase(session).await?;

        if !session.files_processed() {
            warn!("⚠️ 文件未处理，不启动处理程序");
            self.prompt.notify("文件未处理", "请先处理样本文件");
            return Ok(());
        }

        self.launch_phase(session).await?;

        if self
            .prompt
            .ask("合并结果", "是否合并本次条码的 CSV 结果并打开?")
            .is_yes()
        {
            self.merge_phase(&session.selection)?;
        }
        Ok(())
    }
}
