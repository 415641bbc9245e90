use crate::config::Config;
use crate::infrastructure::prompt::{AutoConfirm, ConsolePrompt, Prompt};
use crate::models::selection::PlateSelection;
use crate::orchestrator::App;
use crate::services::csv_merger::MergeOutcome;
use crate::workflow::Session;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "plate-console",
    version,
    about = "读板输出文件重命名、逐板启动处理程序、合并 CSV 结果"
)]
pub struct Cli {
    /// 所有确认提示都自动回答"是"
    #[arg(long, global = true)]
    pub yes: bool,

    /// 显示详细日志
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// 预览将被重命名的文件
    Preview(SelectionArgs),
    /// 把最新的输出文件重命名为 {条码}.{板号}{扩展名}
    Rename(SelectionArgs),
    /// 逐板依次运行处理程序
    Launch {
        #[command(flatten)]
        selection: SelectionArgs,

        /// 操作员确认输出文件已经处理过
        #[arg(long)]
        files_processed: bool,
    },
    /// 合并同一条码的各板 CSV 结果并打开表格
    Merge {
        /// 结果文件使用的条码
        #[arg(long)]
        barcode: String,
    },
    /// 完整流程：重命名、逐板启动、可选合并
    Run(SelectionArgs),
}

#[derive(Debug, Args, Clone)]
pub struct SelectionArgs {
    /// 本次读取的板数
    #[arg(long, default_value_t = 0)]
    pub plates: usize,

    /// 板类型代码，每个字符对应一块板（如 "AB"）
    #[arg(long, default_value = "")]
    pub plate_type: String,

    /// 输出文件使用的条码
    #[arg(long, default_value = "")]
    pub barcode: String,
}

impl From<&SelectionArgs> for PlateSelection {
    fn from(args: &SelectionArgs) -> Self {
        PlateSelection::new(args.plates, args.plate_type.clone(), args.barcode.clone())
    }
}

fn build_prompt(yes: bool) -> Box<dyn Prompt> {
    if yes {
        Box::new(AutoConfirm)
    } else {
        Box::new(ConsolePrompt)
    }
}

pub async fn run(args: Cli, config: Config) -> Result<()> {
    let app = App::initialize(config, build_prompt(args.yes))?;

    match &args.command {
        Command::Preview(selection) => {
            let selection = PlateSelection::from(selection);
            let files = app.preview(&selection)?;
            if files.is_empty() {
                println!("没有找到文件");
            }
            for file in files {
                println!("{}", file);
            }
        }
        Command::Rename(selection) => {
            let mut session = Session::new(PlateSelection::from(selection));
            app.rename_phase(&mut session).await?;
        }
        Command::Launch {
            selection,
            files_processed,
        } => {
            let mut session = Session::new(PlateSelection::from(selection));
            if *files_processed {
                session.mark_processed();
            }
            let report = app.launch_phase(&session).await?;
            if report.failed() > 0 {
                anyhow::bail!("{} 块板未成功完成", report.failed());
            }
        }
        Command::Merge { barcode } => {
            let selection = PlateSelection::new(0, "", barcode.clone());
            match app.merge_phase(&selection)? {
                MergeOutcome::Merged { path, .. } => println!("合并文件已生成: {}", path.display()),
                MergeOutcome::Declined => info!("未合并"),
            }
        }
        Command::Run(selection) => {
            let mut session = Session::new(PlateSelection::from(selection));
            app.run(&mut session).await?;
        }
    }

    Ok(())
}
