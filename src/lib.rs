//! # Plate Console
//!
//! 读板仪输出文件的处理控制台：重命名输出文件、逐板启动外部处理程序、合并 CSV 结果
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（外部进程、终端），只暴露能力
//! - `ProcessRunner` - 启动外部程序并等待退出
//! - `Prompt` - 是 / 否 / 取消 确认与通知
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `ConfigResolver` - 解析位置配置中的路径
//! - `ArgumentBuilder` - 参数模板占位符替换
//! - `FileRenamer` - 不覆盖地重命名最新输出文件
//! - `CsvMerger` - 合并同一条码的 CSV 结果
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次运行"的状态
//! - `PlateCtx` - 上下文封装（板号 + 板变量 + 条码）
//! - `Session` - 操作员选择和"文件已处理"闸门
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/plate_launcher` - 逐板顺序启动
//! - `orchestrator/console` - 重命名、启动、合并三个阶段
//!
//! ## 模块结构

pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{ProcessRunner, Prompt, PromptAnswer, TokioProcessRunner};
pub use models::{PlateSelection, RenameReport, RenameResult};
pub use orchestrator::{App, LaunchReport, PlateLauncher};
pub use services::{ArgumentBuilder, ArgumentTemplate, ConfigResolver, CsvMerger, FileRenamer};
pub use workflow::{PlateCtx, Session};
