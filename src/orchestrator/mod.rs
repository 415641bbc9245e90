//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责阶段调度和结果汇总，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `console` - 控制台应用
//! - 持有配置、解析器、提示和进程执行器
//! - 按顺序执行重命名、启动、合并三个阶段
//! - 把每个阶段的结果告知操作员
//!
//! ### `plate_launcher` - 逐板启动器
//! - 对第 1..N 块板依次构建参数并运行处理程序
//! - 上一块板的进程退出后才启动下一块
//! - 输出每块板的结果
//!
//! ## 层次关系
//!
//! ```text
//! console (三个阶段)
//!     ↓
//! plate_launcher (处理 1..N 块板)
//!     ↓
//! services (能力层：config_resolver / argument_template / file_renamer / csv_merger)
//!     ↓
//! infrastructure (基础设施：ProcessRunner / Prompt)
//! ```

pub mod console;
pub mod plate_launcher;

// 重新导出主要类型
pub use console::App;
pub use plate_launcher::{LaunchReport, PlateLauncher, PlateOutcome, PlateStatus};
