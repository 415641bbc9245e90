pub mod process_runner;
pub mod prompt;

pub use process_runner::{ProcessExit, ProcessRunner, TokioProcessRunner};
pub use prompt::{AutoConfirm, ConsolePrompt, Prompt, PromptAnswer};
