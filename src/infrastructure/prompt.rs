//! 确认提示 - 基础设施层
//!
//! 取代原先的模态对话框：只回答 是 / 否 / 取消，并能显示一条通知

use std::io::{self, BufRead, Write};

/// 提示的回答
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAnswer {
    Yes,
    No,
    Cancel,
}

impl PromptAnswer {
    /// 解析操作员输入：y/yes/是 为 Yes，n/no/否 为 No，其余为 Cancel
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "y" | "yes" | "是" => PromptAnswer::Yes,
            "n" | "no" | "否" => PromptAnswer::No,
            _ => PromptAnswer::Cancel,
        }
    }

    pub fn is_yes(self) -> bool {
        self == PromptAnswer::Yes
    }
}

/// 提示能力
pub trait Prompt {
    /// 提出一个问题并等待回答
    fn ask(&self, title: &str, body: &str) -> PromptAnswer;

    /// 显示一条通知
    fn notify(&self, title: &str, body: &str);
}

/// 终端提示：从标准输入读一行
#[derive(Debug, Default)]
pub struct ConsolePrompt;

impl Prompt for ConsolePrompt {
    fn ask(&self, title: &str, body: &str) -> PromptAnswer {
        println!("\n【{}】\n{}", title, body);
        print!("继续? [y/n] ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => PromptAnswer::Cancel,
            Ok(_) => PromptAnswer::parse(&line),
        }
    }

    fn notify(&self, title: &str, body: &str) {
        println!("\n【{}】\n{}", title, body);
    }
}

/// 所有问题都回答 Yes（`--yes`）
#[derive(Debug, Default)]
pub struct AutoConfirm;

impl Prompt for AutoConfirm {
    fn ask(&self, title: &str, body: &str) -> PromptAnswer {
        tracing::info!("【{}】自动确认\n{}", title, body);
        PromptAnswer::Yes
    }

    fn notify(&self, title: &str, body: &str) {
        println!("\n【{}】\n{}", title, body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answers() {
        assert_eq!(PromptAnswer::parse("y\n"), PromptAnswer::Yes);
        assert_eq!(PromptAnswer::parse(" YES "), PromptAnswer::Yes);
        assert_eq!(PromptAnswer::parse("否"), PromptAnswer::No);
        assert_eq!(PromptAnswer::parse("n"), PromptAnswer::No);
        assert_eq!(PromptAnswer::parse(""), PromptAnswer::Cancel);
        assert_eq!(PromptAnswer::parse("maybe"), PromptAnswer::Cancel);
    }

    #[test]
    fn test_auto_confirm_always_yes() {
        assert!(AutoConfirm.ask("t", "b").is_yes());
    }
}
