/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use std::fs;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 日志输出
///
/// 日志级别优先读取 RUST_LOG 环境变量，默认 info
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// 初始化会话日志文件
pub fn init_session_log(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n测验会话日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(model: &str, api_function: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - AI 出题测验模式");
    info!("📊 模型: {} / API 函数: {}", model, api_function);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志和提示词显示
///
/// 超过 `max_len` 个字符时截断并追加 "..."
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_text("短文本", 50), "短文本");
    }

    #[test]
    fn test_truncate_long_text_appends_ellipsis() {
        let long = "字".repeat(60);
        let truncated = truncate_text(&long, 50);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 53);
    }
}
