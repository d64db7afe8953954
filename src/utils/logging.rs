/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::payload::GamePayload;

/// 初始化 tracing 日志订阅器
///
/// 默认级别 info，可通过 RUST_LOG 环境变量覆盖；
/// verbose_logging 打开时默认级别降为 debug
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 章节测验游戏生成模式");
    info!("📊 每章节题目数: {}", config.questions_per_chapter);
    info!("📊 难度目标: {}", config.difficulty_target);
    info!("📊 模型: {}", config.llm_model_name);
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(payload: &GamePayload, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 章节: {}", payload.meta.chapters.len());
    info!("✅ 公开谜题: {}", payload.public_puzzles.len());
    info!("✅ 答案密钥: {}", payload.private_answer_key.len());
    info!("{}", "=".repeat(60));
    info!("\n游戏产物已保存至: {}", config.output_file);
}

/// 截断长文本用于日志显示
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
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("a very long text here", 6), "a very...");
    }
}
