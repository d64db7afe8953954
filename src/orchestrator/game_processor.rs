//! 游戏生成处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责多章节的顺序处理和产物落盘。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、构造 LLM 生成器
//! 2. **清单加载**：读取章节清单和各章节文本
//! 3. **顺序处理**：逐章节执行 切块 → 生成 → 洗牌 → 校验
//! 4. **速率控制**：章节之间固定间隔，避免触发 API 限流
//! 5. **产物落盘**：组装游戏产物并写出 JSON 文件
//!
//! ## 设计特点
//!
//! - **快速失败**：任何章节失败则整次运行失败，不输出部分产物
//! - **顶层编排**：不处理单个章节的细节，向下委托 ChapterFlow

use std::sync::Arc;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

use crate::config::Config;
use crate::models::loaders::{load_chapter_manifest, load_chapter_text};
use crate::models::question::ChapterResult;
use crate::services::format_game_output;
use crate::services::generator::{LlmGenerator, QuestionGenerator};
use crate::utils::logging::{log_startup, print_final_stats};
use crate::workflow::{ChapterCtx, ChapterFlow};

/// 章节之间的间隔, 免费档 API 的限流余量
const INTER_CHAPTER_DELAY: Duration = Duration::from_secs(2);

/// 应用主结构
pub struct App {
    config: Config,
    generator: Arc<dyn QuestionGenerator>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Self {
        log_startup(&config);

        let generator: Arc<dyn QuestionGenerator> = Arc::new(LlmGenerator::new(&config));

        Self { config, generator }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        // 加载章节清单
        let chapters = load_chapter_manifest(&self.config.chapters_manifest).await?;

        if chapters.is_empty() {
            warn!("⚠️ 章节清单为空，程序结束");
            return Ok(());
        }

        info!("✓ 找到 {} 个待处理的章节", chapters.len());
        info!("📋 将逐章节顺序处理, 章节间隔 {:?}\n", INTER_CHAPTER_DELAY);

        // 逐章节处理, 任何失败立即终止
        let flow = ChapterFlow::new(self.generator.as_ref(), &self.config);
        let mut chapter_results: Vec<ChapterResult> = Vec::with_capacity(chapters.len());

        for (index, chapter) in chapters.iter().enumerate() {
            if index > 0 {
                sleep(INTER_CHAPTER_DELAY).await;
            }

            let ctx = ChapterCtx::new(&chapter.id, &chapter.title, index);
            info!("\n{}", "=".repeat(60));
            info!("📦 开始处理第 {}/{} 个章节 {}", index + 1, chapters.len(), ctx);
            info!("{}", "=".repeat(60));

            let text = load_chapter_text(&chapter.text_path).await?;

            let mut rng = StdRng::from_entropy();
            let result = flow
                .run(&ctx, &text, &mut rng, self.config.difficulty_target)
                .await
                .with_context(|| format!("章节 {} 处理失败", chapter.id))?;

            chapter_results.push(result);
        }

        // 组装并落盘
        let payload =
            format_game_output(&chapter_results, self.config.difficulty_target, &self.config)?;

        let json = serde_json::to_string_pretty(&payload).context("游戏产物序列化失败")?;
        tokio::fs::write(&self.config.output_file, &json)
            .await
            .with_context(|| format!("无法写出游戏产物: {}", self.config.output_file))?;

        print_final_stats(&payload, &self.config);

        Ok(())
    }
}
