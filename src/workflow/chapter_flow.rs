//! 章节处理流程 - 流程层
//!
//! 核心职责：定义"一个章节"的完整处理流程
//!
//! 流程顺序：
//! 1. 切块（确定性）
//! 2. 生成草稿（唯一的外部协作点）
//! 3. 洗牌（注入的随机源）
//! 4. 校验（任何违规让整个章节失败）
//!
//! 流程层本身不做重试，重试策略属于编排方。

use rand::Rng;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::question::ChapterResult;
use crate::services::generator::QuestionGenerator;
use crate::services::{chunk_text, shuffle_options, validate_chapter_set};
use crate::workflow::chapter_ctx::ChapterCtx;

/// 章节处理流程
///
/// - 编排单个章节的完整处理顺序
/// - 不持有任何资源，只依赖业务能力（services）
/// - 生成方与随机源都由调用方注入
pub struct ChapterFlow<'a> {
    generator: &'a dyn QuestionGenerator,
    config: &'a Config,
}

impl<'a> ChapterFlow<'a> {
    /// 创建新的章节处理流程
    pub fn new(generator: &'a dyn QuestionGenerator, config: &'a Config) -> Self {
        Self { generator, config }
    }

    /// 处理单个章节: 切块 → 生成 → 洗牌 → 校验
    pub async fn run<R: Rng + ?Sized>(
        &self,
        ctx: &ChapterCtx,
        text: &str,
        rng: &mut R,
        difficulty_target: u32,
    ) -> AppResult<ChapterResult> {
        // ========== 步骤 1: 切块 ==========
        let chunks = chunk_text(text, self.config);
        if chunks.is_empty() {
            warn!("{} 章节文本为空白, 无法出题", ctx);
            return Err(AppError::Validation(crate::error::ValidationError {
                chapter_id: ctx.chapter_id.clone(),
                violations: vec![crate::error::Violation::QuestionCount {
                    expected: self.config.questions_per_chapter,
                    actual: 0,
                }],
            }));
        }
        info!("{} 🔍 切块完成: {} 个 chunk", ctx, chunks.len());

        // ========== 步骤 2: 生成草稿 ==========
        let mut draft = self
            .generator
            .generate(&chunks, ctx, difficulty_target)
            .await?;
        info!("{} ✓ 草稿生成完成: {} 道题目", ctx, draft.questions.len());

        // ========== 步骤 3: 洗牌 ==========
        shuffle_options(&mut draft, rng);

        // ========== 步骤 4: 校验 ==========
        validate_chapter_set(&draft, self.config, chunks.len(), &ctx.chapter_id)?;
        info!("{} ✅ 校验通过", ctx);

        Ok(ChapterResult {
            chapter_id: ctx.chapter_id.clone(),
            chapter_title: ctx.chapter_title.clone(),
            draft,
        })
    }
}
