//! # Game Maker Agent
//!
//! 一个将长篇章节文本转换为教育游戏题目的 Rust 应用程序
//!
//! 每个章节生成 5 道选择题（2 道 medium + 3 道 hard），输出拆分为
//! 公开谜题（不含答案）和私有答案密钥（含锚定字符串）两部分。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - 数据契约：草稿题目、公开谜题、私有答案密钥
//! - 构造期 schema 校验是第一道防线（廉价、立即失败）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个能力只处理单个章节
//! - `chunker` - 确定性语义切块能力（纯函数，无 I/O）
//! - `shuffler` - 选项重排能力（唯一的随机性来源，随机源可注入）
//! - `validator` - 十条完整性规则校验能力（全量收集违规，不短路）
//! - `formatter` - 公开/私有分离与多章节合并能力
//! - `generator` - 外部 LLM 生成能力（黑盒协作方，trait 可替换）
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个章节"的完整处理流程
//! - `ChapterCtx` - 上下文封装（chapter_id + chapter_title）
//! - `ChapterFlow` - 流程编排（chunk → generate → shuffle → validate）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/game_processor` - 游戏构建器，遍历章节清单，
//!   汇总所有章节结果后统一格式化输出
//!
//! ## 数据流向
//!
//! 原始文本 → chunks → LLM 草稿 → 重排草稿 → 校验通过的草稿
//! → ChapterResult → GamePayload（唯一的持久化产物）

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{
    AppError, AppResult, FormatError, GenerationError, SchemaError, ValidationError, Violation,
};
pub use models::{
    ChapterResult, Difficulty, DraftOption, DraftQuestion, DraftSet, GameMeta, GamePayload,
    PrivateAnswerKey, PublicOption, PublicPuzzle,
};
pub use orchestrator::App;
pub use services::generator::{LlmGenerator, QuestionGenerator};
pub use services::{chunk_text, format_game_output, shuffle_options, validate_chapter_set};
pub use workflow::{ChapterCtx, ChapterFlow};
