//! 业务能力层
//!
//! 每个服务只负责一种能力，互相之间不直接调用，由流程层串联：
//! - [`chunker`] - 语义切块（确定性）
//! - [`generator`] - LLM 题目生成（唯一的外部协作点）
//! - [`shuffler`] - 选项洗牌（注入随机源）
//! - [`validator`] - 完整性校验（聚合报告）
//! - [`formatter`] - 公开/私有分离的输出组装（确定性）

pub mod chunker;
pub mod formatter;
pub mod generator;
pub mod shuffler;
pub mod validator;

pub use chunker::{chunk_text, estimate_tokens};
pub use formatter::format_game_output;
pub use generator::{LlmGenerator, QuestionGenerator};
pub use shuffler::shuffle_options;
pub use validator::validate_chapter_set;
