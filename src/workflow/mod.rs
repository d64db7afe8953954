//! 流程层
//!
//! 定义"一个章节"的处理顺序，串联业务能力层的各个服务

pub mod chapter_ctx;
pub mod chapter_flow;

pub use chapter_ctx::ChapterCtx;
pub use chapter_flow::ChapterFlow;
