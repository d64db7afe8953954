//! 章节处理上下文
//!
//! 封装"我正在处理第几个章节"这一信息

use std::fmt::Display;

/// 章节处理上下文
///
/// 包含处理单个章节所需的所有上下文信息
#[derive(Debug, Clone)]
pub struct ChapterCtx {
    /// 章节标识（写入 puzzle_id）
    pub chapter_id: String,

    /// 章节标题
    pub chapter_title: String,

    /// 章节在清单中的索引（仅用于日志显示，从 0 开始）
    pub chapter_index: usize,
}

impl ChapterCtx {
    /// 创建新的章节上下文
    pub fn new(
        chapter_id: impl Into<String>,
        chapter_title: impl Into<String>,
        chapter_index: usize,
    ) -> Self {
        Self {
            chapter_id: chapter_id.into(),
            chapter_title: chapter_title.into(),
            chapter_index,
        }
    }
}

impl Display for ChapterCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[章节 #{} \"{}\"]", self.chapter_id, self.chapter_title)
    }
}
