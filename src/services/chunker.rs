//! 语义切块 - 业务能力层
//!
//! 把章节文本切分为语义连贯的有界片段。
//! 确定性：相同输入永远产生相同的 chunk 序列，无随机性，无外部状态。
//!
//! 切块策略：
//! 1. 先按空行切分段落（段落边界即主题边界）
//! 2. 段落内按标点 + 大写启发式切分句子
//! 3. 贪心累积句子直到达到 token 上限
//! 4. 相邻 chunk 之间保留重叠句子以维持上下文连续性
//! 5. 过小的尾部 chunk 合并进前一个

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::config::Config;

/// 尾部 chunk 的最小字符数，低于此值则并入前一个 chunk
const MIN_CHUNK_CHARS: usize = 100;

fn paragraph_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("固定正则必然合法"))
}

fn sentence_boundary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]\s+").expect("固定正则必然合法"))
}

/// 粗略的 token 估算：英文约 4 个字符一个 token
///
/// 生成服务的输入预算也使用同一估算，两处不允许各自实现
pub fn estimate_tokens(text: &str) -> usize {
    (text.chars().count() / 4).max(1)
}

/// 按标点 + 大写启发式切分句子
///
/// 句尾标点后跟空白、且空白后是大写字母或引号时视为句子边界；
/// 切出的空白句子被丢弃
fn split_into_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in sentence_boundary_re().find_iter(text) {
        let next_char = text[m.end()..].chars().next();
        let is_boundary = matches!(next_char, Some(c) if c.is_uppercase() || c == '"');
        if is_boundary {
            // 匹配以单字节标点开头，标点归属前一个句子
            let sentence = text[start..m.start() + 1].trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            start = m.end();
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }

    sentences
}

/// 将章节文本切分为语义 chunk 序列
///
/// 确定性纯函数：相同 `(text, config)` 永远得到相同输出。
///
/// # 边界情况
/// - 空白文本 → 空序列（文档化的边界情况，不是错误）
/// - 无句尾标点的文本 → 整个段落作为一个句子自然成块
pub fn chunk_text(text: &str, config: &Config) -> Vec<String> {
    if text.trim().is_empty() {
        debug!("输入文本为空白, 返回空的 chunk 序列");
        return Vec::new();
    }

    let max_tokens = config.chunk_max_tokens;
    let overlap = config.chunk_overlap_sentences;

    // ── 步骤 1 & 2: 段落 → 句子, 再平铺为一个有序列表 ──
    let mut all_sentences: Vec<String> = Vec::new();
    for paragraph in paragraph_re().split(text) {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }
        all_sentences.extend(split_into_sentences(paragraph));
    }

    if all_sentences.is_empty() {
        warn!("未检测到任何句子, 将整段文本作为单个 chunk 返回");
        return vec![text.to_string()];
    }

    debug!("文本切分出 {} 个句子", all_sentences.len());

    // ── 步骤 3: 贪心累积, 带句子重叠 ──
    let mut chunks: Vec<String> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_tokens = 0usize;

    for sentence in all_sentences {
        let sentence_tokens = estimate_tokens(&sentence);

        if current_tokens + sentence_tokens > max_tokens && !current.is_empty() {
            chunks.push(current.join(" "));

            // 保留尾部 overlap 个句子作为下一个 chunk 的上下文
            if overlap > 0 && current.len() > overlap {
                current = current.split_off(current.len() - overlap);
                current_tokens = current.iter().map(|s| estimate_tokens(s)).sum();
            } else {
                current.clear();
                current_tokens = 0;
            }
        }

        current_tokens += sentence_tokens;
        current.push(sentence);
    }

    if !current.is_empty() {
        chunks.push(current.join(" "));
    }

    // ── 步骤 4: 过小的尾部 chunk 并入前一个 ──
    if chunks.len() > 1 {
        let last_chars = chunks[chunks.len() - 1].chars().count();
        if last_chars < MIN_CHUNK_CHARS {
            let last = chunks.pop().unwrap_or_default();
            if let Some(previous) = chunks.last_mut() {
                previous.push(' ');
                previous.push_str(&last);
            }
        }
    }

    debug!(
        "切块完成: {} 个 chunk (max_tokens={}, overlap={})",
        chunks.len(),
        max_tokens,
        overlap
    );

    chunks
}
