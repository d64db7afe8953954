//! 游戏输出数据契约
//!
//! 公开谜题与私有答案密钥的分离在类型层面强制执行：
//! [`PublicOption`] 上根本不存在正确性字段，序列化时不可能泄漏答案。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::question::Difficulty;

/// 公开选项（仅编号 + 文本，无正确性信息）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicOption {
    pub option_id: String,
    pub text: String,
}

/// 公开谜题
///
/// 不包含任何指向正确答案的信息，这是刻意的省略而非遗漏
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicPuzzle {
    /// 全局稳定的谜题标识，形如 "ch1_q01"
    pub puzzle_id: String,
    /// 所属章节
    pub chapter_id: String,
    /// 章节标题
    pub chapter_title: String,
    /// 题干
    pub question: String,
    /// 按编号排序的 4 个选项
    pub options: Vec<PublicOption>,
    /// 难度档位
    pub difficulty: Difficulty,
    /// 难度分数
    pub difficulty_rating: u32,
    /// 最短解题时间（秒）
    pub min_solve_time_seconds: u32,
    /// 题目来源的 chunk 下标
    pub source_chunk_index: usize,
}

/// 私有答案密钥（绝不公开）
///
/// anchor_string 形如 "ch1_q01|B"，本层不做任何哈希，
/// 链上承诺由下游系统负责
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateAnswerKey {
    pub puzzle_id: String,
    pub chapter_id: String,
    /// 正确选项编号 A-D
    pub correct_option_id: String,
    /// 锚定字符串 "<puzzle_id>|<correct_option_id>"
    pub anchor_string: String,
    /// 答案解析
    pub explanation: String,
}

/// 游戏元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMeta {
    /// 题目总数（章节数 × 每章节题目数）
    pub total_questions: usize,
    /// 每章节题目数
    pub questions_per_chapter: usize,
    /// 章节标识列表（按输入顺序）
    pub chapters: Vec<String>,
    /// 章节标识 → 标题（BTreeMap 保证序列化顺序可复现）
    pub chapter_titles: BTreeMap<String, String>,
    /// 请求的难度目标
    pub difficulty_target: u32,
    /// 每章节的难度分布
    pub difficulty_distribution_per_chapter: BTreeMap<String, usize>,
    /// 生成所用的模型（审计用）
    pub model_used: String,
    /// 生成温度（审计用）
    pub temperature: f32,
    /// 程序版本
    pub version: String,
}

/// 完整的游戏输出产物 - meta + 公开谜题 + 私有答案密钥
///
/// 不变量: public_puzzles 与 private_answer_key 等长，
/// puzzle_id 一一对应，顺序均为章节优先、题号次之
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamePayload {
    pub meta: GameMeta,
    pub public_puzzles: Vec<PublicPuzzle>,
    pub private_answer_key: Vec<PrivateAnswerKey>,
}
