//! 错误类型定义
//!
//! 所有核心错误都是携带结构化字段的值，调用方可以按错误类别映射为
//! 不同的外部响应，无需解析错误字符串：
//!
//! - [`SchemaError`] - 草稿构造期的结构错误（第一道廉价防线）
//! - [`ValidationError`] - 校验层的聚合错误，携带完整的违规列表
//! - [`FormatError`] - 格式化层发现的内部一致性错误（程序不变量被破坏）
//! - [`GenerationError`] - 外部 LLM 协作方的调用错误
//!
//! 核心层不做任何重试，重试策略属于编排方的职责。

use serde::Serialize;
use thiserror::Error;

use crate::models::question::Difficulty;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 草稿结构错误（构造期 schema 校验）
    #[error("草稿结构错误: {0}")]
    Schema(#[from] SchemaError),
    /// 完整性校验错误（校验层聚合报告）
    #[error("{0}")]
    Validation(#[from] ValidationError),
    /// 输出格式化错误（内部一致性被破坏）
    #[error("格式化错误: {0}")]
    Format(#[from] FormatError),
    /// LLM 生成错误
    #[error("生成错误: {0}")]
    Generation(#[from] GenerationError),
}

/// 应用程序结果类型别名
pub type AppResult<T> = Result<T, AppError>;

/// 草稿构造期的 schema 错误
///
/// 在解析 LLM 输出后立即检查，早于更全面的校验层
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("期望 {expected} 道题目, 实际 {actual} 道")]
    QuestionCount { expected: usize, actual: usize },
    #[error("题目 {question_number}: 期望 {expected} 个选项, 实际 {actual} 个")]
    OptionCount {
        question_number: u32,
        expected: usize,
        actual: usize,
    },
    #[error("题目 {question_number}: 必须恰好有 1 个正确选项, 实际 {actual} 个")]
    CorrectOptionCount { question_number: u32, actual: usize },
    #[error("题目 {question_number}: 选项编号 '{option_id}' 不合法")]
    InvalidOptionId {
        question_number: u32,
        option_id: String,
    },
    #[error(
        "题目 {question_number}: difficulty_rating {rating} 超出总范围 [{low}, {high}]",
        low = Difficulty::RATING_BOUNDS.0,
        high = Difficulty::RATING_BOUNDS.1
    )]
    RatingOutOfBounds { question_number: u32, rating: u32 },
    #[error("题目 {question_number}: min_solve_time_seconds {seconds} 超出范围 [10, 300]")]
    SolveTimeOutOfBounds { question_number: u32, seconds: u32 },
    #[error("题目 {question_number}: 题干长度不足 10 个字符")]
    QuestionTooShort { question_number: u32 },
    #[error("题目 {question_number}: 答案解析长度不足 10 个字符")]
    ExplanationTooShort { question_number: u32 },
    #[error("题目 {question_number}: 存在空白的选项文本")]
    EmptyOptionText { question_number: u32 },
    #[error("题目编号 {number} 超出范围 [1, {max}]")]
    QuestionNumberOutOfRange { number: u32, max: usize },
}

/// 单条校验违规记录
///
/// 每个变体携带自己的结构化字段，便于调用方逐条渲染
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Violation {
    /// 规则 1: 题目数量
    #[error("期望 {expected} 道题目, 实际 {actual} 道")]
    QuestionCount { expected: usize, actual: usize },
    /// 规则 2: 每道题目的选项数量
    #[error("题目 {question_number}: 期望 {expected} 个选项, 实际 {actual} 个")]
    OptionCount {
        question_number: u32,
        expected: usize,
        actual: usize,
    },
    /// 规则 3: 每道题目恰好 1 个正确选项
    #[error("题目 {question_number}: 期望 1 个正确选项, 实际 {actual} 个")]
    CorrectOptionCount { question_number: u32, actual: usize },
    /// 规则 4: 难度分布
    #[error("难度 '{difficulty}': 期望 {expected} 道, 实际 {actual} 道")]
    DifficultyDistribution {
        difficulty: Difficulty,
        expected: usize,
        actual: usize,
    },
    /// 规则 5: 题干不得重复（归一化后比较）
    #[error("题目 {question_number}: 题干与之前的题目重复")]
    DuplicateQuestion { question_number: u32 },
    /// 规则 6: 同一题目内选项不得重复（归一化后比较）
    #[error("题目 {question_number}: 存在重复的选项")]
    DuplicateOptions { question_number: u32 },
    /// 规则 7: source_chunk_index 必须在范围内
    #[error("题目 {question_number}: source_chunk_index {index} 超出范围 [0, {chunk_count})")]
    ChunkIndexOutOfRange {
        question_number: u32,
        index: usize,
        chunk_count: usize,
    },
    /// 规则 8: 题目编号必须恰好是 1..=N（与顺序无关）
    #[error("题目编号不匹配: 期望 {expected:?}, 实际 {actual:?}")]
    QuestionNumbering { expected: Vec<u32>, actual: Vec<u32> },
    /// 规则 9: 选项编号必须恰好是 A..D
    #[error("题目 {question_number}: 选项编号必须是 {expected:?}, 实际 {actual:?}")]
    OptionIds {
        question_number: u32,
        expected: Vec<String>,
        actual: Vec<String>,
    },
    /// 规则 10: difficulty_rating 必须落在其难度对应的闭区间内
    #[error(
        "题目 {question_number}: difficulty_rating {rating} 超出难度 '{difficulty}' 的范围 [{low}, {high}]"
    )]
    RatingOutOfRange {
        question_number: u32,
        rating: u32,
        difficulty: Difficulty,
        low: u32,
        high: u32,
    },
}

/// 校验层的聚合错误
///
/// 所有规则全部执行完毕后一次性报告，绝不只报告第一条违规
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("章节 {chapter_id} 校验失败, 共 {n} 条违规", n = .violations.len())]
pub struct ValidationError {
    pub chapter_id: String,
    pub violations: Vec<Violation>,
}

/// 格式化层的内部一致性错误
///
/// 校验通过后不应再出现，一旦出现说明程序不变量被破坏，
/// 必须大声失败而不是猜测
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("谜题 {puzzle_id} 没有正确选项 (校验层本应拦截)")]
    MissingCorrectOption { puzzle_id: String },
}

/// LLM 生成服务错误
#[derive(Debug, Error)]
pub enum GenerationError {
    /// API 调用失败
    #[error("LLM API 调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回内容为空
    #[error("LLM 返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 返回内容不是合法 JSON
    #[error("LLM 输出不是合法 JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
}

// ========== 便捷构造函数 ==========

impl GenerationError {
    /// 创建 API 调用失败错误
    pub fn api_call_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        GenerationError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        }
    }
}
