//! 草稿题目数据契约
//!
//! LLM 生成的原始草稿（含 is_correct 标志，仅内部使用）。
//! 草稿经历三个生命周期阶段：
//!
//! 1. 由外部生成方构造，构造期立即执行 [`DraftSet::ensure_schema`]
//! 2. 仅由 shuffler 原地修改选项顺序与编号
//! 3. 通过校验层后冻结，进入 [`ChapterResult`]

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// 题目难度档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Medium,
    Hard,
}

impl Difficulty {
    /// difficulty_rating 的绝对上下界（构造期检查用）
    pub const RATING_BOUNDS: (u32, u32) = (400, 1000);

    /// 难度档位 → rating 闭区间的唯一查表
    ///
    /// 生成提示词与校验层共用此表，避免两处定义漂移
    pub fn rating_range(self) -> (u32, u32) {
        match self {
            Difficulty::Medium => (450, 650),
            Difficulty::Hard => (651, 900),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

/// 草稿选项（含正确性标志，绝不出现在公开输出中）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftOption {
    /// 选项编号 A-D
    pub option_id: String,
    /// 选项文本
    pub text: String,
    /// 是否为正确答案
    pub is_correct: bool,
}

/// 单道草稿题目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftQuestion {
    /// 题目编号（1 开始）
    pub question_number: u32,
    /// 题干
    pub question: String,
    /// 选项列表（恰好 4 个）
    pub options: Vec<DraftOption>,
    /// 难度档位
    pub difficulty: Difficulty,
    /// 难度分数
    pub difficulty_rating: u32,
    /// 最短解题时间（秒）
    pub min_solve_time_seconds: u32,
    /// 答案解析（基于原文）
    pub explanation: String,
    /// 题目来源的 chunk 下标（0 开始）
    pub source_chunk_index: usize,
}

impl DraftQuestion {
    /// 正确选项数量
    pub fn correct_count(&self) -> usize {
        self.options.iter().filter(|o| o.is_correct).count()
    }

    /// 构造期 schema 检查
    ///
    /// 只检查单题的结构合法性，发现第一处问题立即返回；
    /// 跨题目的全量规则由校验层负责
    pub fn ensure_schema(
        &self,
        questions_per_chapter: usize,
        options_per_question: usize,
    ) -> Result<(), SchemaError> {
        let number = self.question_number;

        if number < 1 || number as usize > questions_per_chapter {
            return Err(SchemaError::QuestionNumberOutOfRange {
                number,
                max: questions_per_chapter,
            });
        }

        if self.question.trim().chars().count() < 10 {
            return Err(SchemaError::QuestionTooShort {
                question_number: number,
            });
        }

        if self.options.len() != options_per_question {
            return Err(SchemaError::OptionCount {
                question_number: number,
                expected: options_per_question,
                actual: self.options.len(),
            });
        }

        for option in &self.options {
            if option.text.trim().is_empty() {
                return Err(SchemaError::EmptyOptionText {
                    question_number: number,
                });
            }
            let valid_id = option.option_id.len() == 1
                && option.option_id.as_bytes()[0].is_ascii_uppercase()
                && (option.option_id.as_bytes()[0] - b'A') < options_per_question as u8;
            if !valid_id {
                return Err(SchemaError::InvalidOptionId {
                    question_number: number,
                    option_id: option.option_id.clone(),
                });
            }
        }

        let correct = self.correct_count();
        if correct != 1 {
            return Err(SchemaError::CorrectOptionCount {
                question_number: number,
                actual: correct,
            });
        }

        let (low, high) = Difficulty::RATING_BOUNDS;
        if self.difficulty_rating < low || self.difficulty_rating > high {
            return Err(SchemaError::RatingOutOfBounds {
                question_number: number,
                rating: self.difficulty_rating,
            });
        }

        if self.min_solve_time_seconds < 10 || self.min_solve_time_seconds > 300 {
            return Err(SchemaError::SolveTimeOutOfBounds {
                question_number: number,
                seconds: self.min_solve_time_seconds,
            });
        }

        if self.explanation.trim().chars().count() < 10 {
            return Err(SchemaError::ExplanationTooShort {
                question_number: number,
            });
        }

        Ok(())
    }
}

/// 单个章节的草稿题目集（校验层的操作单元）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftSet {
    pub questions: Vec<DraftQuestion>,
}

impl DraftSet {
    /// 对整个草稿集执行构造期 schema 检查
    pub fn ensure_schema(
        &self,
        questions_per_chapter: usize,
        options_per_question: usize,
    ) -> Result<(), SchemaError> {
        if self.questions.len() != questions_per_chapter {
            return Err(SchemaError::QuestionCount {
                expected: questions_per_chapter,
                actual: self.questions.len(),
            });
        }
        for question in &self.questions {
            question.ensure_schema(questions_per_chapter, options_per_question)?;
        }
        Ok(())
    }
}

/// 单个章节的处理结果（已通过校验，追加后不再修改）
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterResult {
    /// 章节标识
    pub chapter_id: String,
    /// 章节标题
    pub chapter_title: String,
    /// 校验通过的草稿集
    pub draft: DraftSet,
}
