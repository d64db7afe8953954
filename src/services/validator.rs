//! 完整性校验 - 业务能力层
//!
//! 对单个章节的草稿集执行全部规则并收集所有违规，
//! 绝不在第一条违规处短路：LLM 输出坏掉时往往同时坏多处，
//! 一次性的完整报告才有诊断价值。
//!
//! 校验规则（全部执行）：
//! 1.  题目数量恰好等于配置值
//! 2.  每道题目的选项数量恰好等于配置值
//! 3.  每道题目恰好 1 个正确选项
//! 4.  难度分布恰好符合配置（medium/hard 各自数量）
//! 5.  题干不得重复（归一化后比较）
//! 6.  同一题目内选项不得重复（归一化后比较）
//! 7.  source_chunk_index 必须落在 [0, chunk_count)
//! 8.  题目编号必须恰好覆盖 1..=N（与出现顺序无关）
//! 9.  选项编号必须恰好是 A..（按配置数量）
//! 10. difficulty_rating 必须落在其难度档位对应的闭区间内

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ValidationError, Violation};
use crate::models::question::{Difficulty, DraftSet};

/// 文本归一化：小写 + 压缩空白
///
/// 重复检测只关心语义上的相同，不关心大小写和空白差异
fn normalize_text(text: &str) -> String {
    text.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 校验单个章节的草稿集
///
/// 执行全部规则后返回；任何违规都会让整个章节失败，
/// 部分可用的章节没有意义
pub fn validate_chapter_set(
    set: &DraftSet,
    config: &Config,
    chunk_count: usize,
    chapter_id: &str,
) -> Result<(), ValidationError> {
    let mut violations: Vec<Violation> = Vec::new();

    // ── 规则 1: 题目数量 ──
    if set.questions.len() != config.questions_per_chapter {
        violations.push(Violation::QuestionCount {
            expected: config.questions_per_chapter,
            actual: set.questions.len(),
        });
    }

    // ── 规则 4: 难度分布 ──
    let mut difficulty_counts: BTreeMap<Difficulty, usize> = BTreeMap::new();
    for question in &set.questions {
        *difficulty_counts.entry(question.difficulty).or_insert(0) += 1;
    }
    let expected_distribution = [
        (Difficulty::Medium, config.medium_per_chapter),
        (Difficulty::Hard, config.hard_per_chapter),
    ];
    for (difficulty, expected) in expected_distribution {
        let actual = difficulty_counts.get(&difficulty).copied().unwrap_or(0);
        if actual != expected {
            violations.push(Violation::DifficultyDistribution {
                difficulty,
                expected,
                actual,
            });
        }
    }

    // ── 规则 8: 题目编号恰好覆盖 1..=N ──
    let expected_numbers: Vec<u32> = (1..=config.questions_per_chapter as u32).collect();
    let mut actual_numbers: Vec<u32> = set.questions.iter().map(|q| q.question_number).collect();
    actual_numbers.sort_unstable();
    if actual_numbers != expected_numbers {
        violations.push(Violation::QuestionNumbering {
            expected: expected_numbers,
            actual: actual_numbers,
        });
    }

    // ── 规则 5: 题干去重（归一化后） ──
    let mut seen_questions: BTreeSet<String> = BTreeSet::new();
    for question in &set.questions {
        let normalized = normalize_text(&question.question);
        if !seen_questions.insert(normalized) {
            violations.push(Violation::DuplicateQuestion {
                question_number: question.question_number,
            });
        }
    }

    // ── 逐题规则: 2, 3, 6, 7, 9, 10 ──
    let expected_option_ids: Vec<String> = (0..config.options_per_question)
        .map(|i| char::from(b'A' + i as u8).to_string())
        .collect();

    for question in &set.questions {
        let number = question.question_number;

        // 规则 2: 选项数量
        if question.options.len() != config.options_per_question {
            violations.push(Violation::OptionCount {
                question_number: number,
                expected: config.options_per_question,
                actual: question.options.len(),
            });
        }

        // 规则 3: 恰好 1 个正确选项
        let correct = question.correct_count();
        if correct != 1 {
            violations.push(Violation::CorrectOptionCount {
                question_number: number,
                actual: correct,
            });
        }

        // 规则 6: 选项去重（归一化后）
        let mut seen_options: BTreeSet<String> = BTreeSet::new();
        let mut has_duplicate = false;
        for option in &question.options {
            if !seen_options.insert(normalize_text(&option.text)) {
                has_duplicate = true;
            }
        }
        if has_duplicate {
            violations.push(Violation::DuplicateOptions {
                question_number: number,
            });
        }

        // 规则 7: chunk 下标范围
        if question.source_chunk_index >= chunk_count {
            violations.push(Violation::ChunkIndexOutOfRange {
                question_number: number,
                index: question.source_chunk_index,
                chunk_count,
            });
        }

        // 规则 9: 选项编号恰好是 A..（排序后比较, 与顺序无关）
        let mut actual_ids: Vec<String> =
            question.options.iter().map(|o| o.option_id.clone()).collect();
        actual_ids.sort_unstable();
        if actual_ids != expected_option_ids {
            violations.push(Violation::OptionIds {
                question_number: number,
                expected: expected_option_ids.clone(),
                actual: actual_ids,
            });
        }

        // 规则 10: rating 落在难度档位对应区间
        let (low, high) = question.difficulty.rating_range();
        if question.difficulty_rating < low || question.difficulty_rating > high {
            violations.push(Violation::RatingOutOfRange {
                question_number: number,
                rating: question.difficulty_rating,
                difficulty: question.difficulty,
                low,
                high,
            });
        }
    }

    if violations.is_empty() {
        debug!("章节 {} 校验通过 ({} 道题目)", chapter_id, set.questions.len());
        Ok(())
    } else {
        warn!("章节 {} 校验失败, 共 {} 条违规", chapter_id, violations.len());
        for violation in &violations {
            warn!("  - {}", violation);
        }
        Err(ValidationError {
            chapter_id: chapter_id.to_string(),
            violations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{DraftOption, DraftQuestion};

    fn make_question(number: u32, difficulty: Difficulty, rating: u32) -> DraftQuestion {
        DraftQuestion {
            question_number: number,
            question: format!("What does the source text say about topic number {}?", number),
            options: vec![
                DraftOption {
                    option_id: "A".to_string(),
                    text: format!("First distinct answer for question {}", number),
                    is_correct: false,
                },
                DraftOption {
                    option_id: "B".to_string(),
                    text: format!("Second distinct answer for question {}", number),
                    is_correct: true,
                },
                DraftOption {
                    option_id: "C".to_string(),
                    text: format!("Third distinct answer for question {}", number),
                    is_correct: false,
                },
                DraftOption {
                    option_id: "D".to_string(),
                    text: format!("Fourth distinct answer for question {}", number),
                    is_correct: false,
                },
            ],
            difficulty,
            difficulty_rating: rating,
            min_solve_time_seconds: 45,
            explanation: format!("The text explicitly states the answer to question {}.", number),
            source_chunk_index: 0,
        }
    }

    /// 2 medium + 3 hard, rating 分别落在各自区间内
    fn make_valid_set() -> DraftSet {
        DraftSet {
            questions: vec![
                make_question(1, Difficulty::Medium, 500),
                make_question(2, Difficulty::Medium, 600),
                make_question(3, Difficulty::Hard, 700),
                make_question(4, Difficulty::Hard, 800),
                make_question(5, Difficulty::Hard, 850),
            ],
        }
    }

    fn expect_violations(set: &DraftSet, chunk_count: usize) -> Vec<Violation> {
        validate_chapter_set(set, &Config::default(), chunk_count, "1")
            .unwrap_err()
            .violations
    }

    #[test]
    fn test_valid_set_passes() {
        let set = make_valid_set();
        assert!(validate_chapter_set(&set, &Config::default(), 3, "1").is_ok());
    }

    #[test]
    fn test_wrong_question_count_detected() {
        let mut set = make_valid_set();
        set.questions.pop();
        let violations = expect_violations(&set, 3);
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::QuestionCount { expected: 5, actual: 4 })));
    }

    #[test]
    fn test_wrong_option_count_detected() {
        let mut set = make_valid_set();
        set.questions[2].options.pop();
        let violations = expect_violations(&set, 3);
        assert!(violations.iter().any(|v| matches!(
            v,
            Violation::OptionCount { question_number: 3, expected: 4, actual: 3 }
        )));
    }

    #[test]
    fn test_multiple_correct_options_detected() {
        let mut set = make_valid_set();
        set.questions[0].options[0].is_correct = true;
        let violations = expect_violations(&set, 3);
        assert!(violations.iter().any(|v| matches!(
            v,
            Violation::CorrectOptionCount { question_number: 1, actual: 2 }
        )));
    }

    #[test]
    fn test_zero_correct_options_detected() {
        let mut set = make_valid_set();
        for option in &mut set.questions[4].options {
            option.is_correct = false;
        }
        let violations = expect_violations(&set, 3);
        assert!(violations.iter().any(|v| matches!(
            v,
            Violation::CorrectOptionCount { question_number: 5, actual: 0 }
        )));
    }

    #[test]
    fn test_difficulty_distribution_detected() {
        let mut set = make_valid_set();
        set.questions[0].difficulty = Difficulty::Hard;
        set.questions[0].difficulty_rating = 700;
        let violations = expect_violations(&set, 3);
        // medium 缺 1, hard 多 1, 两条违规都要报告
        assert!(violations.iter().any(|v| matches!(
            v,
            Violation::DifficultyDistribution { difficulty: Difficulty::Medium, expected: 2, actual: 1 }
        )));
        assert!(violations.iter().any(|v| matches!(
            v,
            Violation::DifficultyDistribution { difficulty: Difficulty::Hard, expected: 3, actual: 4 }
        )));
    }

    #[test]
    fn test_duplicate_question_detected_after_normalization() {
        let mut set = make_valid_set();
        // 大小写和空白差异不影响重复判定
        set.questions[1].question = format!(
            "  {}  ",
            set.questions[0].question.to_uppercase()
        );
        let violations = expect_violations(&set, 3);
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::DuplicateQuestion { question_number: 2 })));
    }

    #[test]
    fn test_duplicate_options_detected() {
        let mut set = make_valid_set();
        set.questions[3].options[2].text = set.questions[3].options[0].text.clone();
        let violations = expect_violations(&set, 3);
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::DuplicateOptions { question_number: 4 })));
    }

    #[test]
    fn test_chunk_index_out_of_range_detected() {
        let mut set = make_valid_set();
        set.questions[2].source_chunk_index = 7;
        let violations = expect_violations(&set, 3);
        assert!(violations.iter().any(|v| matches!(
            v,
            Violation::ChunkIndexOutOfRange { question_number: 3, index: 7, chunk_count: 3 }
        )));
    }

    #[test]
    fn test_question_numbering_gap_detected() {
        let mut set = make_valid_set();
        set.questions[4].question_number = 7;
        let violations = expect_violations(&set, 3);
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::QuestionNumbering { .. })));
    }

    #[test]
    fn test_question_numbering_order_independent() {
        let mut set = make_valid_set();
        // 顺序打乱但编号集合完整, 不算违规
        set.questions.swap(0, 4);
        assert!(validate_chapter_set(&set, &Config::default(), 3, "1").is_ok());
    }

    #[test]
    fn test_bad_option_ids_detected() {
        let mut set = make_valid_set();
        set.questions[1].options[3].option_id = "E".to_string();
        let violations = expect_violations(&set, 3);
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::OptionIds { question_number: 2, .. })));
    }

    #[test]
    fn test_rating_outside_tier_range_detected() {
        let mut set = make_valid_set();
        // 700 对 hard 合法, 对 medium 不合法
        set.questions[0].difficulty_rating = 700;
        let violations = expect_violations(&set, 3);
        assert!(violations.iter().any(|v| matches!(
            v,
            Violation::RatingOutOfRange {
                question_number: 1,
                rating: 700,
                difficulty: Difficulty::Medium,
                low: 450,
                high: 650,
            }
        )));
    }

    #[test]
    fn test_all_violations_collected_without_short_circuit() {
        let mut set = make_valid_set();
        set.questions.pop(); // 规则 1 + 规则 4 + 规则 8
        set.questions[0].options[0].is_correct = true; // 规则 3
        set.questions[1].source_chunk_index = 99; // 规则 7
        let violations = expect_violations(&set, 3);
        assert!(violations.len() >= 4, "期望至少 4 条违规, 实际 {:?}", violations);
        assert!(violations.iter().any(|v| matches!(v, Violation::QuestionCount { .. })));
        assert!(violations.iter().any(|v| matches!(v, Violation::CorrectOptionCount { .. })));
        assert!(violations.iter().any(|v| matches!(v, Violation::ChunkIndexOutOfRange { .. })));
        assert!(violations.iter().any(|v| matches!(v, Violation::QuestionNumbering { .. })));
    }

    #[test]
    fn test_normalize_text_collapses_case_and_whitespace() {
        assert_eq!(
            normalize_text("  What   IS  machine\tlearning? "),
            "what is machine learning?"
        );
    }
}
