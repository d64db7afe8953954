//! 选项洗牌 - 业务能力层
//!
//! LLM 生成的草稿里正确答案的位置带有系统性偏向（常落在 A 或 B），
//! 洗牌层负责消除这种偏向，并尽力避免同一字母在一个章节内
//! 承载过多正确答案。
//!
//! 随机源由调用方注入，生产路径用熵种子，测试用固定种子复现。

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use crate::models::question::DraftSet;

/// 同一字母在一个章节内最多承载的正确答案数
const MAX_CORRECT_PER_LABEL: usize = 2;

/// 单道题目的最大重洗次数，用尽后接受当前排列
const MAX_SHUFFLE_ATTEMPTS: usize = 10;

/// 原地打乱每道题目的选项顺序并重新分配编号
///
/// 逐题处理：打乱选项后按新位置重新赋予 A、B、C、D 编号，
/// 因此正确答案落点完全由洗牌结果决定。若正确字母已在本章节
/// 用满 [`MAX_CORRECT_PER_LABEL`] 次则重洗，最多
/// [`MAX_SHUFFLE_ATTEMPTS`] 次；约束是尽力而为的软约束，
/// 用尽次数后接受当前排列，绝不因此失败。
///
/// 不改变选项文本、正确性标志和题目数量，只改变顺序与编号。
pub fn shuffle_options<R: Rng + ?Sized>(set: &mut DraftSet, rng: &mut R) {
    let mut correct_label_counts: Vec<(char, usize)> = Vec::new();

    for question in &mut set.questions {
        // 剥离旧编号, 只保留 (文本, 正确性)
        let mut pairs: Vec<(String, bool)> = question
            .options
            .drain(..)
            .map(|o| (o.text, o.is_correct))
            .collect();

        let mut accepted_letter = None;
        for attempt in 0..MAX_SHUFFLE_ATTEMPTS {
            pairs.shuffle(rng);

            let correct_pos = pairs.iter().position(|(_, is_correct)| *is_correct);
            let Some(pos) = correct_pos else {
                // 没有正确选项属于结构问题, 留给校验层报告
                break;
            };

            let letter = char::from(b'A' + pos as u8);
            let used = correct_label_counts
                .iter()
                .find(|(l, _)| *l == letter)
                .map(|(_, n)| *n)
                .unwrap_or(0);

            if used < MAX_CORRECT_PER_LABEL {
                accepted_letter = Some(letter);
                break;
            }

            if attempt + 1 == MAX_SHUFFLE_ATTEMPTS {
                warn!(
                    "题目 {} 重洗 {} 次后仍集中在字母 {}, 接受当前排列",
                    question.question_number, MAX_SHUFFLE_ATTEMPTS, letter
                );
                accepted_letter = Some(letter);
            }
        }

        if let Some(letter) = accepted_letter {
            match correct_label_counts.iter_mut().find(|(l, _)| *l == letter) {
                Some(entry) => entry.1 += 1,
                None => correct_label_counts.push((letter, 1)),
            }
        }

        // 按洗牌后的位置重建选项并赋予新编号
        question.options = pairs
            .into_iter()
            .enumerate()
            .map(|(i, (text, is_correct))| crate::models::question::DraftOption {
                option_id: char::from(b'A' + i as u8).to_string(),
                text,
                is_correct,
            })
            .collect();
    }

    correct_label_counts.sort_by_key(|(l, _)| *l);
    debug!("洗牌完成, 正确答案字母分布: {:?}", correct_label_counts);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{Difficulty, DraftOption, DraftQuestion};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{BTreeMap, BTreeSet};

    fn make_set(question_count: usize) -> DraftSet {
        let questions = (1..=question_count as u32)
            .map(|n| DraftQuestion {
                question_number: n,
                question: format!("这是第 {} 道题目的测试题干内容？", n),
                options: vec![
                    DraftOption {
                        option_id: "A".to_string(),
                        text: format!("题 {} 的正确选项", n),
                        is_correct: true,
                    },
                    DraftOption {
                        option_id: "B".to_string(),
                        text: format!("题 {} 的干扰项一", n),
                        is_correct: false,
                    },
                    DraftOption {
                        option_id: "C".to_string(),
                        text: format!("题 {} 的干扰项二", n),
                        is_correct: false,
                    },
                    DraftOption {
                        option_id: "D".to_string(),
                        text: format!("题 {} 的干扰项三", n),
                        is_correct: false,
                    },
                ],
                difficulty: Difficulty::Medium,
                difficulty_rating: 500,
                min_solve_time_seconds: 40,
                explanation: format!("第 {} 题的解析内容说明。", n),
                source_chunk_index: 0,
            })
            .collect();
        DraftSet { questions }
    }

    #[test]
    fn test_same_seed_produces_same_result() {
        let mut set1 = make_set(5);
        let mut set2 = make_set(5);
        shuffle_options(&mut set1, &mut StdRng::seed_from_u64(42));
        shuffle_options(&mut set2, &mut StdRng::seed_from_u64(42));
        assert_eq!(set1, set2);
    }

    #[test]
    fn test_option_texts_and_correctness_preserved() {
        let original = make_set(5);
        let mut shuffled = original.clone();
        shuffle_options(&mut shuffled, &mut StdRng::seed_from_u64(7));

        for (before, after) in original.questions.iter().zip(&shuffled.questions) {
            assert_eq!(after.options.len(), 4);
            // 文本集合不变
            let texts_before: BTreeSet<_> = before.options.iter().map(|o| &o.text).collect();
            let texts_after: BTreeSet<_> = after.options.iter().map(|o| &o.text).collect();
            assert_eq!(texts_before, texts_after);
            // 仍然恰好一个正确选项, 且正确选项的文本不变
            assert_eq!(after.correct_count(), 1);
            let correct_before = before.options.iter().find(|o| o.is_correct).unwrap();
            let correct_after = after.options.iter().find(|o| o.is_correct).unwrap();
            assert_eq!(correct_before.text, correct_after.text);
        }
    }

    #[test]
    fn test_option_ids_reassigned_in_order() {
        let mut set = make_set(5);
        shuffle_options(&mut set, &mut StdRng::seed_from_u64(3));
        for question in &set.questions {
            let ids: Vec<&str> = question.options.iter().map(|o| o.option_id.as_str()).collect();
            assert_eq!(ids, vec!["A", "B", "C", "D"]);
        }
    }

    #[test]
    fn test_no_letter_carries_more_than_two_correct_answers() {
        // 5 道题 4 个字母, 软约束在固定种子下应当可满足
        let mut set = make_set(5);
        shuffle_options(&mut set, &mut StdRng::seed_from_u64(2024));

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for question in &set.questions {
            let letter = question
                .options
                .iter()
                .find(|o| o.is_correct)
                .map(|o| o.option_id.clone())
                .unwrap();
            *counts.entry(letter).or_insert(0) += 1;
        }
        for (letter, count) in &counts {
            assert!(
                *count <= MAX_CORRECT_PER_LABEL,
                "字母 {} 承载了 {} 个正确答案",
                letter,
                count
            );
        }
    }

    #[test]
    fn test_question_without_correct_option_left_for_validator() {
        let mut set = make_set(1);
        for option in &mut set.questions[0].options {
            option.is_correct = false;
        }
        // 不 panic, 选项仍然重建为 4 个
        shuffle_options(&mut set, &mut StdRng::seed_from_u64(1));
        assert_eq!(set.questions[0].options.len(), 4);
        assert_eq!(set.questions[0].correct_count(), 0);
    }
}
