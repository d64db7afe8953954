//! 输出格式化 - 业务能力层
//!
//! 把所有章节的已校验草稿合并为最终游戏产物，并执行
//! 公开谜题与私有答案密钥的分离。答案隐藏由类型系统保证：
//! [`crate::models::PublicOption`] 上不存在正确性字段。
//!
//! 确定性纯函数：相同输入永远产生相同的 [`GamePayload`]，
//! 序列化后字节相同。

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::FormatError;
use crate::models::payload::{GameMeta, GamePayload, PrivateAnswerKey, PublicOption, PublicPuzzle};
use crate::models::question::ChapterResult;

/// 合并多个章节的处理结果, 输出公开/私有分离的游戏产物
///
/// 排序规则：章节按输入顺序，章节内按 question_number 升序，
/// 选项按 option_id 字典序。谜题标识形如 `ch{chapter_id}_q{NN}`，
/// 锚定字符串形如 `{puzzle_id}|{correct_option_id}`。
///
/// 校验层保证每道题恰好一个正确选项；此处再次发现缺失时
/// 返回 [`FormatError::MissingCorrectOption`]，绝不猜测。
pub fn format_game_output(
    chapter_results: &[ChapterResult],
    difficulty_target: u32,
    config: &Config,
) -> Result<GamePayload, FormatError> {
    let mut public_puzzles: Vec<PublicPuzzle> = Vec::new();
    let mut private_answer_key: Vec<PrivateAnswerKey> = Vec::new();
    let mut chapter_ids: Vec<String> = Vec::new();
    let mut chapter_titles: BTreeMap<String, String> = BTreeMap::new();

    for result in chapter_results {
        chapter_ids.push(result.chapter_id.clone());
        chapter_titles.insert(result.chapter_id.clone(), result.chapter_title.clone());

        // 章节内按题目编号升序, 与草稿中的出现顺序无关
        let mut questions: Vec<_> = result.draft.questions.iter().collect();
        questions.sort_by_key(|q| q.question_number);

        for question in questions {
            let puzzle_id = format!("ch{}_q{:02}", result.chapter_id, question.question_number);

            let correct = question
                .options
                .iter()
                .find(|o| o.is_correct)
                .ok_or_else(|| FormatError::MissingCorrectOption {
                    puzzle_id: puzzle_id.clone(),
                })?;

            // 公开侧: 剥离正确性, 选项按编号排序
            let mut options: Vec<PublicOption> = question
                .options
                .iter()
                .map(|o| PublicOption {
                    option_id: o.option_id.clone(),
                    text: o.text.clone(),
                })
                .collect();
            options.sort_by(|a, b| a.option_id.cmp(&b.option_id));

            public_puzzles.push(PublicPuzzle {
                puzzle_id: puzzle_id.clone(),
                chapter_id: result.chapter_id.clone(),
                chapter_title: result.chapter_title.clone(),
                question: question.question.clone(),
                options,
                difficulty: question.difficulty,
                difficulty_rating: question.difficulty_rating,
                min_solve_time_seconds: question.min_solve_time_seconds,
                source_chunk_index: question.source_chunk_index,
            });

            // 私有侧: 答案 + 锚定字符串 + 解析
            let anchor_string = format!("{}|{}", puzzle_id, correct.option_id);
            private_answer_key.push(PrivateAnswerKey {
                puzzle_id,
                chapter_id: result.chapter_id.clone(),
                correct_option_id: correct.option_id.clone(),
                anchor_string,
                explanation: question.explanation.clone(),
            });
        }

        debug!(
            "章节 {} 格式化完成: {} 道谜题",
            result.chapter_id,
            result.draft.questions.len()
        );
    }

    let meta = GameMeta {
        total_questions: public_puzzles.len(),
        questions_per_chapter: config.questions_per_chapter,
        chapters: chapter_ids,
        chapter_titles,
        difficulty_target,
        difficulty_distribution_per_chapter: config.difficulty_distribution(),
        model_used: config.llm_model_name.clone(),
        temperature: config.llm_temperature,
        version: config.version.clone(),
    };

    info!(
        "游戏产物组装完成: {} 个章节, {} 道公开谜题, {} 条答案密钥",
        meta.chapters.len(),
        public_puzzles.len(),
        private_answer_key.len()
    );

    Ok(GamePayload {
        meta,
        public_puzzles,
        private_answer_key,
    })
}
