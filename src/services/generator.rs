//! 题目生成 - 业务能力层
//!
//! 只负责"按 chunk 生成一个章节的草稿题目集"这一能力，不关心流程。
//! 生成方以 trait 形式注入，流程层和测试可以替换为确定性实现。
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 调用兼容 OpenAI API 的服务（Groq 等）
//! - 响应按 JSON 解析后立即执行构造期 schema 检查

use std::sync::OnceLock;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppResult, GenerationError};
use crate::models::question::DraftSet;
use crate::services::chunker::estimate_tokens;
use crate::workflow::ChapterCtx;

/// 发给模型的输入 token 上限（系统提示词 + 用户提示词）
const MAX_INPUT_TOKENS: usize = 6000;

/// 提示词骨架（chunk 分隔符、指令等）的估算开销
const PROMPT_OVERHEAD_TOKENS: usize = 500;

/// 系统提示词
///
/// 难度区间必须与 [`crate::models::Difficulty::rating_range`] 一致
const SYSTEM_PROMPT: &str = r#"You are an expert quiz designer for an educational trivia game. You create multiple-choice questions from book chapter excerpts.

Requirements:
- Generate EXACTLY 5 questions per request.
- Each question has EXACTLY 4 options with option_id "A", "B", "C", "D".
- EXACTLY 1 option per question has "is_correct": true.
- Difficulty mix: EXACTLY 2 "medium" questions and EXACTLY 3 "hard" questions.
- "medium" questions must have "difficulty_rating" between 450 and 650.
- "hard" questions must have "difficulty_rating" between 651 and 900.
- "min_solve_time_seconds" between 10 and 300.
- Every question must be answerable from the provided source chunks alone.
- "source_chunk_index" is the index printed in the chunk header the question is based on.
- "explanation" cites what the source text says, at least one full sentence.
- No duplicate questions. No duplicate options within a question.
- Wrong options must be plausible but clearly incorrect given the source text.

Respond with ONLY a JSON object, no prose before or after:
{
  "questions": [
    {
      "question_number": 1,
      "question": "...",
      "options": [
        {"option_id": "A", "text": "...", "is_correct": false},
        {"option_id": "B", "text": "...", "is_correct": true},
        {"option_id": "C", "text": "...", "is_correct": false},
        {"option_id": "D", "text": "...", "is_correct": false}
      ],
      "difficulty": "medium",
      "difficulty_rating": 520,
      "min_solve_time_seconds": 45,
      "explanation": "...",
      "source_chunk_index": 0
    }
  ]
}

Self-check before responding:
1. Exactly 5 questions, numbered 1 through 5?
2. Exactly 2 medium and 3 hard?
3. Every rating inside its difficulty band?
4. Exactly one correct option per question?
5. Valid JSON with no trailing commas?"#;

fn json_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("固定正则必然合法")
    })
}

fn bare_json_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("固定正则必然合法"))
}

/// 题目生成能力的抽象
///
/// 流程层只依赖此 trait，生产路径注入 [`LlmGenerator`]，
/// 测试注入确定性桩实现
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// 基于章节的语义 chunk 生成一个草稿题目集
    async fn generate(
        &self,
        chunks: &[String],
        ctx: &ChapterCtx,
        difficulty_target: u32,
    ) -> AppResult<DraftSet>;
}

/// 基于 LLM 的生成器（生产实现）
pub struct LlmGenerator {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
    questions_per_chapter: usize,
    options_per_question: usize,
}

impl LlmGenerator {
    /// 创建新的 LLM 生成器
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
            questions_per_chapter: config.questions_per_chapter,
            options_per_question: config.options_per_question,
        }
    }
}

/// 在输入 token 预算内挑选 chunk 下标
///
/// 全部装得下时返回全部；否则按固定步长采样以保证覆盖
/// 章节的开头、中间和结尾，并尽量带上最后一个 chunk。
/// 采样是确定性的，相同输入得到相同下标序列。
fn select_chunks_within_budget(chunks: &[String]) -> Vec<usize> {
    let overhead = estimate_tokens(SYSTEM_PROMPT) + PROMPT_OVERHEAD_TOKENS;
    let budget = MAX_INPUT_TOKENS.saturating_sub(overhead);

    let total: usize = chunks.iter().map(|c| estimate_tokens(c)).sum();
    if total <= budget {
        return (0..chunks.len()).collect();
    }

    let step = (chunks.len() / 10).max(1);
    let mut selected = Vec::new();
    let mut used = 0usize;
    let mut index = 0;
    while index < chunks.len() {
        let tokens = estimate_tokens(&chunks[index]);
        if used + tokens > budget {
            break;
        }
        used += tokens;
        selected.push(index);
        index += step;
    }

    // 结尾的内容同样出题, 预算允许时补上最后一个 chunk
    if let Some(last) = chunks.len().checked_sub(1) {
        if !selected.contains(&last) && used + estimate_tokens(&chunks[last]) <= budget {
            selected.push(last);
        }
    }

    if selected.is_empty() {
        warn!("单个 chunk 已超出输入预算, 退化为只发送第一个 chunk");
        selected.push(0);
    }

    selected
}

/// 构建用户提示词
///
/// 每个 chunk 的标题行带原始下标, 模型据此填 source_chunk_index
fn build_user_prompt(
    chunks: &[String],
    selected: &[usize],
    ctx: &ChapterCtx,
    difficulty_target: u32,
) -> String {
    let mut sections = Vec::with_capacity(selected.len());
    for &index in selected {
        sections.push(format!("--- SOURCE CHUNK {} ---\n{}", index, chunks[index]));
    }

    format!(
        "Chapter {}: \"{}\"\nGame difficulty target: {} (400-1000 scale).\n\nSource chunks:\n\n{}\n\nGenerate the quiz questions now.",
        ctx.chapter_id,
        ctx.chapter_title,
        difficulty_target,
        sections.join("\n\n")
    )
}

/// 从 LLM 响应中提取 JSON 对象
///
/// 模型偶尔无视指令包一层 markdown 围栏或附带前后缀文字，
/// 先剥围栏, 再退而取最外层花括号片段
fn extract_json_from_response(response: &str) -> &str {
    if let Some(captures) = json_fence_re().captures(response) {
        if let Some(inner) = captures.get(1) {
            return inner.as_str();
        }
    }
    if let Some(m) = bare_json_re().find(response) {
        return m.as_str();
    }
    response.trim()
}

#[async_trait]
impl QuestionGenerator for LlmGenerator {
    async fn generate(
        &self,
        chunks: &[String],
        ctx: &ChapterCtx,
        difficulty_target: u32,
    ) -> AppResult<DraftSet> {
        let selected = select_chunks_within_budget(chunks);
        debug!(
            "章节 {} 生成开始: {}/{} 个 chunk 进入提示词, 模型: {}",
            ctx.chapter_id,
            selected.len(),
            chunks.len(),
            self.model_name
        );

        let user_prompt = build_user_prompt(chunks, &selected, ctx, difficulty_target);
        debug!("用户提示词长度: {} 字符", user_prompt.len());

        // 构建消息列表
        let mut messages = Vec::new();

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(SYSTEM_PROMPT)
            .build()
            .map_err(|e| GenerationError::api_call_failed(&self.model_name, e))?;
        messages.push(ChatCompletionRequestMessage::System(system_msg));

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_prompt)
            .build()
            .map_err(|e| GenerationError::api_call_failed(&self.model_name, e))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        // 构建请求
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| GenerationError::api_call_failed(&self.model_name, e))?;

        // 调用 API
        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            GenerationError::api_call_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        // 提取响应内容
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| GenerationError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        if content.trim().is_empty() {
            return Err(GenerationError::EmptyContent {
                model: self.model_name.clone(),
            }
            .into());
        }

        let json = extract_json_from_response(&content);
        let draft: DraftSet = serde_json::from_str(json)
            .map_err(|source| GenerationError::InvalidJson { source })?;

        // 构造期 schema 检查, 结构性垃圾在此被拦截
        draft.ensure_schema(self.questions_per_chapter, self.options_per_question)?;

        debug!(
            "章节 {} 生成完成: {} 道草稿题目",
            ctx.chapter_id,
            draft.questions.len()
        );

        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_fenced_response() {
        let response = "Here you go:\n```json\n{\"questions\": []}\n```\nHope that helps!";
        assert_eq!(extract_json_from_response(response), r#"{"questions": []}"#);
    }

    #[test]
    fn test_extract_json_from_fence_without_language_tag() {
        let response = "```\n{\"questions\": []}\n```";
        assert_eq!(extract_json_from_response(response), r#"{"questions": []}"#);
    }

    #[test]
    fn test_extract_json_from_bare_response_with_prefix() {
        let response = "Sure! {\"questions\": [{\"a\": 1}]} That's all.";
        assert_eq!(
            extract_json_from_response(response),
            r#"{"questions": [{"a": 1}]}"#
        );
    }

    #[test]
    fn test_extract_json_passthrough_for_clean_json() {
        let response = r#"{"questions": []}"#;
        assert_eq!(extract_json_from_response(response), response);
    }

    #[test]
    fn test_budget_selection_keeps_all_small_chunks() {
        let chunks: Vec<String> = (0..5).map(|i| format!("Small chunk number {}.", i)).collect();
        assert_eq!(select_chunks_within_budget(&chunks), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_budget_selection_samples_when_over_budget() {
        // 每个 chunk 约 1000 token, 30 个远超预算
        let chunks: Vec<String> = (0..30).map(|_| "x".repeat(4000)).collect();
        let selected = select_chunks_within_budget(&chunks);
        assert!(!selected.is_empty());
        assert!(selected.len() < chunks.len());
        // 采样后的 token 总量仍在预算内
        let used: usize = selected.iter().map(|&i| estimate_tokens(&chunks[i])).sum();
        assert!(used <= MAX_INPUT_TOKENS);
        // 从头开始采样
        assert_eq!(selected[0], 0);
    }

    #[test]
    fn test_budget_selection_is_deterministic() {
        let chunks: Vec<String> = (0..25).map(|i| format!("{} ", i).repeat(2000)).collect();
        assert_eq!(
            select_chunks_within_budget(&chunks),
            select_chunks_within_budget(&chunks)
        );
    }

    #[test]
    fn test_budget_selection_single_oversized_chunk_falls_back_to_first() {
        let chunks = vec!["y".repeat(40_000)];
        assert_eq!(select_chunks_within_budget(&chunks), vec![0]);
    }

    #[test]
    fn test_user_prompt_labels_chunks_with_original_indices() {
        let chunks = vec![
            "Alpha content.".to_string(),
            "Beta content.".to_string(),
            "Gamma content.".to_string(),
        ];
        let ctx = ChapterCtx::new("2", "Neural Networks", 1);
        let prompt = build_user_prompt(&chunks, &[0, 2], &ctx, 700);
        assert!(prompt.contains("--- SOURCE CHUNK 0 ---"));
        assert!(prompt.contains("--- SOURCE CHUNK 2 ---"));
        assert!(!prompt.contains("--- SOURCE CHUNK 1 ---"));
        assert!(prompt.contains("Chapter 2: \"Neural Networks\""));
        assert!(prompt.contains("difficulty target: 700"));
    }

    /// 测试真实 LLM 生成
    ///
    /// 运行方式：
    /// ```bash
    /// GROQ_API_KEY=... cargo test test_live_generation -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_live_generation() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::from_env();
        let generator = LlmGenerator::new(&config);
        let ctx = ChapterCtx::new("1", "Machine Learning Basics", 0);
        let chunks = vec![
            "Machine learning is a subfield of artificial intelligence in which systems \
             learn patterns from data instead of following hand-written rules. Supervised \
             learning trains a model on labeled examples, while unsupervised learning \
             discovers structure in unlabeled data."
                .to_string(),
        ];

        let result = generator.generate(&chunks, &ctx, 700).await;

        match result {
            Ok(draft) => {
                println!("\n========== 生成结果 ==========");
                for q in &draft.questions {
                    println!("{}. {} [{}]", q.question_number, q.question, q.difficulty);
                }
                println!("==============================\n");
                println!("✅ LLM 生成成功！");
                assert_eq!(draft.questions.len(), 5);
            }
            Err(e) => {
                println!("❌ LLM 生成失败: {}", e);
                panic!("测试失败: {}", e);
            }
        }
    }
}
