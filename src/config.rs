use std::collections::BTreeMap;

/// 程序配置
///
/// 在程序边界构造一次，之后按引用传入各层函数，不使用全局可变状态
#[derive(Clone, Debug)]
pub struct Config {
    /// 每章节生成的题目数量
    pub questions_per_chapter: usize,
    /// 每道题目的选项数量
    pub options_per_question: usize,
    /// 每章节 medium 难度题目数量
    pub medium_per_chapter: usize,
    /// 每章节 hard 难度题目数量
    pub hard_per_chapter: usize,
    /// 单个语义 chunk 的目标最大 token 数
    pub chunk_max_tokens: usize,
    /// 相邻 chunk 之间的重叠句子数（用于上下文连续性）
    pub chunk_overlap_sentences: usize,
    /// 游戏难度目标分数（400-1000，越高越难）
    pub difficulty_target: u32,
    /// 章节清单 TOML 文件路径
    pub chapters_manifest: String,
    /// 游戏产物输出文件
    pub output_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 程序版本（写入输出产物的 meta）
    pub version: String,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            questions_per_chapter: 5,
            options_per_question: 4,
            medium_per_chapter: 2,
            hard_per_chapter: 3,
            chunk_max_tokens: 1500,
            chunk_overlap_sentences: 2,
            difficulty_target: 700,
            chapters_manifest: "chapters.toml".to_string(),
            output_file: "game_payload.json".to_string(),
            verbose_logging: false,
            version: "1.0.0".to_string(),
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.groq.com/openai/v1".to_string(),
            llm_model_name: "llama-3.3-70b-versatile".to_string(),
            llm_temperature: 0.7,
            llm_max_tokens: 4096,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            questions_per_chapter: default.questions_per_chapter,
            options_per_question: default.options_per_question,
            medium_per_chapter: default.medium_per_chapter,
            hard_per_chapter: default.hard_per_chapter,
            chunk_max_tokens: std::env::var("CHUNK_MAX_TOKENS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.chunk_max_tokens),
            chunk_overlap_sentences: std::env::var("CHUNK_OVERLAP_SENTENCES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.chunk_overlap_sentences),
            difficulty_target: std::env::var("GAME_DIFFICULTY_TARGET").ok().and_then(|v| v.parse().ok()).unwrap_or(default.difficulty_target),
            chapters_manifest: std::env::var("CHAPTERS_MANIFEST").unwrap_or(default.chapters_manifest),
            output_file: std::env::var("OUTPUT_FILE").unwrap_or(default.output_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            version: default.version,
            llm_api_key: std::env::var("GROQ_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_temperature: std::env::var("LLM_TEMPERATURE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_temperature),
            llm_max_tokens: std::env::var("LLM_MAX_TOKENS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_max_tokens),
        }
    }

    /// 每章节的难度分布（难度名 → 数量），写入输出产物的 meta
    pub fn difficulty_distribution(&self) -> BTreeMap<String, usize> {
        BTreeMap::from([
            ("medium".to_string(), self.medium_per_chapter),
            ("hard".to_string(), self.hard_per_chapter),
        ])
    }

    /// 每个游戏的题目总数（章节数 × 每章节题目数）
    pub fn total_questions(&self, chapter_count: usize) -> usize {
        chapter_count * self.questions_per_chapter
    }
}
