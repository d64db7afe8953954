//! 章节清单加载
//!
//! 清单是一个 TOML 文件，把章节标识映射到已清洗的 UTF-8 文本文件：
//!
//! ```toml
//! [[chapters]]
//! id = "1"
//! title = "Artificial Intelligence, Machine Learning, and Deep Learning"
//! text_path = "chapters/ch1.txt"
//! ```
//!
//! PDF 解析等文本提取工作由上游流程完成，本程序只消费纯文本。

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// 清单中的单个章节条目
#[derive(Debug, Clone, Deserialize)]
pub struct ChapterSource {
    /// 章节标识
    pub id: String,
    /// 章节标题
    pub title: String,
    /// 已清洗的章节文本文件路径
    pub text_path: String,
}

#[derive(Debug, Deserialize)]
struct ChapterManifest {
    #[serde(default)]
    chapters: Vec<ChapterSource>,
}

/// 从 TOML 清单文件加载章节列表（保持文件中的顺序）
pub async fn load_chapter_manifest(manifest_path: &str) -> Result<Vec<ChapterSource>> {
    let path = Path::new(manifest_path);
    if !path.exists() {
        anyhow::bail!("章节清单不存在: {}", manifest_path);
    }

    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取章节清单: {}", manifest_path))?;

    let manifest: ChapterManifest = toml::from_str(&content)
        .with_context(|| format!("无法解析章节清单: {}", manifest_path))?;

    tracing::info!("清单加载完成, 共 {} 个章节", manifest.chapters.len());

    Ok(manifest.chapters)
}

/// 加载单个章节的已清洗文本
pub async fn load_chapter_text(text_path: &str) -> Result<String> {
    let text = fs::read_to_string(text_path)
        .await
        .with_context(|| format!("无法读取章节文本: {}", text_path))?;

    if text.trim().is_empty() {
        tracing::warn!("章节文本为空白: {}", text_path);
    }

    Ok(text)
}
