pub mod toml_loader;

pub use toml_loader::{load_chapter_manifest, load_chapter_text, ChapterSource};
