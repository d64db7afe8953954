pub mod loaders;
pub mod payload;
pub mod question;

pub use loaders::{load_chapter_manifest, load_chapter_text, ChapterSource};
pub use payload::{GameMeta, GamePayload, PrivateAnswerKey, PublicOption, PublicPuzzle};
pub use question::{ChapterResult, Difficulty, DraftOption, DraftQuestion, DraftSet};
