//! 编排层
//!
//! 应用入口，持有配置与生成器，向下委托流程层

pub mod game_processor;

pub use game_processor::App;
