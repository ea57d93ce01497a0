pub mod assembly;
pub mod classify;
pub mod emotion;
pub mod error;
pub mod filter;
pub mod merger;
pub mod plan;
pub mod render;
pub mod timeline;

pub use assembly::*;
pub use emotion::EmotionLabel;
pub use error::{EngineError, Result};
pub use timeline::*;
