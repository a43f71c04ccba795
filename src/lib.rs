//! Architecture research over a knowledge base, backed by any
//! OpenAI-compatible chat-completions server.

pub mod config;
pub mod engine;
pub mod error;
pub mod knowledge;
pub mod research;

pub use config::EngineSettings;
pub use engine::{ChatCompletionClient, LanguageModel};
pub use error::{EngineError, ResearchError, Result};
pub use knowledge::{KnowledgeBase, KnowledgeNode, KnowledgeTree};
pub use research::{AnalysisResult, ArchitectureResearch};
