pub mod llm_client;
pub mod predict;
pub mod prompt_builder;
pub mod signature;

pub use llm_client::{ChatCompletionClient, LanguageModel};
pub use predict::{FieldValue, Prediction, Predictor};
pub use signature::{FieldFormat, InputField, OutputField, PromptSpec};
