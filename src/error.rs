use thiserror::Error;

/// Failures raised by a language model backend.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("backend returned no choices")]
    EmptyResponse,
    #[error("backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum ResearchError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("invalid prompt spec `{spec}`: {reason}")]
    InvalidSignature { spec: String, reason: String },
    #[error("prompt spec `{spec}` is missing input `{field}`")]
    MissingInput { spec: String, field: String },
    #[error("prompt spec `{spec}` has no input named `{field}`")]
    UnknownInput { spec: String, field: String },
    #[error("input `{field}` expects {expected}")]
    InputFormat { field: String, expected: &'static str },
    #[error("prediction has no output named `{0}`")]
    MissingOutput(String),
    #[error("knowledge base error: {0}")]
    KnowledgeBase(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ResearchError>;
