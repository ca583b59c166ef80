use std::path::PathBuf;

use thiserror::Error;

use crate::{assistants::runs::Status, tools::ToolError, OpenAiError};

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("OpenAI API error: {0}")]
    Api(#[from] OpenAiError),

    #[error("run failed ({code}): {message}")]
    RunFailed { code: String, message: String },

    #[error("run {run_id} ended with status {status}")]
    RunEnded { run_id: String, status: Status },

    #[error("run {run_id} still {status} after {attempts} status checks")]
    PollTimeout {
        run_id: String,
        status: Status,
        attempts: u32,
    },

    #[error("Function {0} not found in functions map")]
    UnknownFunction(String),

    #[error("invalid arguments for function {function}: {source}")]
    InvalidArguments {
        function: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("function {function} failed: {source}")]
    Tool {
        function: String,
        #[source]
        source: ToolError,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("assistant name is required")]
    AssistantNameRequired,

    #[error("could not load assistant descriptor {}: {message}", .path.display())]
    Descriptor { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
