use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{assistants::Tool, client::OpenAiClient, ApiResponseOrError};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Run {
    pub id: String,
    pub object: String,
    pub created_at: u64,
    /// The ID of the assistant used for this run.
    pub assistant_id: String,
    /// The ID of the thread associated with this run.
    pub thread_id: String,
    /// The status of the run.
    pub status: Status,
    /// Details on the action required to continue the run. Will be null if no action is required.
    #[serde(default)]
    pub required_action: Option<RequiredAction>,
    /// The last error that occurred during this run.
    #[serde(default)]
    pub last_error: Option<LastError>,
    #[serde(default)]
    pub expires_at: Option<u64>,
    #[serde(default)]
    pub started_at: Option<u64>,
    #[serde(default)]
    pub completed_at: Option<u64>,
    #[serde(default)]
    pub cancelled_at: Option<u64>,
    #[serde(default)]
    pub failed_at: Option<u64>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub tools: Vec<Tool>,
    #[serde(default)]
    pub usage: Option<Usage>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

impl Run {
    /// The tool calls this run is waiting on, if any.
    pub fn pending_tool_calls(&self) -> &[ToolCall] {
        match &self.required_action {
            Some(RequiredAction::SubmitToolOutputs { submit_tool_outputs }) => {
                submit_tool_outputs.tool_calls.as_slice()
            }
            None => &[],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
}

impl Status {
    /// The service is still working on the run and will change its status
    /// without any action from us.
    pub fn is_pending(&self) -> bool {
        matches!(self, Status::Queued | Status::InProgress | Status::Cancelling)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Status::Queued => "queued",
            Status::InProgress => "in_progress",
            Status::RequiresAction => "requires_action",
            Status::Cancelling => "cancelling",
            Status::Cancelled => "cancelled",
            Status::Failed => "failed",
            Status::Completed => "completed",
            Status::Incomplete => "incomplete",
            Status::Expired => "expired",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "type")]
pub enum RequiredAction {
    SubmitToolOutputs {
        submit_tool_outputs: SubmitToolOutputs,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubmitToolOutputs {
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ToolCall {
    /// The ID of the tool call. Echoed back when submitting its output.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ToolCallKind,
    pub function: ToolCallFunction,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallKind {
    Function,
    #[serde(other)]
    Other,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ToolCallFunction {
    /// The name of the function to call.
    pub name: String,
    /// The arguments to call the function with, as generated by the model in
    /// JSON format. May be empty.
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LastError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Serialize, Builder, Debug, Clone)]
#[builder(pattern = "owned")]
#[builder(name = "CreateRunBuilder")]
#[builder(setter(strip_option, into))]
pub struct CreateRunRequest {
    /// ID of the assistant to use.
    pub assistant_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub additional_instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub metadata: Option<HashMap<String, String>>,
}

impl CreateRunRequest {
    pub fn builder(assistant_id: impl Into<String>) -> CreateRunBuilder {
        CreateRunBuilder::create_empty().assistant_id(assistant_id)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SubmitToolOutputsRequest {
    pub tool_outputs: Vec<ToolOutput>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub output: String,
}

impl OpenAiClient {
    pub async fn create_run(
        &self,
        thread_id: &str,
        request: CreateRunRequest,
    ) -> ApiResponseOrError<Run> {
        self.post(format!("threads/{thread_id}/runs"), request)
            .await
    }

    pub async fn get_run(&self, thread_id: &str, run_id: &str) -> ApiResponseOrError<Run> {
        self.get(format!("threads/{thread_id}/runs/{run_id}")).await
    }

    pub async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        request: SubmitToolOutputsRequest,
    ) -> ApiResponseOrError<Run> {
        self.post(
            format!("threads/{thread_id}/runs/{run_id}/submit_tool_outputs"),
            request,
        )
        .await
    }
}
