use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{assistants::ToolResources, client::OpenAiClient, ApiResponseOrError};

#[derive(Debug, Deserialize, Clone)]
pub struct Thread {
    pub id: String,
    pub object: String,
    pub created_at: u64,
    /// A set of resources that are used by the assistant's tools. The resources are specific to the type of tool.
    #[serde(default)]
    pub tool_resources: Option<ToolResources>,
    /// Set of 16 key-value pairs that can be attached to an object.
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct CreateThreadRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

impl OpenAiClient {
    pub async fn create_thread(&self, request: CreateThreadRequest) -> ApiResponseOrError<Thread> {
        self.post("threads", request).await
    }
}
