use crate::{
    client::{ListQuery, OpenAiClient},
    ApiResponseOrError,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Message {
    pub id: String,
    pub object: String,
    pub created_at: u64,
    /// The thread ID that this message belongs to.
    pub thread_id: String,
    /// The status of the message, which can be either in_progress, incomplete, or completed.
    #[serde(default)]
    pub status: Option<String>,
    /// The entity that produced the message. One of user or assistant
    pub role: Role,
    /// The content of the message.
    pub content: Vec<Content>,
    /// The assistant that produced the message.
    #[serde(default)]
    pub assistant_id: Option<String>,
    /// The ID of the run associated with the creation of this message. Value is null when messages are created manually using the create message or create thread endpoints.
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

impl Message {
    /// Concatenates the text parts of the message, one per line.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|content| match content {
                Content::Text { text } => Some(text.value.as_str()),
                Content::Refusal { refusal } => Some(refusal.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "type")]
pub enum Content {
    Text { text: Text },
    ImageFile { image_file: ImageFile },
    ImageUrl { image_url: ImageUrl },
    Refusal { refusal: String },
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Text {
    pub value: String,
    #[serde(default)]
    pub annotations: Vec<Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ImageFile {
    pub file_id: String,
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ImageUrl {
    pub url: String,
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct CreateMessageRequest {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

impl CreateMessageRequest {
    pub fn user(content: impl Into<String>) -> Self {
        CreateMessageRequest {
            role: Role::User,
            content: content.into(),
            metadata: None,
        }
    }
}

impl OpenAiClient {
    pub async fn create_message(
        &self,
        thread_id: &str,
        request: CreateMessageRequest,
    ) -> ApiResponseOrError<Message> {
        self.post(format!("threads/{thread_id}/messages"), request)
            .await
    }

    pub async fn list_messages(
        &self,
        thread_id: &str,
        query: ListQuery,
    ) -> ApiResponseOrError<Vec<Message>> {
        self.list(format!("threads/{thread_id}/messages"), query)
            .await
    }
}
