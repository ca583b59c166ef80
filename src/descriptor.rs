//! Local JSON descriptions of assistants, and syncing them to the service.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use serde_json::Value;

use crate::{
    assistants::{CodeInterpreterResources, CreateAssistantRequest, Tool, ToolResources},
    client::{ListOrder, ListQuery, OpenAiClient},
    AssistantError,
};

pub const DEFAULT_ASSISTANTS_DIR: &str = "assistants";

/// How many of the newest assistants are searched for a name match.
const LOOKUP_LIMIT: u32 = 20;

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantDescriptor {
    pub name: String,
    /// A string or a number; only its text matters.
    pub version: Value,
    pub model: String,
    pub description: String,
    pub instructions: String,
    pub tools: Vec<Tool>,
    pub file_ids: Vec<String>,
    pub metadata: HashMap<String, String>,
}

/// `"My Helper"` becomes `"my_helper"`.
pub fn normalize_name(name: &str) -> String {
    name.replace(' ', "_").to_lowercase()
}

pub fn descriptor_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.json", normalize_name(name)))
}

impl AssistantDescriptor {
    /// Loads `<dir>/<normalized name>.json`.
    pub fn load(dir: &Path, name: &str) -> Result<Self, AssistantError> {
        if name.trim().is_empty() {
            return Err(AssistantError::AssistantNameRequired);
        }

        let path = descriptor_path(dir, name);
        let text = fs::read_to_string(&path).map_err(|err| AssistantError::Descriptor {
            path: path.clone(),
            message: err.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|err| AssistantError::Descriptor {
            path,
            message: err.to_string(),
        })
    }

    pub fn version_label(&self) -> String {
        match &self.version {
            Value::String(version) => version.clone(),
            other => other.to_string(),
        }
    }

    /// The name the assistant carries on the service.
    pub fn remote_name(&self) -> String {
        format!("{} Version:{}", self.name, self.version_label())
    }

    /// The create/update body. File ids are always sent, so an empty list
    /// clears the ones an updated assistant had before.
    pub fn to_request(&self) -> Result<CreateAssistantRequest, AssistantError> {
        CreateAssistantRequest::builder(self.model.as_str())
            .name(self.remote_name())
            .description(self.description.as_str())
            .instructions(self.instructions.as_str())
            .tools(self.tools.clone())
            .tool_resources(ToolResources {
                code_interpreter: Some(CodeInterpreterResources {
                    file_ids: self.file_ids.clone(),
                }),
                file_search: None,
            })
            .metadata(self.metadata.clone())
            .build()
            .map_err(|err| AssistantError::InvalidRequest(err.to_string()))
    }
}

/// Finds the assistant described by `<dir>/<name>.json` among the newest
/// assistants and brings it up to date, or creates it. Returns its id.
pub async fn get_or_create(
    client: &OpenAiClient,
    dir: &Path,
    name: &str,
) -> Result<String, AssistantError> {
    let descriptor = AssistantDescriptor::load(dir, name)?;
    let remote_name = descriptor.remote_name();
    let request = descriptor.to_request()?;

    let existing = client
        .list_assistants(&ListQuery::new(ListOrder::Desc).limit(LOOKUP_LIMIT))
        .await?
        .into_iter()
        .find(|assistant| assistant.name.as_deref() == Some(remote_name.as_str()));

    let assistant = match existing {
        Some(assistant) => {
            log::info!("updating assistant {} ({remote_name})", assistant.id);
            client.update_assistant(&assistant.id, request).await?
        }
        None => {
            log::info!("creating assistant {remote_name}");
            client.create_assistant(request).await?
        }
    };

    Ok(assistant.id)
}
