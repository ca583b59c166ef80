use std::collections::HashMap;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    client::{ListQuery, OpenAiClient},
    ApiResponseOrError,
};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Assistant {
    pub id: String,
    pub object: String,
    pub created_at: u64,
    /// The name of the assistant. The maximum length is 256 characters.
    pub name: Option<String>,
    /// The description of the assistant. The maximum length is 512 characters.
    #[serde(default)]
    pub description: Option<String>,
    /// ID of the model to use.
    pub model: String,
    /// The system instructions that the assistant uses. The maximum length is 256,000 characters.
    pub instructions: Option<String>,
    #[serde(default)]
    pub tools: Vec<Tool>,
    /// A set of resources that are used by the assistant's tools. The resources are specific to the type of tool.
    #[serde(default)]
    pub tool_resources: Option<ToolResources>,
    /// Set of 16 key-value pairs that can be attached to an object.
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    CodeInterpreter,
    #[serde(alias = "retrieval")]
    FileSearch {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_search: Option<Value>,
    },
    Function {
        function: FunctionDefinition,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The parameters the function accepts, described as a JSON Schema object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ToolResources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_interpreter: Option<CodeInterpreterResources>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_search: Option<FileSearchResources>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct CodeInterpreterResources {
    /// A list of file IDs made available to the `code_interpreter` tool. There can be a maximum of 20 files associated with the tool.
    pub file_ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct FileSearchResources {
    /// The ID of the vector store attached to this assistant.
    pub vector_store_ids: Vec<String>,
}

#[derive(Serialize, Builder, Default, Debug, Clone)]
#[builder(pattern = "owned")]
#[builder(name = "CreateAssistantBuilder")]
#[builder(setter(strip_option, into))]
pub struct CreateAssistantRequest {
    /// ID of the model to use.
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub instructions: Option<String>,
    /// A set of tools that the assistant can use.
    #[builder(default)]
    pub tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub tool_resources: Option<ToolResources>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub metadata: Option<HashMap<String, String>>,
}

impl CreateAssistantRequest {
    pub fn builder(model: impl Into<String>) -> CreateAssistantBuilder {
        CreateAssistantBuilder::create_empty().model(model)
    }
}

impl OpenAiClient {
    pub async fn create_assistant(
        &self,
        request: CreateAssistantRequest,
    ) -> ApiResponseOrError<Assistant> {
        self.post("assistants", request).await
    }

    pub async fn update_assistant(
        &self,
        assistant_id: &str,
        request: CreateAssistantRequest,
    ) -> ApiResponseOrError<Assistant> {
        self.post(format!("assistants/{assistant_id}"), request)
            .await
    }

    /// Lists a single page of assistants.
    pub async fn list_assistants(&self, query: &ListQuery) -> ApiResponseOrError<Vec<Assistant>> {
        Ok(self.list_page("assistants", query).await?.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tools_decode_from_descriptor_json() {
        let tools: Vec<Tool> = serde_json::from_value(json!([
            { "type": "code_interpreter" },
            { "type": "retrieval" },
            {
                "type": "function",
                "function": {
                    "name": "read_readme",
                    "description": "Reads README.md",
                    "parameters": { "type": "object", "properties": {} }
                }
            }
        ]))
        .unwrap();

        assert_eq!(tools[0], Tool::CodeInterpreter);
        assert_eq!(tools[1], Tool::FileSearch { file_search: None });
        match &tools[2] {
            Tool::Function { function } => assert_eq!(function.name, "read_readme"),
            other => panic!("unexpected tool {other:?}"),
        }
    }

    #[test]
    fn builder_skips_unset_fields() {
        let request = CreateAssistantRequest::builder("gpt-4o")
            .name("Helper Version:1")
            .build()
            .unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "model": "gpt-4o", "name": "Helper Version:1", "tools": [] })
        );
    }
}
