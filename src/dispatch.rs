//! Resolves the tool calls of a run that is waiting on us.

use serde_json::{Map, Value};

use crate::{
    assistants::runs::{Run, SubmitToolOutputsRequest, ToolCall, ToolCallKind, ToolOutput},
    client::OpenAiClient,
    tools::{FunctionMap, ToolContext, ToolError},
    AssistantError,
};

pub struct Dispatcher<'a> {
    functions: &'a FunctionMap,
    context: &'a ToolContext,
    verbose: bool,
}

impl<'a> Dispatcher<'a> {
    pub fn new(functions: &'a FunctionMap, context: &'a ToolContext, verbose: bool) -> Self {
        Self {
            functions,
            context,
            verbose,
        }
    }

    /// Runs every function call in `calls` and collects the outputs.
    ///
    /// Stops at the first call that names an unknown function, carries
    /// malformed arguments, or whose function fails.
    pub fn resolve(&self, calls: &[ToolCall]) -> Result<Vec<ToolOutput>, AssistantError> {
        let mut outputs = Vec::with_capacity(calls.len());

        for call in calls {
            if call.kind != ToolCallKind::Function {
                log::warn!("ignoring non-function tool call {}", call.id);
                continue;
            }
            outputs.push(ToolOutput {
                tool_call_id: call.id.clone(),
                output: self.invoke(call)?,
            });
        }

        Ok(outputs)
    }

    fn invoke(&self, call: &ToolCall) -> Result<String, AssistantError> {
        let name = call.function.name.as_str();
        if !self.functions.contains(name) {
            return Err(AssistantError::UnknownFunction(name.to_string()));
        }

        let args = parse_arguments(&call.function.arguments).map_err(|source| {
            AssistantError::InvalidArguments {
                function: name.to_string(),
                source,
            }
        })?;

        if self.verbose {
            println!(
                "\nCalling function \"{name}\" with args:\n {}",
                serde_json::to_string_pretty(&args).unwrap_or_default()
            );
        }
        log::info!("calling {name} for tool call {}", call.id);

        let result = self
            .functions
            .call(name, self.context, Value::Object(args))
            .ok_or_else(|| AssistantError::UnknownFunction(name.to_string()))?;

        let output = match result {
            Ok(output) => output,
            Err(ToolError::Arguments(source)) => {
                return Err(AssistantError::InvalidArguments {
                    function: name.to_string(),
                    source,
                })
            }
            Err(source) => {
                return Err(AssistantError::Tool {
                    function: name.to_string(),
                    source,
                })
            }
        };

        if self.verbose {
            println!("\nFunction Result\n {output}");
        }

        Ok(output)
    }

    /// Resolves the pending calls of `run` and submits all outputs in one
    /// request. Returns the run as the service reports it after submission.
    pub async fn handle(&self, client: &OpenAiClient, run: &Run) -> Result<Run, AssistantError> {
        let outputs = self.resolve(run.pending_tool_calls())?;
        log::debug!("submitting {} tool outputs for run {}", outputs.len(), run.id);

        let run = client
            .submit_tool_outputs(
                &run.thread_id,
                &run.id,
                SubmitToolOutputsRequest {
                    tool_outputs: outputs,
                },
            )
            .await?;
        Ok(run)
    }
}

/// An empty argument string means no arguments.
fn parse_arguments(arguments: &str) -> Result<Map<String, Value>, serde_json::Error> {
    if arguments.trim().is_empty() {
        return Ok(Map::new());
    }
    serde_json::from_str(arguments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistants::runs::ToolCallFunction;
    use serde::Deserialize;
    use std::fs;
    use tempfile::TempDir;

    fn call(id: &str, name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            kind: ToolCallKind::Function,
            function: ToolCallFunction {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        }
    }

    #[test]
    fn outputs_are_tagged_with_call_ids() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "X").unwrap();
        let functions = FunctionMap::with_defaults();
        let context = ToolContext::new(dir.path());
        let dispatcher = Dispatcher::new(&functions, &context, false);

        let outputs = dispatcher
            .resolve(&[
                call("call_1", "read_readme", ""),
                call("call_2", "get_file_content", r#"{"file_paths": "a.txt"}"#),
            ])
            .unwrap();

        assert_eq!(
            outputs,
            vec![
                ToolOutput {
                    tool_call_id: "call_1".to_string(),
                    output: "The README.md file does not exist.".to_string(),
                },
                ToolOutput {
                    tool_call_id: "call_2".to_string(),
                    output: "X".to_string(),
                },
            ]
        );
    }

    #[test]
    fn unknown_function_aborts_the_round() {
        let functions = FunctionMap::with_defaults();
        let context = ToolContext::new(".");
        let dispatcher = Dispatcher::new(&functions, &context, false);

        let error = dispatcher
            .resolve(&[call("call_1", "read_readme", ""), call("call_2", "launch", "{}")])
            .unwrap_err();
        match error {
            AssistantError::UnknownFunction(name) => assert_eq!(name, "launch"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn arguments_must_be_an_object() {
        #[derive(Deserialize)]
        struct Anything {}

        let functions = FunctionMap::new().register("noop", |_: &ToolContext, _: Anything| {
            Ok(String::new())
        });
        let context = ToolContext::new(".");
        let dispatcher = Dispatcher::new(&functions, &context, false);

        let error = dispatcher
            .resolve(&[call("call_1", "noop", "[1, 2]")])
            .unwrap_err();
        assert!(matches!(error, AssistantError::InvalidArguments { .. }));
    }

    #[test]
    fn tool_failures_are_fatal() {
        let dir = TempDir::new().unwrap();
        let functions = FunctionMap::with_defaults();
        let context = ToolContext::new(dir.path());
        let dispatcher = Dispatcher::new(&functions, &context, false);

        let error = dispatcher
            .resolve(&[call("call_1", "get_file_content", r#"{"file_paths": ["nope.txt"]}"#)])
            .unwrap_err();
        assert!(matches!(error, AssistantError::Tool { .. }));
    }
}
