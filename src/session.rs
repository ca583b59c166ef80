use tokio::time::sleep;

use crate::{
    assistants::{
        messages::{CreateMessageRequest, Message, Role},
        runs::{CreateRunRequest, Run, Status},
        threads::CreateThreadRequest,
    },
    client::{ListOrder, ListQuery, OpenAiClient},
    config::SessionConfig,
    dispatch::Dispatcher,
    remember::ThreadIdScripts,
    tools::{FunctionMap, ToolContext},
    AssistantError,
};

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub thread_id: String,
    /// Every message of the thread, newest first.
    pub messages: Vec<Message>,
}

impl ChatResponse {
    /// Text of the newest assistant message.
    pub fn reply(&self) -> Option<String> {
        self.messages
            .iter()
            .find(|message| message.role == Role::Assistant)
            .map(Message::text)
    }
}

/// Talks to one assistant, running local functions whenever a run asks for
/// them.
#[derive(Debug)]
pub struct AssistantSession {
    client: OpenAiClient,
    functions: FunctionMap,
    context: ToolContext,
    scripts: ThreadIdScripts,
    config: SessionConfig,
}

impl AssistantSession {
    pub fn new(client: OpenAiClient, functions: FunctionMap, config: SessionConfig) -> Self {
        Self {
            client,
            functions,
            context: ToolContext::new(config.work_dir.clone()),
            scripts: ThreadIdScripts::new(config.script_dir.clone()),
            config,
        }
    }

    /// Sends `message` to the thread `thread_id` (a new thread if `None`),
    /// runs the assistant on it and answers tool calls until the run
    /// completes.
    ///
    /// On success the thread id is written to the remember scripts.
    pub async fn chat(
        &self,
        message: &str,
        thread_id: Option<&str>,
    ) -> Result<ChatResponse, AssistantError> {
        let verbose = self.config.verbose;
        if verbose {
            if message.is_empty() {
                println!("userMessage is empty");
            } else {
                println!("\nUser Message\n {message}");
            }
        }

        let thread_id = match thread_id.filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => {
                let thread = self
                    .client
                    .create_thread(CreateThreadRequest::default())
                    .await?;
                log::info!("created thread {}", thread.id);
                thread.id
            }
        };

        self.client
            .create_message(&thread_id, CreateMessageRequest::user(message))
            .await?;

        let request = CreateRunRequest::builder(self.config.assistant_id.as_str())
            .build()
            .map_err(|err| AssistantError::InvalidRequest(err.to_string()))?;
        let run = self.client.create_run(&thread_id, request).await?;
        log::info!("started run {} on thread {thread_id}", run.id);

        let mut run = self.wait_for_run(run).await?;
        if verbose {
            println!("\nRun Status:  {}", run.status);
        }

        let dispatcher = Dispatcher::new(&self.functions, &self.context, verbose);
        loop {
            match run.status {
                Status::Completed => break,
                Status::RequiresAction => {
                    let submitted = dispatcher.handle(&self.client, &run).await?;
                    run = self.wait_for_run(submitted).await?;
                    if verbose {
                        println!("\nRun Status:  {}", run.status);
                    }
                }
                Status::Failed => {
                    let (code, message) = match run.last_error {
                        Some(error) => (error.code, error.message),
                        None => ("unknown".to_string(), "run failed without an error".to_string()),
                    };
                    return Err(AssistantError::RunFailed { code, message });
                }
                status => {
                    log::warn!("run {} ended with status {status}", run.id);
                    return Err(AssistantError::RunEnded {
                        run_id: run.id,
                        status,
                    });
                }
            }
        }

        let messages = self
            .client
            .list_messages(&thread_id, ListQuery::new(ListOrder::Desc))
            .await?;

        self.scripts.write(&thread_id)?;

        if verbose {
            println!("\nThread ID\n {thread_id}");
        }

        Ok(ChatResponse {
            thread_id,
            messages,
        })
    }

    /// Re-reads `run` until the service stops working on it.
    ///
    /// Sleeps `poll.interval` between reads and gives up with
    /// [`AssistantError::PollTimeout`] after `poll.max_attempts` reads.
    pub async fn wait_for_run(&self, run: Run) -> Result<Run, AssistantError> {
        let poll = self.config.poll;
        let mut run = run;
        let mut attempts = 0;

        loop {
            run = self.client.get_run(&run.thread_id, &run.id).await?;
            attempts += 1;

            if !run.status.is_pending() {
                log::debug!("run {} is {} after {attempts} checks", run.id, run.status);
                return Ok(run);
            }
            if attempts >= poll.max_attempts {
                return Err(AssistantError::PollTimeout {
                    run_id: run.id,
                    status: run.status,
                    attempts,
                });
            }

            sleep(poll.interval).await;
        }
    }
}
