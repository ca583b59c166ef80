use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use env_logger::Env;
use openai_assistant::{
    descriptor::{self, DEFAULT_ASSISTANTS_DIR},
    AssistantSession, FunctionMap, OpenAiClient, PollConfig, SessionConfig,
};

/// Sent when no message words are given on the command line.
const DEFAULT_MESSAGE: &str = "Please describe the folder structure of this project.";

#[derive(Parser, Debug)]
#[command(
    name = "assistant",
    version,
    about = "Chat with an OpenAI assistant that can use local tools",
    long_about = None
)]
struct Cli {
    /// Message to send; the words are joined with spaces
    message: Vec<String>,
    /// Name of the assistant descriptor under the assistants directory
    #[arg(long, alias = "assistant_name", env = "ASSISTANT_NAME")]
    assistant_name: Option<String>,
    /// Use this assistant id directly instead of a descriptor
    #[arg(long, alias = "assistant_id")]
    assistant_id: Option<String>,
    /// Continue this thread instead of starting a new one
    #[arg(long, alias = "thread_id", env = "THREAD_ID")]
    thread_id: Option<String>,
    /// Directory holding the assistant descriptors
    #[arg(long, default_value = DEFAULT_ASSISTANTS_DIR)]
    assistants_dir: PathBuf,
    /// Milliseconds between run status checks
    #[arg(long, default_value_t = 1000)]
    poll_interval_ms: u64,
    /// Give up after this many run status checks
    #[arg(long, default_value_t = 600)]
    max_polls: u32,
    /// Only print the assistant's reply
    #[arg(long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let client = OpenAiClient::from_env().context("Failed to build the OpenAI client")?;

    let assistant_id = match cli.assistant_id.filter(|id| !id.is_empty()) {
        Some(id) => id,
        None => {
            let name = cli.assistant_name.filter(|name| !name.is_empty()).context(
                "assistant_name is not specified via command line or environment variable",
            )?;
            descriptor::get_or_create(&client, &cli.assistants_dir, &name)
                .await
                .with_context(|| format!("Failed to resolve assistant {name}"))?
        }
    };

    let message = if cli.message.is_empty() {
        DEFAULT_MESSAGE.to_string()
    } else {
        cli.message.join(" ")
    };

    let config = SessionConfig::new(assistant_id)
        .poll(PollConfig {
            interval: Duration::from_millis(cli.poll_interval_ms),
            max_attempts: cli.max_polls,
        })
        .verbose(!cli.quiet);
    let session = AssistantSession::new(client, FunctionMap::with_defaults(), config);

    let response = session.chat(&message, cli.thread_id.as_deref()).await?;

    let reply = response.reply().unwrap_or_default();
    if cli.quiet {
        println!("{reply}");
    } else {
        println!("\nAssistant Messages\n {reply}");
    }

    Ok(())
}
