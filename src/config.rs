use std::{path::PathBuf, time::Duration};

/// How long to wait between run status checks and when to give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 600,
        }
    }
}

/// Everything an [`crate::AssistantSession`] needs besides the API client
/// and the function map.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub assistant_id: String,
    pub poll: PollConfig,
    /// Directory that relative paths handed to the tool functions resolve against.
    pub work_dir: PathBuf,
    /// Directory the thread id scripts are written to.
    pub script_dir: PathBuf,
    pub verbose: bool,
}

impl SessionConfig {
    pub fn new(assistant_id: impl Into<String>) -> Self {
        Self {
            assistant_id: assistant_id.into(),
            poll: PollConfig::default(),
            work_dir: PathBuf::from("."),
            script_dir: PathBuf::from("."),
            verbose: false,
        }
    }

    pub fn poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    pub fn script_dir(mut self, script_dir: impl Into<PathBuf>) -> Self {
        self.script_dir = script_dir.into();
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
