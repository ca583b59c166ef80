//! Local functions the assistant can call, and the registry it calls them
//! through.
//!
//! Every function takes its keyword arguments as a JSON object, decodes them
//! into its own argument struct and returns a string that is handed back to
//! the run verbatim.

use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub mod command;
pub mod files;
pub mod folder;
pub mod readme;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bad arguments: {0}")]
    Arguments(#[source] serde_json::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ToolError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ToolError::Io {
            path: path.into(),
            source,
        }
    }
}

/// What every tool function can see of the outside world.
#[derive(Debug, Clone)]
pub struct ToolContext {
    work_dir: PathBuf,
}

impl ToolContext {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Resolves a path argument against the working directory. Absolute
    /// paths are returned unchanged.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        }
    }
}

pub type ToolFn = Box<dyn Fn(&ToolContext, Value) -> Result<String, ToolError> + Send + Sync>;

/// Maps function names to their implementations. Built once, then only read.
#[derive(Default)]
pub struct FunctionMap {
    functions: HashMap<String, ToolFn>,
}

impl fmt::Debug for FunctionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

impl FunctionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The five functions shipped with this crate.
    pub fn with_defaults() -> Self {
        Self::new()
            .register("get_file_content", files::get_file_content)
            .register("get_folder_structure", folder::get_folder_structure)
            .register("read_readme", readme::read_readme)
            .register("run_command", command::run_command)
            .register("write_content_to_file", files::write_content_to_file)
    }

    /// Registers `function` under `name`, replacing any earlier entry.
    ///
    /// The JSON arguments are decoded into `A` before the call; a decoding
    /// failure is reported as [`ToolError::Arguments`].
    pub fn register<A, F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        A: DeserializeOwned + 'static,
        F: Fn(&ToolContext, A) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        let call: ToolFn = Box::new(move |context: &ToolContext, args: Value| {
            let args = serde_json::from_value::<A>(args).map_err(ToolError::Arguments)?;
            function(context, args)
        });
        self.functions.insert(name.into(), call);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Calls `name`, or returns `None` if no such function is registered.
    pub fn call(
        &self,
        name: &str,
        context: &ToolContext,
        args: Value,
    ) -> Option<Result<String, ToolError>> {
        self.functions
            .get(name)
            .map(|function| function(context, args))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
