//! Remembers the last thread id in small scripts, so the next invocation can
//! pick the conversation up again through the `THREAD_ID` variable.

use std::{fs, io, path::PathBuf};

pub const THREAD_ID_VAR: &str = "THREAD_ID";
pub const SHELL_SCRIPT: &str = "assistant_remember_thread_id.zsh";
pub const BATCH_SCRIPT: &str = "assistant_remember_thread_id.bat";

#[derive(Debug, Clone)]
pub struct ThreadIdScripts {
    dir: PathBuf,
}

impl ThreadIdScripts {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn shell_path(&self) -> PathBuf {
        self.dir.join(SHELL_SCRIPT)
    }

    pub fn batch_path(&self) -> PathBuf {
        self.dir.join(BATCH_SCRIPT)
    }

    /// Overwrites both scripts with `thread_id`.
    pub fn write(&self, thread_id: &str) -> io::Result<()> {
        fs::write(self.shell_path(), shell_script(thread_id))?;
        fs::write(self.batch_path(), batch_script(thread_id))?;
        log::debug!("remembered thread {thread_id} in {}", self.dir.display());
        Ok(())
    }
}

pub fn shell_script(thread_id: &str) -> String {
    format!("#!/bin/zsh\nexport {THREAD_ID_VAR}={thread_id}\n")
}

pub fn batch_script(thread_id: &str) -> String {
    format!("@echo off\nset {THREAD_ID_VAR}={thread_id}\n")
}
