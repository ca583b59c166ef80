use std::{fs, path::Path};

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{ToolContext, ToolError};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FilePaths {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
pub struct FileContentArgs {
    pub file_paths: FilePaths,
}

/// Reads one or more text files.
///
/// A list of paths yields a JSON object mapping each path, as given, to the
/// file's text. A single path yields the text itself.
pub fn get_file_content(context: &ToolContext, args: FileContentArgs) -> Result<String, ToolError> {
    let read = |path: &str| {
        let resolved = context.resolve(path);
        fs::read_to_string(&resolved).map_err(|source| ToolError::io(resolved, source))
    };

    match args.file_paths {
        FilePaths::One(path) => read(&path),
        FilePaths::Many(paths) => {
            let mut contents = Map::new();
            for path in paths {
                let text = read(&path)?;
                contents.insert(path, Value::String(text));
            }
            Ok(serde_json::to_string(&contents)?)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WriteFileArgs {
    pub file_path: String,
    pub content: String,
}

/// Writes `content` to a file, creating missing parent directories.
///
/// Never fails: errors come back as a message so the assistant can react to
/// them.
pub fn write_content_to_file(
    context: &ToolContext,
    args: WriteFileArgs,
) -> Result<String, ToolError> {
    let target = context.resolve(&args.file_path);
    log::debug!("writing {} from {}", target.display(), context.work_dir().display());

    match write(&target, &args.content) {
        Ok(()) => Ok(format!(
            "Content has been successfully written to {}",
            args.file_path
        )),
        Err(err) => {
            let work_dir = fs::canonicalize(context.work_dir())
                .unwrap_or_else(|_| context.work_dir().to_path_buf());
            Ok(format!(
                "Error writing content to {} in directory {}: {err}",
                args.file_path,
                work_dir.display()
            ))
        }
    }
}

fn write(target: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(target, content)
}
