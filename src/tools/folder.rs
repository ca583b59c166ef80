use std::{fs, io, path::Path};

use serde::Deserialize;

use super::{ToolContext, ToolError};

/// Name fragments that keep an entry out of the tree.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "__pycache__",
    ".git",
    ".vs",
    ".vscode",
    ".idea",
    "venv",
    ".venv",
    "env",
    "node_modules",
    ".next",
    "build",
    "dist",
    "output",
    "bin",
];

pub const DEFAULT_MAX_ITEMS: usize = 30;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";

#[derive(Debug, Deserialize)]
pub struct FolderStructureArgs {
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub level: usize,
    #[serde(default = "default_indent")]
    pub indent: String,
    #[serde(default)]
    pub exclude_folders: Option<Vec<String>>,
    /// `null` lifts the limit.
    #[serde(default = "default_max_items")]
    pub max_items: Option<usize>,
}

fn default_path() -> String {
    ".".to_string()
}

fn default_indent() -> String {
    "    ".to_string()
}

fn default_max_items() -> Option<usize> {
    Some(DEFAULT_MAX_ITEMS)
}

pub fn get_folder_structure(
    context: &ToolContext,
    args: FolderStructureArgs,
) -> Result<String, ToolError> {
    let tree = FolderTree {
        indent: args.indent,
        exclude: args
            .exclude_folders
            .unwrap_or_else(|| DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect()),
        max_items: args.max_items,
    };
    let root = context.resolve(&args.path);
    tree.render(&root, args.level)
        .map_err(|source| ToolError::io(root, source))
}

/// Renders a directory as an indented tree.
///
/// Directories come before files, each group ordered by lowercase name.
/// Directories holding more than `max_items` visible entries are left out
/// together with their name.
#[derive(Debug, Clone)]
pub struct FolderTree {
    pub indent: String,
    pub exclude: Vec<String>,
    pub max_items: Option<usize>,
}

struct Entry {
    name: String,
    is_dir: bool,
}

impl FolderTree {
    pub fn render(&self, root: &Path, level: usize) -> io::Result<String> {
        let mut out = String::new();
        self.render_into(root, level, &mut out)?;
        Ok(out)
    }

    fn render_into(&self, dir: &Path, level: usize, out: &mut String) -> io::Result<()> {
        let mut entries = self.visible_entries(dir)?;
        entries.retain(|entry| !entry.is_dir || self.fits(&dir.join(&entry.name)));
        entries.sort_by(|a, b| {
            b.is_dir
                .cmp(&a.is_dir)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
                .then_with(|| a.name.cmp(&b.name))
        });

        let count = entries.len();
        for (i, entry) in entries.iter().enumerate() {
            let branch = if i + 1 == count { LAST_BRANCH } else { BRANCH };
            out.push_str(&self.indent.repeat(level));
            out.push_str(branch);
            out.push_str(&entry.name);
            out.push('\n');

            if entry.is_dir {
                let child = dir.join(&entry.name);
                if let Err(err) = self.render_into(&child, level + 1, out) {
                    log::warn!("skipping unreadable directory {}: {err}", child.display());
                }
            }
        }

        Ok(())
    }

    fn visible_entries(&self, dir: &Path) -> io::Result<Vec<Entry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if self.is_excluded(&name) {
                continue;
            }
            entries.push(Entry {
                is_dir: entry.path().is_dir(),
                name,
            });
        }
        Ok(entries)
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|fragment| name.contains(fragment.as_str()))
    }

    fn fits(&self, dir: &Path) -> bool {
        let Some(max_items) = self.max_items else {
            return true;
        };
        match self.visible_entries(dir) {
            Ok(entries) => entries.len() <= max_items,
            Err(_) => true,
        }
    }
}
