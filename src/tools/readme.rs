use std::fs;

use serde::Deserialize;

use super::{ToolContext, ToolError};

pub const README: &str = "README.md";
pub const MISSING_README: &str = "The README.md file does not exist.";

/// `read_readme` takes no arguments.
#[derive(Debug, Default, Deserialize)]
pub struct NoArgs {}

pub fn read_readme(context: &ToolContext, _: NoArgs) -> Result<String, ToolError> {
    let path = context.resolve(README);
    if !path.exists() {
        return Ok(MISSING_README.to_string());
    }
    fs::read_to_string(&path).map_err(|source| ToolError::io(path, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn returns_readme_text() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(README), "# Project\n\nDetails.\n").unwrap();
        assert_eq!(
            read_readme(&ToolContext::new(dir.path()), NoArgs {}).unwrap(),
            "# Project\n\nDetails.\n"
        );
    }

    #[test]
    fn placeholder_when_missing() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            read_readme(&ToolContext::new(dir.path()), NoArgs {}).unwrap(),
            MISSING_README
        );
    }
}
