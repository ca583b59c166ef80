use std::process::{Command, Output};

use serde::Deserialize;

use super::{ToolContext, ToolError};

#[derive(Debug, Deserialize)]
pub struct CommandArgs {
    pub command: String,
}

/// Runs `command` through the platform shell in the working directory.
///
/// Standard error is folded into standard output and the combined text is
/// returned whatever the exit status; a non-zero exit is not an error.
pub fn run_command(context: &ToolContext, args: CommandArgs) -> Result<String, ToolError> {
    log::info!("running command: {}", args.command);

    match shell(&args.command).current_dir(context.work_dir()).output() {
        Ok(output) => {
            if !output.status.success() {
                log::debug!("command exited with {}", output.status);
            }
            Ok(combined_output(output))
        }
        Err(err) => Ok(format!("Error running command `{}`: {err}", args.command)),
    }
}

#[cfg(not(windows))]
fn shell(command: &str) -> Command {
    let mut shell = Command::new("sh");
    // Redirect once for the whole script so the two streams interleave in order.
    shell.arg("-c").arg(format!("exec 2>&1\n{command}"));
    shell
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut shell = Command::new("cmd");
    shell.arg("/C").arg(format!("({command}) 2>&1"));
    shell
}

fn combined_output(output: Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}
