//! Local Python snippet execution.
//!
//! Snippets are staged to a temp file and run under `python3` with a wall
//! clock limit. Failures come back as display strings, not errors: the
//! session keeps going whatever the snippet did.

use std::time::Duration;

const INTERPRETER: &str = "python3";

/// Runs a snippet and returns its output (or a failure description).
pub async fn run_snippet(code: &str, timeout_secs: u64) -> String {
    run_with(INTERPRETER, code, timeout_secs).await
}

async fn run_with(interpreter: &str, code: &str, timeout_secs: u64) -> String {
    let staged = match stage(code) {
        Ok(file) => file,
        Err(e) => return format!("could not stage code: {e}"),
    };

    let execution = tokio::process::Command::new(interpreter)
        .arg(staged.path())
        .output();

    match tokio::time::timeout(Duration::from_secs(timeout_secs), execution).await {
        Err(_) => format!("execution timed out after {timeout_secs} seconds"),
        Ok(Err(e)) => format!("could not start {interpreter}: {e}"),
        Ok(Ok(output)) => {
            if output.status.success() {
                let stdout = String::from_utf8_lossy(&output.stdout);
                if stdout.trim().is_empty() {
                    "(no output)".to_string()
                } else {
                    stdout.trim_end().to_string()
                }
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                format!("error:\n{}", stderr.trim_end())
            }
        }
    }
}

fn stage(code: &str) -> std::io::Result<tempfile::NamedTempFile> {
    let file = tempfile::Builder::new()
        .prefix("mentor_snippet_")
        .suffix(".py")
        .tempfile()?;
    std::fs::write(file.path(), code)?;
    Ok(file)
}
