use anyhow::{Context, Result, bail};
use declarative::CommandOutput;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Run a command and capture its output, whatever its exit status
pub fn run_output(cmd: &str, args: &[&str]) -> io::Result<CommandOutput> {
    log::trace!("running: {} {}", cmd, args.join(" "));
    Command::new(cmd)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map(CommandOutput::from)
}

/// Run a command and capture trimmed stdout, failing on a non-zero exit
pub fn run_capture(cmd: &str, args: &[&str]) -> Result<String> {
    let output = run_output(cmd, args)
        .with_context(|| format!("Failed to execute: {} {}", cmd, args.join(" ")))?;

    if output.success {
        Ok(output.stdout_str().trim().to_string())
    } else {
        bail!("{} failed: {}", cmd, output.stderr_str().trim())
    }
}

/// Locate an executable on `PATH`
pub fn find_command(cmd: &str) -> Option<PathBuf> {
    which::which(cmd).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_command_is_an_error() {
        let err = run_capture("converge-definitely-missing-binary", &["-x"]).unwrap_err();
        assert!(err.to_string().contains("converge-definitely-missing-binary -x"));
        assert!(find_command("converge-definitely-missing-binary").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_capture_reports_exit_failure() {
        let err = run_capture("false", &[]).unwrap_err();
        assert!(err.to_string().starts_with("false failed"));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_capture_trims_stdout() {
        assert_eq!(run_capture("echo", &["  hello  "]).unwrap(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_output_reports_failure() {
        let output = run_output("false", &[]).unwrap();
        assert!(!output.success);
        assert_eq!(output.code, Some(1));
    }
}
