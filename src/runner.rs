use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

/// The wrapper executables are installed next to this binary.
pub fn install_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot locate own executable")?;
    let dir = exe.parent().context("executable has no parent directory")?;
    Ok(dir.to_path_buf())
}

/// Run the prepared make invocation and hand back its exit status untouched.
pub fn run_make(command_line: &[String]) -> Result<ExitStatus> {
    let (program, args) = command_line.split_first().context("empty command line")?;
    Command::new(program)
        .args(args)
        .status()
        .with_context(|| format!("failed to execute {program}"))
}
