mod runner;

use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::Confirm;
use makefile_scan::{DEFAULT_MAKEFILE, WrapperCommands, make_command_line, scan_makefile};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
struct Cli {
    /// Arguments to pass to make
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    options: Vec<String>,
    /// Makefile override
    #[arg(short = 'f', default_value = DEFAULT_MAKEFILE)]
    makefile: String,
    /// Confirm before running make
    #[arg(long)]
    confirm: bool,
    /// CWD override
    #[arg(short = 'C')]
    directory: Option<PathBuf>,
    /// Print the scan result as JSON instead of running make
    #[arg(long)]
    dump_scan: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    if cli.directory.is_some() {
        warn!("-C is not implemented yet, ignoring it");
    }
    info!("Makefile is: {}", cli.makefile);

    let content = fs::read_to_string(&cli.makefile)
        .with_context(|| format!("cannot read Makefile {}", cli.makefile))?;

    // 扫描 Makefile，算出变量覆盖
    let wrappers = WrapperCommands::from_install_dir(&runner::install_dir()?);
    let report = scan_makefile(&content, &wrappers)?;
    info!("Detected build system is {}", report.build_system);

    if cli.dump_scan {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let command_line = make_command_line(&report, &cli.makefile, &cli.options);
    info!("Make command line: {}", command_line.join(" "));

    if cli.confirm {
        let run = Confirm::new()
            .with_prompt("Run command?")
            .default(true)
            .interact()?;
        if !run {
            return Ok(());
        }
    }

    // make 的退出码就是我们的退出码
    let status = runner::run_make(&command_line)?;
    if !status.success() {
        warn!("make exited with {status}");
    }
    std::process::exit(status.code().unwrap_or(1));
}
