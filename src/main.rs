//! `mvvmgen` command line entry point.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser};
use mvvmgen::core::MvvmError;
use mvvmgen::{DEFAULT_MANIFEST, Manifest, RunMode, RunReport, Session};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "mvvmgen",
    version,
    about = "Generate view-model property registration code"
)]
struct Cli {
    /// Manifest describing the modules to generate
    #[arg(long, default_value = DEFAULT_MANIFEST)]
    manifest: PathBuf,

    /// Generate in memory without writing any file
    #[arg(long)]
    dry_run: bool,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only report errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    fn mode(&self) -> RunMode {
        if self.dry_run {
            RunMode::DryRun
        } else {
            RunMode::Emit
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(report) => {
            if !cli.quiet {
                print_summary(&report);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<RunReport> {
    let manifest = Manifest::load(&cli.manifest)
        .with_context(|| format!("loading manifest '{}'", cli.manifest.display()))?;
    let base_dir = cli
        .manifest
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let session = Session::from_manifest(&manifest, base_dir).context("configuring modules")?;
    let report = session.run(cli.mode())?;
    Ok(report)
}

fn print_summary(report: &RunReport) {
    for module in &report.modules {
        let target = match report.mode {
            RunMode::DryRun => module.provisional_path.display(),
            RunMode::Emit => module.final_path.display(),
        };
        let status = match module.final_status {
            Some(status) => format!("{status:?}").to_lowercase(),
            None => "dry run".to_string(),
        };
        println!(
            "{:<24} {:>4} properties  {} ({status})",
            module.module, module.declarations, target
        );
    }
    println!(
        "{} modules, {} properties from {} headers",
        report.modules.len(),
        report.declaration_count(),
        report.headers
    );
}

fn report_error(err: &anyhow::Error) {
    if let Some(MvvmError::Parse { file, error }) = err.downcast_ref::<MvvmError>() {
        eprintln!("{}:", file.display());
        match std::fs::read_to_string(file) {
            Ok(source) => eprint!("{}", error.display_with_source(&source)),
            Err(_) => eprintln!("{error}"),
        }
        return;
    }

    eprintln!("error: {err}");
    for cause in err.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
}
