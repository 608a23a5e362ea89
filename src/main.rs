use clap::{Parser, Subcommand};
use std::path::PathBuf;
use throwck::config::{self, OutputFormat};
use throwck::diagnostics::{CompileError, DiagnosticKind};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "throwck", version, about = "Checks that thrown errors are handled or declared")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check type-checked module trees (JSON) for unhandled throws
    Check {
        /// Tree files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Config file (defaults to the nearest throwck.toml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output format, overriding the config file
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// Worker threads, overriding the config file
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        jobs: Option<u32>,
    },
    /// Explain a diagnostic code, e.g. `missing-try`
    Explain {
        code: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("THROWCK_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { files, config, format, jobs } => {
            let loaded = match config {
                Some(path) => config::load_config(&path),
                None => std::env::current_dir()
                    .map_err(|e| CompileError::io(e.to_string(), PathBuf::from(".")))
                    .and_then(|dir| config::discover_config(&dir)),
            };
            let settings = loaded.unwrap_or_else(|err| exit_with(&err));

            let jobs = jobs.map_or(settings.check.jobs, |n| n as usize);
            let format = format.unwrap_or(settings.output.format);

            let reports = throwck::check_files(&files, jobs).unwrap_or_else(|err| exit_with(&err));
            let count = throwck::driver::emit_reports(&reports, format)
                .unwrap_or_else(|err| exit_with(&err));

            if count > 0 && settings.check.fatal {
                std::process::exit(1);
            }
        }
        Commands::Explain { code } => match DiagnosticKind::from_code(&code) {
            Some(kind) => println!("{kind}: {}", kind.guidance()),
            None => {
                let known: Vec<&str> = DiagnosticKind::ALL.iter().map(|k| k.code()).collect();
                eprintln!("error: unknown diagnostic code '{code}'; expected one of: {}", known.join(", "));
                std::process::exit(2);
            }
        },
    }
}

fn exit_with(err: &CompileError) -> ! {
    match err.path() {
        Some(path) => eprintln!("error [{}]: {err}", path.display()),
        None => eprintln!("error: {err}"),
    }
    std::process::exit(1);
}
