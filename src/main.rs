use anyhow::Result;
use clap::{Parser, Subcommand};
use mimemap::{CommandInfo, FileTypeMap, MailcapCommandMap};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Layered MIME type and mailcap command registry
///
/// Queries merge programmatic entries, ~/.mailcap and ~/.mime.types, the
/// MAILCAPS/MIMETYPES search paths, system files and built-in defaults.
#[derive(Parser, Debug)]
#[command(name = "mimemap")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Mailcap file searched ahead of every other source
    #[arg(long)]
    mailcap: Option<PathBuf>,

    /// mime.types file searched ahead of every other source
    #[arg(long)]
    mime_types: Option<PathBuf>,

    /// Render results as JSON
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the MIME type for each file name
    Type {
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Print the commands registered for a MIME type
    Commands { mime_type: String },

    /// Dump every known MIME type with its commands
    Dump,
}

#[derive(Serialize)]
struct TypeReport<'a> {
    file: &'a str,
    mime_type: &'a str,
}

#[derive(Serialize)]
struct CommandReport {
    mime_type: String,
    preferred: Vec<CommandInfo>,
    all: Vec<CommandInfo>,
    native: Vec<String>,
}

fn setup_logging(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn command_map(args: &Args) -> Result<MailcapCommandMap> {
    Ok(match &args.mailcap {
        Some(path) => MailcapCommandMap::from_path(path)?,
        None => MailcapCommandMap::new(),
    })
}

fn file_type_map(args: &Args) -> Result<FileTypeMap> {
    Ok(match &args.mime_types {
        Some(path) => FileTypeMap::from_path(path)?,
        None => FileTypeMap::new(),
    })
}

fn report_commands(map: &MailcapCommandMap, mime_type: &str) -> CommandReport {
    CommandReport {
        mime_type: mime_type.to_string(),
        preferred: map.preferred_commands(mime_type),
        all: map.all_commands(mime_type),
        native: map.native_commands(mime_type),
    }
}

fn print_command_report(report: &CommandReport) {
    println!("    {}", report.mime_type);
    println!("\tPreferred:");
    if report.preferred.is_empty() {
        println!("\t    NONE");
    }
    for cmd in &report.preferred {
        println!("\t    {}: {}", cmd.verb, cmd.handler);
    }
    println!("\tAll:");
    if report.all.is_empty() {
        println!("\t    NONE");
    }
    for cmd in &report.all {
        println!("\t    {}: {}", cmd.verb, cmd.handler);
    }
    println!("\tNative:");
    if report.native.is_empty() {
        println!("\t    NONE");
    }
    for native in &report.native {
        println!("\t    {}", native);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(&args.log_level)?;
    debug!("mimemap v{}", env!("CARGO_PKG_VERSION"));

    match &args.command {
        Command::Type { files } => {
            let map = file_type_map(&args)?;
            let reports: Vec<TypeReport> = files
                .iter()
                .map(|file| TypeReport {
                    file,
                    mime_type: map.content_type(file),
                })
                .collect();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                for report in &reports {
                    println!("{}: {}", report.file, report.mime_type);
                }
            }
        }

        Command::Commands { mime_type } => {
            let map = command_map(&args)?;
            let report = report_commands(&map, mime_type);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_command_report(&report);
            }
        }

        Command::Dump => {
            let map = command_map(&args)?;
            let types = map.mime_types();
            if types.is_empty() {
                println!("No known MIME types");
                return Ok(());
            }
            let reports: Vec<CommandReport> = types
                .iter()
                .map(|t| report_commands(&map, t))
                .collect();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                println!("Known MIME types:");
                for t in &types {
                    println!("\t{}", t);
                }
                println!();
                println!("Commands for each MIME type:");
                for report in &reports {
                    print_command_report(report);
                }
            }
        }
    }

    Ok(())
}
