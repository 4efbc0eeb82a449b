use clap::Parser;
use kindling::{Branch, Config, Fire, Leaf, LogFormat, Result};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// A small calculator exposed through kindling.
///
/// Everything after the options below is handed to the command tree, so
/// `--help` and `--interactive` are answered by the tree itself.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Cli {
    /// Log output format (overrides KINDLING_LOG_FORMAT)
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,

    /// Command path, arguments and flags for the calculator
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

fn calculator() -> Result<Branch> {
    let info = Branch::new().command(
        "greeting",
        Leaf::new(|args| Ok(format!("greetings {}!", args.str("name")?)))
            .signature("(name = \"hobochild\")"),
    )?;

    let misc = Branch::new()
        .command(
            "year",
            Leaf::new(|_| Ok("1999")).describe("the year I was made"),
        )?
        .command("brand", Leaf::new(|_| Ok("casio")))?
        .command(
            "hello",
            Leaf::new(|args| Ok(format!("hi {}", args.str("name")?)))
                .param("name")
                .describe("prints your name"),
        )?
        .command("info", info)?;

    Branch::new()
        .describe("I am a math machine")
        .command(
            "half",
            Leaf::new(|args| Ok(args.parse::<f64>("number")? / 2.0)).param("number"),
        )?
        .command(
            "double",
            Leaf::new(|args| Ok(args.parse::<f64>("number")? * 2.0)).param("number"),
        )?
        .command(
            "add",
            Leaf::new(|args| Ok(args.parse::<f64>("n1")? + args.parse::<f64>("n2")?))
                .signature("(n1 = 3.141592653589793, n2)"),
        )?
        .command(
            "countdown",
            Leaf::new_async(|args| async move {
                // from defaults to 3 inside the command itself
                let from = args.parse_or::<u64>("from", 3)?;
                for remaining in (1..=from).rev() {
                    info!(remaining, "Counting down");
                    tokio::time::sleep(Duration::from_millis(200)).await;
                }
                Ok::<_, anyhow::Error>(format!("liftoff after {}", from))
            })
            .param_deferred("from")
            .describe("waits a little, then lifts off"),
        )?
        .command("misc", misc)
}

fn init_logging(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::from_default_env();

    match &config.log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "kindling.log".into());
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));
            match config.log_format {
                LogFormat::Json => tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(filter)
                    .with_writer(writer)
                    .init(),
                LogFormat::Text => tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_ansi(false)
                    .with_writer(writer)
                    .init(),
            }
            Some(guard)
        },
        None => {
            // stdout is reserved for command output
            match config.log_format {
                LogFormat::Json => tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .init(),
                LogFormat::Text => tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .init(),
            }
            None
        },
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        },
    };
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }

    // Initialize logging
    let _guard = init_logging(&config);
    info!("Initializing calculator...");

    let fire = match calculator().and_then(|tree| Fire::with_config(tree, config)) {
        Ok(fire) => fire,
        Err(e) => {
            error!("Failed to build command tree: {:?}", e);
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        },
    };

    fire.run(cli.tokens).await
}
