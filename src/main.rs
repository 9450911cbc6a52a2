//! stata-llama - local Stata code assistant backed by an LLM runtime

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stata_llama::config::{BackendKind, Config, ConfigOptions};
use stata_llama::eval::bench::Benchmark;
use stata_llama::eval::Evaluator;
use stata_llama::repl::Repl;
use stata_llama::service::ModelClient;
use stata_llama::web::ChatServer;

#[derive(ValueEnum, Debug, Copy, Clone)]
enum BackendArg {
    Ollama,
    OpenaiCompat,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Ollama => BackendKind::Ollama,
            BackendArg::OpenaiCompat => BackendKind::OpenAiCompat,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "stata-llama-rs")]
#[command(about = "Local Stata code assistant backed by an LLM runtime")]
struct Args {
    /// Runtime host URL (falls back to STATA_LLAMA_HOST, then the default)
    #[arg(long)]
    host: Option<String>,

    /// Model name (falls back to STATA_LLAMA_MODEL, then the default)
    #[arg(long)]
    model: Option<String>,

    /// Runtime API flavor
    #[arg(long, value_enum, default_value = "ollama")]
    backend: BackendArg,

    /// Sampling temperature
    #[arg(long)]
    temperature: Option<f32>,

    /// Maximum tokens to generate
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Nucleus sampling cutoff
    #[arg(long)]
    top_p: Option<f32>,

    /// System message sent ahead of every prompt
    #[arg(long)]
    system: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive terminal session (the default)
    Repl,
    /// Browser chat UI with streamed responses
    Web {
        /// First port to try; incremented when in use
        #[arg(long, default_value_t = 8080)]
        port: u16,
        /// Do not open the browser automatically
        #[arg(long)]
        no_browser: bool,
    },
    /// Run the canned evaluation cases and write a JSON report
    Eval {
        /// Directory for the report file
        #[arg(long, default_value = ".")]
        report_dir: std::path::PathBuf,
    },
    /// Run the performance benchmarks
    Bench,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Log to stderr so stdout stays clean for the REPL
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = Config::new(
        Config::resolve_host(args.host),
        Config::resolve_model(args.model),
        args.backend.into(),
        ConfigOptions {
            temperature: args.temperature,
            max_tokens: args.max_tokens,
            top_p: args.top_p,
            stop: Vec::new(),
            system_message: args.system,
            request_timeout_secs: args.timeout,
        },
    )?;

    let client = ModelClient::new(config.clone())?;

    let outcome = match args.command.unwrap_or(Command::Repl) {
        Command::Repl => Repl::new(config, client).run().await,
        Command::Web { port, no_browser } => {
            ChatServer::new(config, client, port).run(!no_browser).await
        }
        Command::Eval { report_dir } => {
            let report = Evaluator::new(client).run_all().await;
            report.print_summary();
            let path = report.save(&report_dir)?;
            println!("\nReport saved to {}", path.display());
            Ok(())
        }
        Command::Bench => Benchmark::new(client).run_all().await,
    };

    if let Err(e) = outcome {
        error!("Fatal: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
