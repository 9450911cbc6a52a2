//! Interactive terminal REPL

use std::io::Write as _;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::analysis::{format_code, validate_syntax};
use crate::config::Config;
use crate::enhancer::{PromptEnhancer, TaskTemplate, COMMAND_CATALOG};
use crate::service::ModelClient;

const WELCOME: &str = r#"
Stata Llama Editor
==================

Local Stata code assistant.

Commands:
  /help              Show this help message
  /explain <code>    Explain Stata code
  /fix <code>        Debug and fix Stata code
  /optimize <code>   Suggest optimizations
  /format <code>     Reindent code locally (no model call)
  /check <code>      Validate braces and quotes locally (no model call)
  /exit, /quit       Exit the application

Type your Stata code or questions to get started!
"#;

/// Interactive REPL over stdin/stdout
pub struct Repl {
    config: Arc<Config>,
    client: ModelClient,
    enhancer: PromptEnhancer,
}

impl Repl {
    pub fn new(config: Arc<Config>, client: ModelClient) -> Self {
        Self {
            config,
            client,
            enhancer: PromptEnhancer::new(),
        }
    }

    /// Main loop; returns when the user exits or stdin closes
    pub async fn run(&self) -> Result<()> {
        self.print_welcome();
        println!(
            "Model: {} via {} ({})\n",
            self.config.model, self.config.backend, self.config.host
        );

        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();

        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let line = match lines.next_line().await? {
                Some(l) => l,
                None => {
                    println!("\nGoodbye!");
                    return Ok(());
                }
            };

            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            if input.starts_with('/') {
                if !self.handle_command(input).await {
                    println!("Goodbye!");
                    return Ok(());
                }
            } else {
                self.process_query(input).await;
            }
        }
    }

    fn print_welcome(&self) {
        println!("{}", WELCOME);
        println!("Common commands the assistant knows about:");
        for (name, description) in COMMAND_CATALOG {
            println!("  {:12} {}", name, description);
        }
        println!();
    }

    /// Dispatch a slash command. Returns false when the REPL should exit.
    async fn handle_command(&self, input: &str) -> bool {
        let (command, argument) = split_command(input);

        match command.as_str() {
            "/exit" | "/quit" => return false,
            "/help" => self.print_welcome(),
            "/explain" | "/fix" | "/optimize" => {
                let template = match command.as_str() {
                    "/explain" => TaskTemplate::Explain,
                    "/fix" => TaskTemplate::Fix,
                    _ => TaskTemplate::Optimize,
                };
                match argument {
                    Some(code) => self.process_query(&template.render(code)).await,
                    None => println!("Error: No code provided"),
                }
            }
            "/format" => match argument {
                Some(code) => println!("{}", format_code(code)),
                None => println!("Error: No code provided"),
            },
            "/check" => match argument {
                Some(code) => {
                    let check = validate_syntax(code);
                    if check.is_valid {
                        println!("Syntax OK");
                    } else {
                        println!("{}", check.error.unwrap_or_default());
                    }
                }
                None => println!("Error: No code provided"),
            },
            _ => println!("Unknown command: {}", command),
        }

        true
    }

    /// Enhance the query and stream the model response to the terminal
    async fn process_query(&self, query: &str) {
        let enhanced = self.enhancer.enhance(query);
        debug!("Enhanced prompt is {} bytes", enhanced.len());

        let mut chunks = self.client.stream_generate(&enhanced);
        let mut printed_any = false;

        println!("\nResponse:");
        while let Some(item) = chunks.recv().await {
            match item {
                Ok(text) => {
                    print!("{}", text);
                    let _ = std::io::stdout().flush();
                    printed_any = true;
                }
                Err(e) => {
                    if printed_any {
                        println!();
                    }
                    println!("Error: {}", e);
                    return;
                }
            }
        }
        println!("\n");
    }
}

/// Split a slash command line into its lowercased name and raw argument.
///
/// The split happens on the original text at the first whitespace, so the
/// byte length of the lowercased name (which can differ for multibyte
/// characters) never indexes into the input.
fn split_command(input: &str) -> (String, Option<&str>) {
    let (head, rest) = input.split_once(char::is_whitespace).unwrap_or((input, ""));
    let rest = rest.trim();
    (head.to_lowercase(), (!rest.is_empty()).then_some(rest))
}
