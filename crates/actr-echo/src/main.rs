//! Actr echo
//!
//! TigerStyle: Command-line host for the echo workloads with explicit error handling.

use actr_core::{init_telemetry, ActrConfig, TelemetryConfig};
use actr_echo::{
    echo_client_type, echo_service_type, EchoClientWorkload, EchoRequest, EchoResponse,
    EchoServerWorkload, ECHO_ROUTE_KEY,
};
use actr_runtime::{ActorRef, ActorSystem};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

/// Actr echo
#[derive(Parser, Debug)]
#[command(name = "actr-echo")]
#[command(about = "Echo service and client hosted on the Actr runtime")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to Actr.toml (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the echo service until Ctrl-C
    Serve,

    /// Interactive echo client
    Chat {
        /// Do not host an echo service next to the client
        #[arg(long)]
        without_server: bool,
    },

    /// Send a single message and print the reply
    Send {
        /// Message to echo
        message: String,

        /// Output raw JSON response
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    init_telemetry(TelemetryConfig::new("actr-echo").with_log_level(filter))?;

    let config = match &cli.config {
        Some(path) => ActrConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => ActrConfig::default(),
    };
    let system = ActorSystem::new(config).context("Failed to create actor system")?;

    match cli.command {
        Commands::Serve => cmd_serve(system).await,
        Commands::Chat { without_server } => cmd_chat(system, !without_server).await,
        Commands::Send { message, json } => cmd_send(system, &message, json).await,
    }
}

/// Start the echo service and wait for Ctrl-C
async fn cmd_serve(system: ActorSystem) -> Result<()> {
    let server = start_server(&system).await?;
    println!(
        "{} {}",
        "Echo service running:".green().bold(),
        server.actor_id()
    );
    println!("{}", "Press Ctrl-C to stop.".dimmed());

    server.wait_for_interrupt_and_shutdown().await;
    println!("{}", "Echo service stopped.".dimmed());
    Ok(())
}

/// Interactive loop sending each line through the client
async fn cmd_chat(system: ActorSystem, with_server: bool) -> Result<()> {
    if with_server {
        start_server(&system).await?;
    }
    let client = start_client(&system).await?;

    println!(
        "{} {}",
        "Echo client running:".green().bold(),
        client.actor_id()
    );
    println!("{}", "Type a message, /servers to list echo services, or quit to exit.".dimmed());
    println!();

    let mut editor = DefaultEditor::new().context("Failed to create editor")?;
    let prompt = format!("{} ", ">".blue().bold());

    loop {
        match editor.readline(&prompt) {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(input);

                if is_quit_command(input) {
                    break;
                }

                if input == "/servers" {
                    match system.list(&echo_service_type()?).await {
                        Ok(servers) if servers.is_empty() => {
                            println!("{}", "No echo service registered.".yellow())
                        }
                        Ok(servers) => {
                            for server in servers {
                                println!("  {}", server);
                            }
                        }
                        Err(e) => eprintln!("{} {}", "Error:".red(), e),
                    }
                    continue;
                }

                match send_echo(&client, input).await {
                    Ok(response) => println!(
                        "{} {} {}",
                        "<".green().bold(),
                        response.reply,
                        format!("[{}]", response.timestamp).dimmed()
                    ),
                    Err(e) => eprintln!("{} {}", "Error:".red(), e),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{} {:?}", "Error:".red(), err);
                break;
            }
        }
    }

    println!("{}", "Goodbye!".dimmed());
    system.shutdown_all().await;
    Ok(())
}

/// Whether a console line ends the session (`quit`, `exit`, with or without a slash)
fn is_quit_command(input: &str) -> bool {
    matches!(input.trim_start_matches('/'), "quit" | "exit" | "q")
}

/// Send one message through an in-process client and server
async fn cmd_send(system: ActorSystem, message: &str, json: bool) -> Result<()> {
    start_server(&system).await?;
    let client = start_client(&system).await?;

    let response = send_echo(&client, message).await;
    system.shutdown_all().await;
    let response = response?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.reply);
    }
    Ok(())
}

async fn start_server(system: &ActorSystem) -> Result<ActorRef> {
    let workload = EchoServerWorkload::new()?;
    system
        .attach_as(echo_service_type()?, workload)
        .start()
        .await
        .context("Failed to start echo service")
}

async fn start_client(system: &ActorSystem) -> Result<ActorRef> {
    let workload = EchoClientWorkload::new()?;
    system
        .attach_as(echo_client_type()?, workload)
        .start()
        .await
        .context("Failed to start echo client")
}

async fn send_echo(client: &ActorRef, message: &str) -> Result<EchoResponse> {
    let response = client
        .request(ECHO_ROUTE_KEY, &EchoRequest::new(message))
        .await?;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_commands() {
        for input in ["quit", "exit", "/quit", "/exit", "/q"] {
            assert!(is_quit_command(input), "{input} should quit");
        }
        assert!(!is_quit_command("quitting"));
        assert!(!is_quit_command("hello"));
        assert!(!is_quit_command("/servers"));
    }
}
