use anyhow::{Context, Result};
use clap::Parser;
use helpdesk_chat::cli::{Cli, Commands};
use helpdesk_chat::{utils, web, Settings, SubmitOutcome, System};
use std::net::SocketAddr;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let settings = match Settings::new() {
        Ok(settings) => settings,
        Err(e) => {
            utils::print_error(&format!("Configuration error: {}", e));
            std::process::exit(2);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level)),
        )
        .init();

    let api_key = match Settings::api_key() {
        Ok(key) => key,
        Err(e) => {
            utils::print_error(&format!("Configuration error: {}", e));
            std::process::exit(2);
        }
    };

    let system = System::from_parts(settings, api_key)?;

    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    }) {
        Commands::Serve { host, port } => handle_serve(&system, host, port).await,
        Commands::Ask { question } => handle_ask(&system, question).await,
        Commands::Interactive => handle_interactive(&system).await,
    }
}

async fn handle_serve(system: &System, host: Option<String>, port: Option<u16>) -> Result<()> {
    let server = &system.settings().server;
    let host = host.unwrap_or_else(|| server.host.clone());
    let port = port.unwrap_or(server.port);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", host, port))?;

    web::serve(system.app_state(), addr).await
}

async fn handle_ask(system: &System, question: String) -> Result<()> {
    if question.trim().is_empty() {
        utils::print_error("Question must not be empty");
        return Ok(());
    }

    utils::print_info("Generating response...");
    match system.resolver().resolve(question.trim()).await {
        Ok(reply) => {
            println!("\n{}", reply);
            Ok(())
        }
        Err(e) => {
            tracing::debug!("ask failed: {}", e);
            utils::print_error(&e.user_message());
            std::process::exit(1);
        }
    }
}

async fn handle_interactive(system: &System) -> Result<()> {
    utils::print_header(&system.settings().ui.title);
    utils::print_info(&system.settings().ui.caption);
    utils::print_info("Type your question (/help for commands, Ctrl+D to exit)\n");

    let mut session = system.session("terminal");

    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin);

    loop {
        utils::print_prompt("You: ");
        let mut input = String::new();
        if reader.read_line(&mut input).await? == 0 {
            println!();
            break;
        }

        match input.trim() {
            "/help" => {
                println!("Special commands:");
                println!("  /history - Show the conversation so far");
                println!("  /count   - Show turn count");
                println!("  /help    - Show this help");
                println!("  Ctrl+D   - Exit\n");
                continue;
            }
            "/count" => {
                utils::print_info(&format!("Turns in session: {}", session.conversation().len()));
                println!();
                continue;
            }
            "/history" => {
                for turn in session.conversation().snapshot() {
                    utils::print_turn(turn);
                }
                continue;
            }
            "" => continue,
            _ => {}
        }

        utils::print_info("Generating response...");
        match session.submit(&input).await {
            SubmitOutcome::Ignored => {}
            SubmitOutcome::Answered(_) => {
                if let Some(turn) = session.conversation().last() {
                    utils::print_turn(turn);
                }
            }
            SubmitOutcome::Failed(_) => {
                if let Some(notice) = session.notice() {
                    utils::print_error(notice);
                }
                println!();
            }
        }
    }

    Ok(())
}
