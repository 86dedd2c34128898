use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

pub mod ask;
pub mod chat;
mod render;
pub mod serve;

use crate::ask::AskClient;
use crate::chat::{AskOutcome, Conversation, ConversationBuilder, RequestHandle, TranscriptUpdate};
use crate::core::{AppConfig, logging};
use crate::view::Document;

#[derive(Subcommand)]
enum Command {
    /// Ask a single question and print the answer
    Ask {
        question: String,
        /// Attach a reference snippet, can be repeated
        #[arg(long = "reference", short = 'r')]
        references: Vec<String>,
        /// Wait for the whole answer instead of streaming it
        #[arg(long, action, default_value = "false")]
        no_stream: bool,
    },
    /// Start an interactive question and answer session
    Chat {},
    /// Run the stub ask server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "8000")]
        port: String,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    let config = AppConfig::default();

    // Handle each sub command
    match args.command {
        Some(Command::Ask {
            question,
            references,
            no_stream,
        }) => {
            logging::init(&logging::cli_filter());
            ask::run(config, question, references, no_stream).await?;
        }
        Some(Command::Chat {}) => {
            logging::init(&logging::cli_filter());
            chat::run(config).await?;
        }
        Some(Command::Serve { host, port }) => {
            logging::init(&logging::server_filter());
            serve::run(host, port, config).await?;
        }
        None => {}
    }

    Ok(())
}

fn conversation_builder(config: &AppConfig, document: &Document) -> ConversationBuilder {
    let builder =
        Conversation::builder(AskClient::from_config(config)).streaming(config.streaming);
    if config.send_original_text {
        builder.original_text(&document.full_text())
    } else {
        builder
    }
}

/// Run the submitted question to the end, printing the answer as it
/// arrives. Ctrl-C cancels the request instead of exiting.
async fn drive(
    conversation: &mut Conversation,
    handle: &RequestHandle,
    rx: &mut mpsc::UnboundedReceiver<TranscriptUpdate>,
) -> Result<AskOutcome> {
    drive_until(conversation, handle, rx, tokio::signal::ctrl_c()).await
}

async fn drive_until(
    conversation: &mut Conversation,
    handle: &RequestHandle,
    rx: &mut mpsc::UnboundedReceiver<TranscriptUpdate>,
    interrupt: impl Future<Output = std::io::Result<()>>,
) -> Result<AskOutcome> {
    let run = conversation.run();
    tokio::pin!(run, interrupt);
    let mut interrupted = false;

    let outcome = loop {
        tokio::select! {
            outcome = &mut run => break outcome?,
            Some(update) = rx.recv() => render::print_update(&update),
            result = &mut interrupt, if !interrupted => {
                interrupted = true;
                match result {
                    Ok(()) => handle.cancel(),
                    Err(e) => tracing::warn!("Unable to listen for Ctrl-C: {}", e),
                }
            }
        }
    };

    while let Ok(update) = rx.try_recv() {
        render::print_update(&update);
    }
    println!();

    if let AskOutcome::Cancelled = outcome {
        println!("(cancelled)");
    }

    Ok(outcome)
}
