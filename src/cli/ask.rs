use anyhow::{Result, anyhow};
use tokio::sync::mpsc;

use super::{conversation_builder, drive, render};
use crate::chat::AskOutcome;
use crate::core::AppConfig;
use crate::view::Document;

pub async fn run(
    config: AppConfig,
    question: String,
    references: Vec<String>,
    no_stream: bool,
) -> Result<()> {
    let document = Document::from_config(&config)?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut conversation = conversation_builder(&config, &document)
        .streaming(config.streaming && !no_stream)
        .updates(tx)
        .build();

    let handle = conversation.submit(&question, references)?;
    let outcome = drive(&mut conversation, &handle, &mut rx).await?;

    if let AskOutcome::Failed(e) = outcome {
        return Err(anyhow!(e));
    }

    if let Some(answer) = conversation.transcript().last_answer() {
        for line in render::footnotes(answer) {
            println!("{}", line);
        }
    }

    Ok(())
}
