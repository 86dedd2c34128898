use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

use super::{conversation_builder, drive, render};
use crate::chat::Message;
use crate::core::AppConfig;
use crate::view::{Document, ReferenceChips, Segment, dispatch_hover, render_citations};

const HELP: &str = "\
Type a question to ask it. Commands:
  :ref <text>   attach a reference snippet to the next question
  :refs         list attached references
  :unref <n>    remove reference n
  :doc          show the document
  :cite <n>     show the document with citation n of the last answer highlighted
  :help         show this help
  :quit         exit";

#[derive(Debug, PartialEq)]
enum ChatCommand<'a> {
    Ask(&'a str),
    AddReference(&'a str),
    ListReferences,
    RemoveReference(usize),
    ShowDocument,
    Cite(u32),
    Help,
    Quit,
    Invalid(&'a str),
}

impl<'a> ChatCommand<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        let Some(command) = line.strip_prefix(':') else {
            return ChatCommand::Ask(line);
        };
        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };

        match name {
            "ref" => ChatCommand::AddReference(arg),
            "refs" => ChatCommand::ListReferences,
            "unref" => match arg.parse::<usize>() {
                Ok(n) if n > 0 => ChatCommand::RemoveReference(n - 1),
                _ => ChatCommand::Invalid(line),
            },
            "doc" => ChatCommand::ShowDocument,
            "cite" => match arg.parse::<u32>() {
                Ok(n) => ChatCommand::Cite(n),
                Err(_) => ChatCommand::Invalid(line),
            },
            "help" => ChatCommand::Help,
            "quit" | "q" => ChatCommand::Quit,
            _ => ChatCommand::Invalid(line),
        }
    }
}

/// The document as it looks while citation `number` of `answer` is
/// hovered. The highlight is cleared again before returning.
fn cite(document: &mut Document, answer: &Message, number: u32) -> Option<String> {
    let table = answer.citation_table();
    let citation = render_citations(&answer.content, &table)
        .into_iter()
        .find(|s| matches!(s, Segment::Citation { number: n, .. } if *n == number))?;

    dispatch_hover(citation.on_enter()?, document);
    let rendered = document.render();
    if let Some(leave) = citation.on_leave() {
        dispatch_hover(leave, document);
    }
    Some(rendered)
}

pub async fn run(config: AppConfig) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let mut document = Document::from_config(&config)?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut conversation = conversation_builder(&config, &document).updates(tx).build();
    let mut chips = ReferenceChips::new();

    println!("{}\n\n{}", document.render(), HELP);

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                match ChatCommand::parse(&line) {
                    ChatCommand::Ask(question) => {
                        let handle = match conversation.submit(question, chips.list().to_vec()) {
                            Ok(handle) => handle,
                            Err(e) => {
                                println!("{}", e);
                                continue;
                            }
                        };
                        // Only an accepted question consumes the chips
                        chips.take();

                        drive(&mut conversation, &handle, &mut rx).await?;
                        if let Some(answer) = conversation.transcript().last_answer() {
                            for line in render::footnotes(answer) {
                                println!("{}", line);
                            }
                        }
                    }
                    ChatCommand::AddReference(text) => {
                        if chips.add(text) {
                            println!("Attached reference {}", chips.len());
                        } else {
                            println!("Nothing to attach");
                        }
                    }
                    ChatCommand::ListReferences => {
                        if chips.is_empty() {
                            println!("No references attached");
                        }
                        for (i, chip) in chips.list().iter().enumerate() {
                            println!("  {}. {}", i + 1, chip);
                        }
                    }
                    ChatCommand::RemoveReference(index) => match chips.remove(index) {
                        Some(chip) => println!("Removed \"{}\"", chip),
                        None => println!("No reference {}", index + 1),
                    },
                    ChatCommand::ShowDocument => println!("{}", document.render()),
                    ChatCommand::Cite(number) => {
                        let Some(answer) = conversation.transcript().last_answer() else {
                            println!("No answer to cite yet");
                            continue;
                        };
                        match cite(&mut document, answer, number) {
                            Some(rendered) => println!("{}", rendered),
                            None => println!("No citation [{}] in the last answer", number),
                        }
                    }
                    ChatCommand::Help => println!("{}", HELP),
                    ChatCommand::Quit => break,
                    ChatCommand::Invalid(line) => println!("Unknown command {}", line),
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
