use std::error::Error;
use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::ChatSource;
use crate::cli::Context;
use crate::core::chat::{ChatSession, SendOutcome};
use crate::core::locale::LocaleStore;

/// What a line typed at the chat prompt asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum ReplInput<'a> {
    Message(&'a str),
    Clear,
    Quit,
    Empty,
}

pub fn parse_repl_input(line: &str) -> ReplInput<'_> {
    match line.trim() {
        "" => ReplInput::Empty,
        "/quit" | "/exit" | "/q" => ReplInput::Quit,
        "/clear" => ReplInput::Clear,
        text => ReplInput::Message(text),
    }
}

fn print_sources(sources: &[ChatSource]) {
    for source in sources {
        println!("  ↳ {} ({})", source.title, source.url);
    }
}

async fn exchange(
    ctx: &Context,
    chat: &mut ChatSession,
    locale: &LocaleStore,
    question: &str,
    stream: bool,
) -> SendOutcome {
    if stream {
        let outcome = chat
            .stream_message(&ctx.client, question, |text| {
                print!("{text}");
                let _ = std::io::stdout().flush();
            })
            .await;
        if outcome != SendOutcome::Skipped {
            println!();
            print_sources(chat.sources());
        }
        outcome
    } else {
        eprintln!("{}", locale.t("chat.thinking"));
        let outcome = chat.send_message(&ctx.client, question).await;
        if let Some(reply) = chat.messages().last().filter(|m| m.role.is_assistant()) {
            if outcome != SendOutcome::Skipped {
                println!("{}", reply.content);
            }
        }
        outcome
    }
}

fn report(outcome: SendOutcome) {
    match outcome {
        SendOutcome::Fallback => eprintln!("⚠️  Assistant offline; showing a canned answer"),
        SendOutcome::Interrupted => eprintln!("⚠️  Reply was cut off"),
        SendOutcome::Answered | SendOutcome::Skipped => {}
    }
}

pub async fn ask(ctx: &Context, question: &str, stream: bool) -> Result<(), Box<dyn Error>> {
    let locale = ctx.locale();
    let mut chat = ChatSession::new();
    let outcome = exchange(ctx, &mut chat, &locale, question, stream).await;
    if outcome == SendOutcome::Skipped {
        return Err("Nothing to ask".into());
    }
    report(outcome);
    Ok(())
}

pub async fn repl(ctx: &Context, stream: bool) -> Result<(), Box<dyn Error>> {
    let locale = ctx.locale();
    let mut chat = ChatSession::new();
    chat.toggle();

    println!("{}", locale.t("chat.title"));
    println!("{}", locale.t("chat.welcome"));
    println!("(/clear to start over, /quit to leave)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match parse_repl_input(&line) {
            ReplInput::Empty => continue,
            ReplInput::Quit => break,
            ReplInput::Clear => {
                chat.clear();
                println!("{}", locale.t("chat.clear"));
            }
            ReplInput::Message(text) => {
                let outcome = exchange(ctx, &mut chat, &locale, text, stream).await;
                report(outcome);
            }
        }
    }

    chat.close();
    Ok(())
}
