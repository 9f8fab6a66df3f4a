use std::io::{BufRead, Write};
use std::time::Duration;

use anyhow::Context;
use colored::Colorize;
use corpchat_client::{
    HttpThreadStore, RelayClient, ReplyAccumulator, Session, StreamOptions, ThreadEvent,
    ThreadStore, send_message,
};
use corpchat_models::{ChatMessage, Sender};

use crate::ThreadCommand;
use crate::config::CliConfig;

fn store(config: &CliConfig) -> anyhow::Result<HttpThreadStore> {
    let token = config
        .resolve_token()
        .context("no API token configured; set `token` in config.toml or CORPCHAT_TOKEN")?;
    Ok(HttpThreadStore::new(&config.api_url, Session::new(token)))
}

pub async fn threads(config: &CliConfig, command: ThreadCommand) -> anyhow::Result<()> {
    let store = store(config)?;
    match command {
        ThreadCommand::List => {
            for summary in store.list_threads().await? {
                println!("{}  {}", summary.thread_id.bold(), summary.title);
            }
        }
        ThreadCommand::New { title } => {
            let thread = store.create_thread(&title, &config.model).await?;
            println!("created thread {}", thread.thread_id.bold());
        }
        ThreadCommand::Rename { id, title } => {
            store.rename_thread(&id, &title).await?;
            println!("renamed thread {id}");
        }
        ThreadCommand::Delete { id } => {
            store.delete_thread(&id).await?;
            println!("deleted thread {id}");
        }
    }
    Ok(())
}

fn print_message(message: &ChatMessage) {
    match message.sender {
        Sender::User => println!("{} {}", ">".green().bold(), message.text),
        Sender::Bot => println!("{}", message.text),
    }
}

pub async fn chat(config: &CliConfig, thread: Option<String>) -> anyhow::Result<()> {
    let store = store(config)?;
    let relay = RelayClient::new(&config.relay_url);

    let (thread_id, history) = match thread {
        Some(id) => {
            let history = store.list_messages(&id).await?;
            (id, history)
        }
        None => {
            let thread = store.create_thread("New chat", &config.model).await?;
            println!("created thread {}", thread.thread_id.bold());
            (thread.thread_id, Vec::new())
        }
    };

    for message in &history {
        print_message(message);
    }

    let mut accumulator = ReplyAccumulator::new(&thread_id, &config.model).with_history(history);
    let mut events = accumulator.subscribe();

    // Print deltas as they arrive; one printer task for the whole session.
    let printer = tokio::spawn(async move {
        let mut printed = 0usize;
        while let Some(event) = events.recv().await {
            match event {
                ThreadEvent::MessageAppended(message) => {
                    if message.sender == Sender::Bot {
                        printed = 0;
                    }
                }
                ThreadEvent::MessageUpdated(message) => {
                    print!("{}", &message.text[printed..]);
                    let _ = std::io::stdout().flush();
                    printed = message.text.len();
                }
                ThreadEvent::StreamFinished(_) => println!(),
                ThreadEvent::StreamFailed { message } => {
                    eprintln!("\n{} {message}", "stream failed:".red().bold());
                }
            }
        }
    });

    let options = StreamOptions {
        idle_timeout: Some(Duration::from_secs(config.idle_timeout_secs)),
    };
    let stdin = std::io::stdin();

    println!("chatting on thread {} (/quit to leave)", thread_id.bold());
    loop {
        print!("{} ", ">".green().bold());
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" {
            break;
        }

        // Awaiting the full reply here means a second submit can never
        // overlap an open stream.
        if let Err(err) = send_message(&mut accumulator, &relay, &store, line, &options).await {
            eprintln!("{} {err}", "error:".red().bold());
        }
    }

    printer.abort();
    Ok(())
}
