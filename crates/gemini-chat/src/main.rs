//! A simple program demonstrates how to use `gemini-chat` as a library.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::pin::pin;
use std::time::Duration;

use futures_util::StreamExt;
use gemini_chat::{AgentConfig, ChatClient, ChatSession, GroundingSource, Observer};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::time::sleep;

const BAR_CHAR: &str = "▎";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const ANALYZE_COMMAND: &str = "/analyze";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match config_from_env() {
        Ok(config) => config,
        Err(reason) => {
            eprintln!("{reason}");
            return;
        }
    };
    let client = match gemini_chat::connect(Observer::default()) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };
    let mut session = match client.create_chat_session(&config) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };

    loop {
        print!("> ");
        std::io::stdout().flush().unwrap();

        let Some(line) = read_line().await else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(data) = line.strip_prefix(ANALYZE_COMMAND) {
            analyze(&client, data.trim()).await;
        } else {
            chat(&mut session, line).await;
        }
    }
}

async fn chat(session: &mut ChatSession, message: &str) {
    let mut stream = match session.stream_message(message) {
        Ok(stream) => stream,
        Err(err) => {
            print_error(&err);
            return;
        }
    };

    let mut sources: Vec<GroundingSource> = vec![];
    let mut next = with_spinner("🤔 Thinking...", stream.next()).await;
    print!("{}🤖 ", BAR_CHAR.bright_cyan());
    while let Some(chunk) = next {
        match chunk {
            Ok(chunk) => {
                print!("{}", chunk.text.bright_white());
                std::io::stdout().flush().unwrap();
                for source in chunk.grounding_chunks.iter().filter_map(|c| c.source()) {
                    if !sources.contains(source) {
                        sources.push(source.clone());
                    }
                }
            }
            Err(err) => {
                println!();
                print_error(&err);
                return;
            }
        }
        next = stream.next().await;
    }
    println!();

    if !sources.is_empty() {
        let bar = BAR_CHAR.bright_black();
        println!("{bar}Sources:");
        for (idx, source) in sources.iter().enumerate() {
            let title = source.title.as_deref().unwrap_or("untitled");
            let uri = source.uri.as_deref().unwrap_or_default();
            println!("{bar}[{}] {} {}", idx + 1, title, uri.dimmed());
        }
    }
}

async fn analyze(client: &ChatClient, data: &str) {
    if data.is_empty() {
        println!("usage: {ANALYZE_COMMAND} <text>");
        return;
    }
    match with_spinner("🔍 Analyzing...", client.analyze_text(data)).await {
        Ok(answer) => {
            println!("{}📊 {}", BAR_CHAR.bright_green(), answer.bright_white());
        }
        Err(err) => print_error(&err),
    }
}

/// Drives `fut` to completion while showing a spinner.
async fn with_spinner<F: Future>(message: &'static str, fut: F) -> F::Output {
    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(progress_style);
    progress_bar.set_message(message);

    let mut fut = pin!(fut);
    loop {
        progress_bar.inc(1);
        select! {
            output = &mut fut => {
                // Finish the progress bar before printing anything else.
                progress_bar.finish_and_clear();
                return output;
            }
            _ = sleep(Duration::from_millis(100)) => {}
        }
    }
}

fn print_error(err: &gemini_chat::Error) {
    println!("{}⚠️  {}", BAR_CHAR.bright_red(), err.bright_red());
}

fn config_from_env() -> Result<AgentConfig, String> {
    let temperature = match env::var("GEMINI_TEMPERATURE") {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| format!("GEMINI_TEMPERATURE is not a number: {value}"))?,
        Err(_) => 1.0,
    };
    let use_search = match env::var("GEMINI_USE_SEARCH") {
        Ok(value) => !matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        Err(_) => true,
    };

    Ok(AgentConfig {
        model: env::var("GEMINI_MODEL")
            .unwrap_or_else(|_| DEFAULT_MODEL.to_owned()),
        system_instruction: env::var("GEMINI_SYSTEM_INSTRUCTION")
            .unwrap_or_default(),
        temperature,
        use_search,
    })
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
