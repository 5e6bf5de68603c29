use anyhow::{Context, Result};
use dualpilot::app::{App, Response};
use dualpilot::config::AppConfig;
use dualpilot::core::{ChatCompletionClient, CommandTicket, Delivery};
use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "DUALPILOT_LOG";

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = AppConfig::load().context("failed to load configuration")?;

    // 시작 경로: [LEFT] [RIGHT], 기본값은 현재 디렉토리
    let cwd = env::current_dir().context("cannot determine current directory")?;
    let mut args = env::args_os().skip(1).map(PathBuf::from);
    let left = args.next().unwrap_or_else(|| cwd.clone());
    let right = args.next().unwrap_or_else(|| cwd.clone());

    let client = ChatCompletionClient::from_config(&config.assistant)?;
    tracing::info!(
        endpoint = client.endpoint(),
        model = %config.assistant.model,
        "assistant configured"
    );
    if !client.has_api_key() {
        tracing::warn!(
            env = %config.assistant.api_key_env,
            "no API key set; assistant commands will fail"
        );
    }

    let mut app = App::new(&config, &left, &right, Arc::new(client))
        .context("failed to open panels")?;

    println!("{}", app.render_panels());
    println!("Type 'help' for commands.");

    let res = run_app(&mut app).await;
    if let Err(err) = &res {
        tracing::error!(error = %err, "console loop ended with an error");
    }
    res
}

async fn run_app(app: &mut App) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticket: Option<CommandTicket> = None;

    prompt(app)?;
    while !app.should_quit() {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    break;
                };
                match app.handle_line(&line) {
                    Ok(Some(Response::Text(text))) => println!("{}", text),
                    Ok(Some(Response::Submitted(submitted))) => {
                        println!("Thinking... (entry #{})", submitted.entry_id());
                        ticket = Some(submitted);
                    }
                    Ok(Some(Response::Quit)) => break,
                    Ok(None) => {}
                    Err(err) => println!("Error: {}", err),
                }
            }
            delivery = wait_ticket(&mut ticket) => {
                ticket = None;
                match app.complete(delivery) {
                    Ok(outcome) => {
                        println!("{}", App::describe_outcome(&outcome));
                        if outcome.is_success() {
                            println!("{}", app.render_panels());
                        }
                    }
                    Err(err) => println!("Error: {}", err),
                }
            }
        }
        prompt(app)?;
    }

    // 종료 시 진행 중인 명령은 오류로 기록
    if let Some(ticket) = ticket.take() {
        let outcome = app.abandon(ticket)?;
        tracing::info!(entry_id = outcome.entry_id(), "in-flight command abandoned at exit");
    }

    Ok(())
}

/// 진행 중인 명령이 없으면 영원히 대기
async fn wait_ticket(ticket: &mut Option<CommandTicket>) -> Delivery {
    match ticket {
        Some(ticket) => ticket.recv().await,
        None => std::future::pending().await,
    }
}

fn prompt(app: &App) -> Result<()> {
    let marker = if app.pipeline().is_busy() { "…" } else { "" };
    print!(
        "{}{}> ",
        app.panels.active().current_path().display(),
        marker
    );
    std::io::stdout().flush()?;
    Ok(())
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("dualpilot=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
