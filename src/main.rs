mod terminal;

use anyhow::Result;
use llm_cmd::config::CONFIG;
use llm_cmd::LLMClient;
use serde_json::json;
use std::env;
use std::process;

const USAGE: &str = "\
Usage:
  llm-cmd [-n N] [--stats] [--json] <request...>   suggest shell commands
  llm-cmd --explain [--stats] [--json] <command...> explain a command
  llm-cmd --models [--json]                         list installed models

Environment:
  LLM_CMD_ENDPOINT, LLM_CMD_MODEL, LLM_CMD_TEMPERATURE,
  LLM_CMD_TIMEOUT, LLM_CMD_NUM_THREAD, LLM_CMD_SUGGESTIONS";

#[derive(Debug, PartialEq)]
enum Mode {
    Suggest,
    Explain,
    Models,
    Help,
}

#[derive(Debug, PartialEq)]
struct Args {
    mode: Mode,
    count: Option<usize>,
    stats: bool,
    json: bool,
    text: String,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut parsed = Args {
        mode: Mode::Suggest,
        count: None,
        stats: false,
        json: false,
        text: String::new(),
    };
    let mut words: Vec<String> = Vec::new();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if !words.is_empty() {
            // Everything after the first word belongs to the request.
            words.push(arg);
            continue;
        }
        match arg.as_str() {
            "-h" | "--help" => parsed.mode = Mode::Help,
            "-e" | "--explain" => parsed.mode = Mode::Explain,
            "--models" => parsed.mode = Mode::Models,
            "--stats" => parsed.stats = true,
            "--json" => parsed.json = true,
            "-n" | "--count" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("{} needs a number", arg))?;
                let count = value
                    .parse::<usize>()
                    .map_err(|_| anyhow::anyhow!("invalid count: {}", value))?;
                parsed.count = Some(count);
            }
            "--" => words.extend(args.by_ref()),
            _ => words.push(arg),
        }
    }

    parsed.text = words.join(" ");
    Ok(parsed)
}

async fn run(args: Args) -> Result<()> {
    if args.mode == Mode::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let client = LLMClient::new(&CONFIG)?;

    match args.mode {
        Mode::Models => {
            let models = client.list_models().await?;
            if args.json {
                println!("{}", json!({ "models": models }));
            } else {
                terminal::print_models(&models, client.model());
            }
        }
        Mode::Explain => {
            let outcome = client.explain(&args.text).await?;
            if args.json {
                println!(
                    "{}",
                    json!({
                        "command": outcome.result.command,
                        "explanation": outcome.result.explanation,
                        "tokens_per_second": outcome.tokens_per_second(),
                    })
                );
            } else {
                terminal::print_explanation(&outcome, args.stats);
            }
        }
        Mode::Suggest => {
            let count = args.count.unwrap_or(CONFIG.suggestion_count);
            let outcome = client.suggest(&args.text, count).await?;
            if args.json {
                println!(
                    "{}",
                    json!({
                        "suggestions": outcome.suggestions,
                        "tokens_per_second": outcome.tokens_per_second(),
                    })
                );
            } else {
                terminal::print_suggestions(&outcome, args.stats);
            }
        }
        Mode::Help => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let result = match parse_args(env::args().skip(1)) {
        Ok(args) => run(args).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        terminal::print_error(&e.to_string());
        process::exit(1);
    }
}
