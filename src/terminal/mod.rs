use colored::*;
use llm_cmd::llm::{ExplainOutcome, SuggestOutcome};

pub fn print_suggestions(outcome: &SuggestOutcome, show_stats: bool) {
    println!();
    for (index, suggestion) in outcome.suggestions.iter().enumerate() {
        println!(
            "{} {}",
            format!("{:>2}.", index + 1).bright_blue(),
            suggestion.command.bright_green()
        );
        if !suggestion.description.is_empty() {
            println!("    {}", suggestion.description.bright_black());
        }
    }
    if show_stats {
        print_stats(
            outcome.tokens_per_second(),
            outcome.metrics.eval_count,
            outcome.elapsed.as_secs_f64(),
        );
    }
}

pub fn print_explanation(outcome: &ExplainOutcome, show_stats: bool) {
    println!("\n{}", outcome.result.command.bright_green());
    println!("{}", outcome.result.explanation);
    if show_stats {
        print_stats(
            outcome.tokens_per_second(),
            outcome.metrics.eval_count,
            outcome.elapsed.as_secs_f64(),
        );
    }
}

pub fn print_models(models: &[String], current: &str) {
    for name in models {
        if name == current {
            println!("{} {}", "*".bright_green(), name.bright_green());
        } else {
            println!("  {}", name);
        }
    }
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "Error:".bright_red(), message);
}

fn print_stats(tokens_per_second: Option<f64>, eval_count: Option<u64>, elapsed_secs: f64) {
    let rate = match tokens_per_second {
        Some(rate) => format!("{:.1} tokens/s", rate),
        None => "n/a tokens/s".to_string(),
    };
    let tokens = eval_count
        .map(|n| format!("{} tokens, ", n))
        .unwrap_or_default();
    println!(
        "\n{}",
        format!("[{}{}, {:.2}s]", tokens, rate, elapsed_secs).bright_black()
    );
}
