//! Informational command output.

use colored::Colorize;
use mentor_core::session::analytics;
use mentor_core::{HistoryLog, Role};
use mentor_infrastructure::ApiKeyStore;

pub fn print_welcome(model: &str, offset_label: &str) {
    println!(
        "{}",
        "=== Mentor - Python Learning Assistant ===".bright_magenta().bold()
    );
    println!("Model: {} | Clock: {}", model.cyan(), offset_label.cyan());
    println!(
        "{}",
        "Ask anything about Python, or /help for commands.".bright_black()
    );
    println!();
}

pub fn print_help() {
    println!("{}", "Commands".bright_cyan().bold());
    let entries = [
        ("/help", "show this list"),
        ("/examples", "sample questions to get started"),
        ("/topics", "suggested learning topics"),
        ("/run <code>", "execute a Python snippet locally"),
        ("/history", "recent messages in this session"),
        ("/stats", "session statistics and learning progress"),
        ("/time", "session timing"),
        ("/save [name]", "save the session (timestamped name by default)"),
        ("/load [name]", "restore a saved session"),
        ("/clear", "discard history and restart the session"),
        ("/apikey", "API key status; /apikey <service> <key> to store one"),
        ("/quit, /exit", "leave (auto-saves when configured)"),
    ];
    for (command, description) in entries {
        println!("  {:<16} {}", command.cyan(), description);
    }
}

pub fn print_examples() {
    println!("{}", "Try asking".bright_cyan().bold());
    for example in [
        "What is the difference between a list and a tuple?",
        "Show me how to read a CSV file.",
        "Explain list comprehensions with an example.",
        "How do I handle exceptions when opening a file?",
        "Write a small class that models a bank account.",
    ] {
        println!("  - {example}");
    }
}

pub fn print_topics() {
    println!("{}", "Suggested topics".bright_cyan().bold());
    for topic in [
        "basics: variables, types, operators",
        "control flow: if, for, while",
        "data structures: lists, dicts, sets, tuples",
        "functions and modules",
        "object-oriented programming",
        "files and exceptions",
        "the standard library",
        "third-party packages and virtual environments",
    ] {
        println!("  - {topic}");
    }
}

pub fn print_history(log: &HistoryLog) {
    if log.is_empty() {
        println!("{}", "No messages yet.".yellow());
        return;
    }

    let shown = log.len().min(10);
    println!(
        "{}",
        format!("Last {shown} of {} messages:", log.len()).bright_cyan()
    );
    for record in log.records().skip(log.len() - shown) {
        let speaker = match record.role {
            Role::User => "you".green(),
            Role::Assistant => "mentor".blue(),
        };
        let time = record.metadata_str("message_time").unwrap_or("--:--:--");
        let preview: String = record.content.chars().take(80).collect();
        let ellipsis = if record.content.chars().count() > 80 {
            "..."
        } else {
            ""
        };
        println!("  [{}] {}: {}{}", time.bright_black(), speaker, preview, ellipsis);
    }
}

pub fn print_stats(log: &HistoryLog) {
    let stats = analytics::statistics(log);
    let progress = analytics::learning_progress(log);

    println!("{}", "Session statistics".bright_cyan().bold());
    println!(
        "  messages: {} ({} you / {} mentor)",
        stats.total_messages, stats.user_messages, stats.assistant_messages
    );
    println!(
        "  commands: {}   code runs: {}",
        stats.commands_executed, stats.code_executions
    );
    if !stats.topics_covered.is_empty() {
        println!("  topics: {}", stats.topics_covered.join(", "));
    }
    if !stats.difficulty_distribution.is_empty() {
        let rendered: Vec<String> = stats
            .difficulty_distribution
            .iter()
            .map(|(tag, count)| format!("{tag} x{count}"))
            .collect();
        println!("  difficulty: {}", rendered.join(", "));
    }
    match stats.average_response_seconds {
        Some(seconds) => println!("  average response: {seconds:.2}s"),
        None => println!("  average response: n/a"),
    }
    println!(
        "  depth: {} | engagement: {} | hands-on: {}",
        format!("{:?}", progress.depth).to_lowercase(),
        format!("{:?}", progress.engagement).to_lowercase(),
        if progress.hands_on_practice { "yes" } else { "no" }
    );
}

pub fn print_time(log: &HistoryLog) {
    let info = analytics::time_info(log);
    println!("{}", "Session time".bright_cyan().bold());
    println!("  started: {}", info.start_time);
    println!("  now:     {}", info.end_time);
    println!("  elapsed: {} ({})", info.duration_formatted, info.offset_label);
}

pub fn print_key_status(store: &ApiKeyStore) {
    println!("{}", "API keys".bright_cyan().bold());
    for status in store.status() {
        let marker = if status.available {
            "available".green()
        } else {
            "missing".red()
        };
        println!("  {}: {}", status.service, marker);
    }
    println!("  file: {}", store.api_keys_file().display());
    println!(
        "{}",
        "Usage: /apikey <service> <key> to store one.".bright_black()
    );
}
