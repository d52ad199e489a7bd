//! Interactive session loop.

use std::borrow::Cow::{self, Borrowed, Owned};

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use mentor_core::{AssistantConfig, Clock, HistoryLog, Metadata, Role, SessionRepository};
use mentor_infrastructure::ApiKeyStore;
use mentor_interaction::{ChatProvider, ToolCallRequest};

use crate::code_runner;
use crate::commands;
use crate::highlight;
use crate::tagger;

const COMMANDS: &[&str] = &[
    "/help", "/quit", "/exit", "/clear", "/save", "/load", "/history", "/stats", "/time",
    "/apikey", "/examples", "/topics", "/run",
];

/// Line-editor helper: slash-command completion, hints, and input coloring.
///
/// Commands only ever occupy the first whitespace-delimited token, so all
/// three behaviors bail out as soon as the cursor is past a space.
struct MentorHelper;

impl Helper for MentorHelper {}

impl Completer for MentorHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        if !prefix.starts_with('/') || prefix.contains(' ') {
            return Ok((pos, Vec::new()));
        }

        let candidates = COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(prefix))
            .map(|cmd| Pair {
                display: (*cmd).to_string(),
                replacement: (*cmd).to_string(),
            })
            .collect();
        // Replacement spans the whole command token, which starts at the
        // leading slash.
        Ok((0, candidates))
    }
}

impl Highlighter for MentorHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if !line.starts_with('/') {
            return Borrowed(line);
        }
        // Color the command token only; arguments stay plain.
        let end = line.find(' ').unwrap_or(line.len());
        let (command, args) = line.split_at(end);
        Owned(format!("{}{args}", command.bright_cyan()))
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, line: &str, _pos: usize, _forced: bool) -> bool {
        line.starts_with('/')
    }
}

impl Hinter for MentorHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        // Only hint at the end of a bare command token.
        if pos < line.len() || !line.starts_with('/') || line.contains(' ') {
            return None;
        }
        COMMANDS
            .iter()
            .find(|cmd| cmd.len() > line.len() && cmd.starts_with(line))
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for MentorHelper {}

/// The interactive assistant session.
pub struct Repl {
    editor: Editor<MentorHelper, DefaultHistory>,
    config: AssistantConfig,
    log: HistoryLog,
    provider: Box<dyn ChatProvider>,
    repository: Box<dyn SessionRepository>,
    api_keys: ApiKeyStore,
}

impl Repl {
    pub fn new(
        config: AssistantConfig,
        provider: Box<dyn ChatProvider>,
        repository: Box<dyn SessionRepository>,
        api_keys: ApiKeyStore,
    ) -> Result<Self> {
        let clock = Clock::new(config.timezone.as_deref());
        let log = HistoryLog::new(config.max_history, clock);

        let mut editor = Editor::new()?;
        editor.set_helper(Some(MentorHelper));

        Ok(Self {
            editor,
            config,
            log,
            provider,
            repository,
            api_keys,
        })
    }

    /// Reads lines until quit or EOF, then auto-saves if configured.
    pub async fn run(&mut self) -> Result<()> {
        commands::print_welcome(&self.config.model, self.log.clock().offset_label());

        loop {
            match self.editor.readline(">>> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(&line);

                    if trimmed.starts_with('/') {
                        if !self.handle_command(trimmed).await {
                            break;
                        }
                    } else {
                        self.chat_turn(trimmed).await;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "Interrupted. /quit to exit.".yellow());
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("{}", format!("Input error: {err:?}").red());
                    break;
                }
            }
        }

        if self.config.auto_save_sessions && self.log.len() > 1 {
            self.save_session(None).await;
        }
        println!("{}", "Goodbye! Keep practicing.".bright_green());
        Ok(())
    }

    /// Dispatches a slash command. Returns false when the session should end.
    async fn handle_command(&mut self, input: &str) -> bool {
        let (command, rest) = match input.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (input, ""),
        };

        match command {
            "/quit" | "/exit" => return false,
            "/help" => commands::print_help(),
            "/examples" => commands::print_examples(),
            "/topics" => commands::print_topics(),
            "/history" => commands::print_history(&self.log),
            "/stats" => commands::print_stats(&self.log),
            "/time" => commands::print_time(&self.log),
            "/apikey" => self.apikey_command(rest),
            "/clear" => {
                self.log = HistoryLog::new(self.config.max_history, self.log.clock().clone());
                println!("{}", "History cleared; session restarted.".green());
            }
            "/save" => {
                let filename = (!rest.is_empty()).then_some(rest);
                self.save_session(filename).await;
            }
            "/load" => self.load_command(rest).await,
            "/run" => self.run_command(rest).await,
            _ => println!(
                "{}",
                format!("Unknown command: {command}. /help lists commands.").yellow()
            ),
        }
        true
    }

    async fn chat_turn(&mut self, input: &str) {
        self.log.append(Role::User, input, tagger::tag_user_turn(input));
        println!("{}", "thinking...".bright_black());

        let window = self.log.context_window(self.config.context_length);
        let outcome = self
            .provider
            .complete(self.config.system_prompt(), &window)
            .await;
        match outcome {
            Ok(outcome) => {
                if let Some(text) = outcome.text {
                    println!("{}", highlight::render_markdown(&text));
                    self.log.append(Role::Assistant, text, None);
                }
                for call in outcome.tool_calls {
                    self.handle_tool_call(call).await;
                }
            }
            Err(e) => eprintln!("{}", format!("Request failed: {e}").red()),
        }
    }

    async fn handle_tool_call(&mut self, call: ToolCallRequest) {
        match call.name.as_str() {
            "code_runner" => {
                let Some(code) = call.string_argument("code") else {
                    tracing::warn!("code_runner call without a code argument");
                    return;
                };
                println!("{}", "Running example:".bright_cyan());
                println!("{}", highlight::highlight_code(code));
                let output = code_runner::run_snippet(code, self.config.code_timeout_secs).await;
                println!("{}", "--- output ---".bright_black());
                println!("{output}");

                let mut metadata = Metadata::new();
                let _ = metadata.insert("code_execution".to_string(), true.into());
                let _ = metadata.insert("tool".to_string(), "code_runner".into());
                self.log.append(
                    Role::Assistant,
                    format!("Executed example:\n{code}\nOutput:\n{output}"),
                    Some(metadata),
                );
            }
            "web_search" => {
                let query = call.string_argument("query").unwrap_or("(no query)");
                println!(
                    "{}",
                    format!("(web search requested for '{query}'; not available in this build)")
                        .bright_black()
                );
            }
            other => tracing::debug!("ignoring unsupported tool call: {other}"),
        }
    }

    /// Runs a snippet the user typed directly, recording it as a command
    /// turn so the session statistics reflect hands-on practice.
    async fn run_command(&mut self, code: &str) {
        if code.is_empty() {
            println!("{}", "Usage: /run <python code>".yellow());
            return;
        }

        let mut metadata = Metadata::new();
        let _ = metadata.insert("command".to_string(), true.into());
        let _ = metadata.insert("code_execution".to_string(), true.into());
        self.log
            .append(Role::User, format!("/run {code}"), Some(metadata));

        println!("{}", highlight::highlight_code(code));
        let output = code_runner::run_snippet(code, self.config.code_timeout_secs).await;
        println!("{}", "--- output ---".bright_black());
        println!("{output}");
    }

    async fn save_session(&mut self, filename: Option<&str>) {
        if self.log.is_empty() {
            println!("{}", "Nothing to save yet.".yellow());
            return;
        }
        match self.repository.save(&self.log, filename).await {
            Ok(path) => println!("{}", format!("Session saved to {}", path.display()).green()),
            Err(e) => eprintln!("{}", format!("Save failed: {e}").red()),
        }
    }

    async fn load_command(&mut self, rest: &str) {
        if !rest.is_empty() {
            self.load_session(rest).await;
            return;
        }

        let sessions = match self.repository.list().await {
            Ok(sessions) => sessions,
            Err(e) => {
                eprintln!("{}", format!("Could not list sessions: {e}").red());
                return;
            }
        };
        if sessions.is_empty() {
            println!("{}", "No saved sessions yet.".yellow());
            return;
        }

        println!("{}", "Saved sessions:".bright_cyan());
        for (index, info) in sessions.iter().enumerate() {
            println!(
                "  {}. {} ({} messages, started {})",
                index + 1,
                info.filename,
                info.message_count,
                info.start_time
            );
        }

        let Ok(choice) = self.editor.readline("load which? ") else {
            return;
        };
        let choice = choice.trim();
        if choice.is_empty() {
            return;
        }
        let source = match choice.parse::<usize>() {
            Ok(n) if n >= 1 && n <= sessions.len() => sessions[n - 1].filename.clone(),
            _ => choice.to_string(),
        };
        self.load_session(&source).await;
    }

    /// Replaces the live log with a stored session, keeping its original
    /// start anchor so elapsed times stay continuous.
    pub async fn load_session(&mut self, source: &str) {
        match self.repository.load(source).await {
            Ok(saved) => {
                let count = saved.records.len();
                self.log = HistoryLog::from_records(
                    self.config.max_history,
                    self.log.clock().clone(),
                    saved.session_start,
                    saved.records,
                );
                println!(
                    "{}",
                    format!(
                        "Loaded {count} messages (recorded duration: {})",
                        saved.duration_formatted
                    )
                    .green()
                );
            }
            Err(e) => eprintln!("{}", format!("Load failed: {e}").red()),
        }
    }

    fn apikey_command(&self, rest: &str) {
        let mut parts = rest.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some(service), Some(key)) => match self.api_keys.save_key(service, key) {
                Ok(()) => println!("{}", format!("Saved {service} key.").green()),
                Err(e) => eprintln!("{}", format!("{e}").red()),
            },
            (Some(_), None) => println!("{}", "Usage: /apikey [<service> <key>]".yellow()),
            (None, _) => commands::print_key_status(&self.api_keys),
        }
    }
}
