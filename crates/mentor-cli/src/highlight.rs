//! Naive Python syntax highlighting for terminal output.
//!
//! Cosmetic only: one regex pass per line, no parser state carried across
//! lines. Comments and strings come first in the alternation, so a keyword
//! inside either is swallowed by the enclosing token.

use colored::Colorize;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?x)
        (?P<comment>\#.*)
        | (?P<string>"[^"\n]*"|'[^'\n]*')
        | (?P<keyword>\b(?:False|None|True|and|as|assert|async|await|break
            |class|continue|def|del|elif|else|except|finally|for|from|global
            |if|import|in|is|lambda|nonlocal|not|or|pass|raise|return|try
            |while|with|yield)\b)
        | (?P<builtin>\b(?:abs|dict|enumerate|filter|float|input|int
            |isinstance|len|list|map|max|min|open|print|range|round|set
            |sorted|str|sum|tuple|type|zip)\b)
        "#,
    )
    .expect("token pattern is valid")
});

/// Highlights a standalone snippet, line by line.
pub fn highlight_code(source: &str) -> String {
    source
        .lines()
        .map(highlight_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders assistant output: prose passes through untouched, fenced code
/// blocks are highlighted, and the fence lines themselves are dimmed.
pub fn render_markdown(text: &str) -> String {
    let mut rendered = Vec::new();
    let mut in_code_block = false;
    for line in text.lines() {
        if line.trim_start().starts_with("```") {
            in_code_block = !in_code_block;
            rendered.push(line.bright_black().to_string());
        } else if in_code_block {
            rendered.push(highlight_line(line));
        } else {
            rendered.push(line.to_string());
        }
    }
    rendered.join("\n")
}

fn highlight_line(line: &str) -> String {
    TOKEN_RE.replace_all(line, paint).into_owned()
}

fn paint(caps: &Captures) -> String {
    if let Some(m) = caps.name("comment") {
        m.as_str().bright_black().to_string()
    } else if let Some(m) = caps.name("string") {
        m.as_str().green().to_string()
    } else if let Some(m) = caps.name("keyword") {
        m.as_str().blue().bold().to_string()
    } else if let Some(m) = caps.name("builtin") {
        m.as_str().cyan().to_string()
    } else {
        caps[0].to_string()
    }
}
