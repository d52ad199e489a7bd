//! Lightweight metadata tagging for user turns.
//!
//! A contains-match over lowercased input; first listed topic wins. The
//! tags feed the session statistics and learning-progress classification,
//! so a miss costs nothing beyond a less informative `/stats`.

use mentor_core::Metadata;

const TOPICS: &[(&str, &[&str])] = &[
    ("variables", &["variable", "assignment", "data type"]),
    ("strings", &["string", "f-string", "format"]),
    ("lists", &["list", "tuple", "slice"]),
    ("dicts", &["dict", "dictionary", "mapping"]),
    ("functions", &["function", "argument", "parameter", "lambda"]),
    ("classes", &["class", "object-oriented", "oop", "inheritance"]),
    ("files", &["file", "csv", "json"]),
    ("exceptions", &["exception", "error handling", "try", "except"]),
    ("modules", &["module", "import", "package", "pip"]),
    ("async", &["async", "await", "coroutine"]),
    ("loops", &["loop", "iterate", "while"]),
];

const ADVANCED: &[&str] = &[
    "decorator",
    "metaclass",
    "asyncio",
    "coroutine",
    "generator",
    "threading",
    "multiprocessing",
    "gil",
    "descriptor",
];

const INTERMEDIATE: &[&str] = &[
    "comprehension",
    "inheritance",
    "closure",
    "iterator",
    "context manager",
    "typing",
];

const BEGINNER: &[&str] = &["what is", "how do i", "basics", "beginner", "hello world"];

/// Derives `topic` and `difficulty` tags from a user turn, or `None` when
/// nothing matched.
pub fn tag_user_turn(input: &str) -> Option<Metadata> {
    let lower = input.to_lowercase();
    let mut metadata = Metadata::new();

    if let Some(topic) = detect_topic(&lower) {
        let _ = metadata.insert("topic".to_string(), topic.into());
    }
    if let Some(difficulty) = detect_difficulty(&lower) {
        let _ = metadata.insert("difficulty".to_string(), difficulty.into());
    }

    (!metadata.is_empty()).then_some(metadata)
}

fn detect_topic(lower: &str) -> Option<&'static str> {
    TOPICS
        .iter()
        .find(|(_, cues)| cues.iter().any(|cue| lower.contains(cue)))
        .map(|(topic, _)| *topic)
}

fn detect_difficulty(lower: &str) -> Option<&'static str> {
    if ADVANCED.iter().any(|cue| lower.contains(cue)) {
        Some("advanced")
    } else if INTERMEDIATE.iter().any(|cue| lower.contains(cue)) {
        Some("intermediate")
    } else if BEGINNER.iter().any(|cue| lower.contains(cue)) {
        Some("beginner")
    } else {
        None
    }
}
