//! Terminal output for CLI handlers.
//!
//! Every helper honours two global switches: JSON mode, where each line is
//! a `{"type", "payload"}` object for scripting, and quiet mode, which
//! suppresses everything except warnings, errors and explicit JSON output.

use std::fmt::Display;
use std::sync::OnceLock;

use owo_colors::OwoColorize;
use parking_lot::RwLock;
use serde_json::{json, Value};

/// Output switches taken from the global CLI flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub json: bool,
    pub quiet: bool,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }
}

static SWITCHES: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn switches() -> OutputConfig {
    *SWITCHES.get_or_init(RwLock::default).read()
}

/// Apply the global flags. Call once, before any handler runs.
pub fn configure(config: OutputConfig) {
    *SWITCHES.get_or_init(RwLock::default).write() = config;
}

#[must_use]
pub fn is_json() -> bool {
    switches().json
}

/// Route one line: JSON mode prints `{type, payload}`, otherwise `human`
/// runs unless quiet mode hides this kind of line.
fn emit(kind: &str, payload: Value, always: bool, human: impl FnOnce()) {
    let OutputConfig { json, quiet } = switches();
    if json {
        println!("{}", json!({ "type": kind, "payload": payload }));
    } else if always || !quiet {
        human();
    }
}

/// Print the application name and version.
pub fn header() {
    let version = env!("CARGO_PKG_VERSION");
    emit("header", json!({ "app": "jobsniper", "version": version }), false, || {
        println!("{} {}\n", "jobsniper".bold(), version.dimmed());
    });
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    let value = value.to_string();
    emit("field", json!({ "label": label, "value": &value }), false, || {
        println!("  {:<12} {value}", label.dimmed());
    });
}

pub fn success(message: &str) {
    emit("success", json!({ "message": message }), false, || {
        println!("  {} {message}", "✓".green());
    });
}

pub fn warning(message: &str) {
    emit("warning", json!({ "message": message }), true, || {
        println!("  {} {message}", "⚠".yellow());
    });
}

/// Print an error line to stderr.
pub fn error(message: &str) {
    if is_json() {
        eprintln!("{}", json!({ "type": "error", "payload": { "message": message } }));
    } else {
        eprintln!("  {} {message}", "×".red());
    }
}

pub fn section(title: &str) {
    emit("section", json!({ "title": title }), false, || {
        println!("\n{}", title.bold());
    });
}

/// Print a pre-rendered block (tables) indented. Skipped in JSON mode.
pub fn lines(block: &str) {
    let OutputConfig { json, quiet } = switches();
    if json || quiet {
        return;
    }
    for line in block.lines() {
        println!("  {line}");
    }
}

/// Print a JSON document as-is.
pub fn json_output(value: Value) {
    println!("{value}");
}
