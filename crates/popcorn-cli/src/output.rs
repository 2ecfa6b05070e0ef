use clap::ValueEnum;
use owo_colors::OwoColorize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

/// User-facing messages, rendered as text or as one JSON object per line
pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        self.emit(Level::Success, msg.as_ref());
    }

    /// Shown even in quiet mode
    pub fn error(&self, msg: impl AsRef<str>) {
        self.emit(Level::Error, msg.as_ref());
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.emit(Level::Info, msg.as_ref());
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.emit(Level::Warning, msg.as_ref());
    }

    pub fn println(&self, msg: impl AsRef<str>) {
        self.emit(Level::Info, msg.as_ref());
    }

    pub fn json(&self, data: &serde_json::Value) {
        if self.quiet {
            return;
        }
        if let Some(line) = self.render_json(data) {
            println!("{}", line);
        }
    }

    fn emit(&self, level: Level, msg: &str) {
        if self.quiet && level != Level::Error {
            return;
        }

        match self.format {
            OutputFormat::Human => {
                let line = human_line(level, msg);
                if level == Level::Error {
                    eprintln!("{}", line);
                } else {
                    println!("{}", line);
                }
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                let value = json!({
                    "type": level.as_str(),
                    "message": msg,
                });
                if let Some(line) = self.render_json(&value) {
                    println!("{}", line);
                }
            }
        }
    }

    fn render_json(&self, data: &serde_json::Value) -> Option<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string(data).ok(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(data).ok(),
            OutputFormat::Human => Some(data.to_string()),
        }
    }
}

fn human_line(level: Level, msg: &str) -> String {
    match level {
        Level::Success => format!("{} {}", "✓".green(), msg),
        Level::Warning => format!("{} {}", "⚠".yellow(), msg),
        Level::Error => format!("{} {}", "✗".red(), msg),
        Level::Info => msg.to_string(),
    }
}
