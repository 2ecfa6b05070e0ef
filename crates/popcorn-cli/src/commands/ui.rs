use crate::output::{Output, OutputFormat};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Loading indicator shown while a request is in flight
///
/// Only drawn for human output on a terminal; otherwise progress goes to the
/// structured log.
pub struct LoadingSpinner {
    bar: Option<ProgressBar>,
}

impl LoadingSpinner {
    pub fn start(message: impl Into<String>, output: &Output) -> Self {
        let message = message.into();
        if !is_interactive() || output.is_quiet() || output.format() != OutputFormat::Human {
            tracing::info!(operation = "progress", message = %message, "Loading");
            return Self { bar: None };
        }

        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .map(|style| style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"))
        {
            bar.set_style(style);
        }
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar: Some(bar) }
    }

    pub fn finish(self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl Drop for LoadingSpinner {
    fn drop(&mut self) {
        if let Some(bar) = &self.bar {
            if !bar.is_finished() {
                bar.finish_and_clear();
            }
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}

/// Table with the rounded UTF-8 style used by every listing
pub fn new_table(header: Vec<comfy_table::Cell>) -> comfy_table::Table {
    let mut table = comfy_table::Table::new();
    table.set_header(header);
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

pub fn header_cell(text: &str) -> comfy_table::Cell {
    comfy_table::Cell::new(text)
        .fg(comfy_table::Color::Cyan)
        .add_attribute(comfy_table::Attribute::Bold)
}
