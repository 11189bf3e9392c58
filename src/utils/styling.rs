//! Terminal styling for status output
//!
//! Everything here writes to stderr; stdout carries only the metrics block and
//! the importance table.

use std::path::Path;
use std::time::Duration;

use console::{style, Emoji};

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static TARGET: Emoji<'_, '_> = Emoji("🎯 ", "");
pub static SHUFFLE: Emoji<'_, '_> = Emoji("🔀 ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    eprintln!();
    eprintln!(
        "    {} {}",
        style("attrition-pfi").cyan().bold(),
        style(format!("v{}", version)).dim()
    );
    eprintln!(
        "    {}",
        style("Permutation feature importance for employee attrition").dim()
    );
    eprintln!("    {}", style("━".repeat(50)).dim());
}

/// Run settings shown on the configuration card
pub struct ConfigCard<'a> {
    pub input: &'a Path,
    pub label: &'a str,
    pub variant: String,
    pub metric: String,
    pub permutations: usize,
    pub seed: u64,
}

/// Print configuration card
pub fn print_config(card: &ConfigCard<'_>) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);

    eprintln!("    ┌{}┐", line);
    eprintln!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    eprintln!("    ├{}┤", line);
    eprintln!(
        "    │  {} Input:   {:<38}│",
        FOLDER,
        truncate_path(card.input, 37)
    );
    eprintln!(
        "    │  {} Label:   {:<38}│",
        TARGET,
        truncate_string(card.label, 37)
    );
    eprintln!(
        "    │  {} Model:   {:<38}│",
        CHART,
        truncate_string(&format!("{} logistic regression", card.variant), 37)
    );
    eprintln!("    ├{}┤", line);
    eprintln!(
        "    │  {} Metric: {:<10} Permutations: {:<6} Seed: {:<6}│",
        SHUFFLE,
        style(&card.metric).yellow(),
        style(card.permutations).yellow(),
        style(card.seed).yellow()
    );
    eprintln!("    └{}┘", line);
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    eprintln!();
    eprintln!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    eprintln!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("    {} {}", INFO, message);
}

/// Print how long a step took
pub fn print_step_time(elapsed: Duration) {
    eprintln!(
        "      {}",
        style(format!("({:.2}s)", elapsed.as_secs_f64())).dim()
    );
}

/// Print the final completion message
pub fn print_completion() {
    eprintln!();
    eprintln!(
        "    {} {}",
        ROCKET,
        style("Analysis complete!").green().bold()
    );
    eprintln!();
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, detail: Option<&str>) {
    if let Some(info) = detail {
        eprintln!(
            "      {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        eprintln!("      {} {}", style(count).yellow().bold(), description);
    }
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("abcdefghijkl", 8), "...hijkl");
        assert_eq!(truncate_string("abcdefghijkl", 8).chars().count(), 8);
    }

    #[test]
    fn test_truncate_path() {
        let p = Path::new("/very/long/directory/name/attrition.csv");
        let t = truncate_path(p, 16);
        assert!(t.starts_with("..."));
        assert!(t.ends_with("attrition.csv"));
    }
}
