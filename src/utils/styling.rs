//! Terminal styling utilities

use std::path::Path;
use std::time::Duration;

use console::{style, Emoji};

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
pub static SHIP: Emoji<'_, '_> = Emoji("🚢 ", ">> ");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static DICE: Emoji<'_, '_> = Emoji("🎲 ", "");
pub static TREE: Emoji<'_, '_> = Emoji("🌲 ", "");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    println!();
    println!(
        "    {}{}",
        SHIP,
        style("TITANIC SURVIVAL ANALYSIS").cyan().bold()
    );
    println!(
        "    {}",
        style("Profile, clean, and model who made it to the lifeboats").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Run settings shown in the configuration card
pub struct RunSettings<'a> {
    pub input: &'a Path,
    pub report: &'a Path,
    pub seed: u64,
    pub eval_size: usize,
    pub tree_count: u16,
    pub reduced_formula: &'a str,
}

/// Print configuration card
pub fn print_config(settings: &RunSettings<'_>) {
    let box_width = 60;
    let line = "─".repeat(box_width - 2);

    println!("    ┌{}┐", line);
    println!("    │ {:<width$}│", style("⚙️  Configuration").cyan().bold(), width = box_width - 3);
    println!("    ├{}┤", line);
    println!(
        "    │  {}Input:   {:<44}│",
        FOLDER,
        truncate_path(settings.input, 43)
    );
    println!(
        "    │  {}Report:  {:<44}│",
        SAVE,
        truncate_path(settings.report, 43)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {}Seed: {:<10} Eval rows: {:<20}│",
        DICE,
        style(settings.seed).yellow(),
        style(settings.eval_size).yellow()
    );
    println!(
        "    │  {}Trees: {:<41}│",
        TREE,
        style(settings.tree_count).yellow()
    );
    println!(
        "    │  {}Refined: {:<39}│",
        CHART,
        truncate_string(settings.reduced_formula, 38)
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {}{}", INFO, message);
}

/// Print a warning to stderr
pub fn print_warning(message: &str) {
    eprintln!("    {}{}", WARN, style(message).yellow());
}

/// Print a failure banner to stderr
pub fn print_failure(stage: &str, kind: &str, message: &str) {
    eprintln!();
    eprintln!(
        "    {} {} {}",
        style("✗").red().bold(),
        style(stage).red().bold(),
        style(format!("[{}]", kind)).red()
    );
    eprintln!("      {}", message);
    eprintln!("    {}", style("No report was written.").dim());
}

/// Print the elapsed time of a step
pub fn print_step_time(elapsed: Duration) {
    println!(
        "    {}",
        style(format!("⏱  {:.2}s", elapsed.as_secs_f64())).dim()
    );
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, detail: Option<&str>) {
    match detail {
        Some(info) => println!(
            "      {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        ),
        None => println!("      {} {}", style(count).yellow().bold(), description),
    }
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!("    {}{}", SHIP, style("Analysis complete!").green().bold());
    println!();
}

fn truncate_path(path: &Path, max_len: usize) -> String {
    truncate_string(&path.display().to_string(), max_len)
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
