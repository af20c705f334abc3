//! Terminal tables for the profile, the fitted models and the final comparison

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::{
    DatasetProfile, LikelihoodRatioTest, LogisticModel, ModelScore, TransformSummary,
};

fn header(cells: &[&str]) -> Vec<Cell> {
    cells
        .iter()
        .map(|c| Cell::new(c).add_attribute(Attribute::Bold))
        .collect()
}

fn numeric(value: f64, decimals: usize) -> Cell {
    Cell::new(format!("{:.*}", decimals, value)).set_alignment(CellAlignment::Right)
}

fn print_section(icon: &str, title: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

/// Significance stars in the usual R convention
pub fn significance_stars(p_value: f64) -> &'static str {
    if p_value < 0.001 {
        "***"
    } else if p_value < 0.01 {
        "**"
    } else if p_value < 0.05 {
        "*"
    } else if p_value < 0.1 {
        "."
    } else {
        ""
    }
}

/// Numeric summary table (min, quartiles, mean, max, NA)
pub fn numeric_summary_table(profile: &DatasetProfile) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header(&[
        "Column", "Min", "1st Qu.", "Median", "Mean", "3rd Qu.", "Max", "NA's",
    ]));

    for s in &profile.numeric {
        table.add_row(vec![
            Cell::new(&s.column),
            numeric(s.min, 2),
            numeric(s.q1, 2),
            numeric(s.median, 2),
            numeric(s.mean, 2),
            numeric(s.q3, 2),
            numeric(s.max, 2),
            Cell::new(s.missing).fg(if s.missing > 0 { Color::Yellow } else { Color::White }),
        ]);
    }
    table
}

/// Distinct and missing counts for the profiled columns
pub fn column_profile_table(profile: &DatasetProfile) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header(&["Column", "Distinct", "Missing"]));

    for c in &profile.columns {
        table.add_row(vec![
            Cell::new(&c.column),
            Cell::new(c.distinct),
            Cell::new(c.missing).fg(if c.missing > 0 { Color::Yellow } else { Color::White }),
        ]);
    }
    table
}

/// Fare by cabin deck, the evidence behind dropping the cabin feature
pub fn cabin_deck_table(profile: &DatasetProfile) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header(&["Deck", "Passengers", "Mean fare", "Std dev", "Min", "Max"]));

    for d in &profile.cabin_decks {
        table.add_row(vec![
            Cell::new(d.deck),
            Cell::new(d.passengers),
            numeric(d.mean_fare, 2),
            numeric(d.std_fare, 2),
            numeric(d.min_fare, 2),
            numeric(d.max_fare, 2),
        ]);
    }
    table
}

/// Coefficient table in the shape of a GLM summary
pub fn coefficient_table(model: &LogisticModel) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header(&["Term", "Estimate", "Std. Error", "z value", "Pr(>|z|)", ""]));

    for c in &model.coefficients {
        table.add_row(vec![
            Cell::new(&c.term),
            numeric(c.estimate, 5),
            numeric(c.std_error, 5),
            numeric(c.z_value, 3),
            Cell::new(format!("{:.3e}", c.p_value)).set_alignment(CellAlignment::Right),
            Cell::new(significance_stars(c.p_value)).fg(Color::Cyan),
        ]);
    }
    table
}

/// The final comparison: raw match counts per model
pub fn score_table(scores: &[ModelScore]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header(&["Model", "Correct", "Of", "Accuracy"]));

    let best = scores.iter().map(|s| s.matches).max().unwrap_or(0);
    for s in scores {
        let color = if s.matches == best { Color::Green } else { Color::White };
        table.add_row(vec![
            Cell::new(&s.model),
            Cell::new(s.matches).fg(color).add_attribute(Attribute::Bold),
            Cell::new(s.total),
            Cell::new(format!("{:.1}%", s.accuracy * 100.0)).fg(color),
        ]);
    }
    table
}

/// Print the profiler output
pub fn display_profile(profile: &DatasetProfile) {
    print_section("📋", "NUMERIC SUMMARY");
    print_indented(&numeric_summary_table(profile));

    print_section("🔎", "DISTINCT & MISSING VALUES");
    print_indented(&column_profile_table(profile));

    if !profile.cabin_decks.is_empty() {
        print_section("🛏️ ", "FARE BY CABIN DECK");
        print_indented(&cabin_deck_table(profile));
        println!(
            "    {}",
            style("Cabin is dropped: fares overlap across decks and vary widely within them.")
                .dim()
        );
    }
}

/// Print what the transformer did
pub fn display_transform(summary: &TransformSummary) {
    println!(
        "      Imputed {} age(s) with mean {:.2}",
        style(summary.ages_imputed).yellow().bold(),
        summary.age_mean
    );
    println!(
        "      Dropped {} incomplete row(s): {} → {}",
        style(summary.dropped_rows).yellow().bold(),
        summary.input_rows,
        style(summary.output_rows).green().bold()
    );
}

/// Print one fitted logistic model
pub fn display_model(title: &str, model: &LogisticModel) {
    print_section("📈", title);
    println!("    {}", style(model.formula.to_string()).dim());
    print_indented(&coefficient_table(model));
    println!(
        "    Null deviance: {:.2} on {} df   Residual deviance: {:.2} on {} df",
        model.null_deviance, model.df_null, model.deviance, model.df_residual
    );
    println!(
        "    AIC: {:.2}   Fisher scoring iterations: {}",
        model.aic, model.iterations
    );
}

/// Print the likelihood-ratio comparison
pub fn display_likelihood_ratio(test: &LikelihoodRatioTest) {
    print_section("⚖️ ", "LIKELIHOOD-RATIO TEST");
    println!("    Restricted: {}", test.restricted);
    println!("    Full:       {}", test.full);
    println!(
        "    Deviance difference {:.4} on {} df, p = {:.4} {}",
        test.statistic,
        test.df,
        test.p_value,
        significance_stars(test.p_value)
    );
}

/// Print the final model comparison
pub fn display_scores(scores: &[ModelScore]) {
    print_section("🏁", "EVALUATION");
    print_indented(&score_table(scores));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_significance_stars() {
        assert_eq!(significance_stars(0.0001), "***");
        assert_eq!(significance_stars(0.005), "**");
        assert_eq!(significance_stars(0.03), "*");
        assert_eq!(significance_stars(0.07), ".");
        assert_eq!(significance_stars(0.5), "");
    }

    #[test]
    fn test_score_table_lists_each_model() {
        let scores = vec![
            ModelScore::new("Logistic regression", &[1, 1, 0], &[1, 0, 0]).unwrap(),
            ModelScore::new("Random forest", &[1, 0, 0], &[1, 0, 0]).unwrap(),
        ];
        let rendered = score_table(&scores).to_string();
        assert!(rendered.contains("Logistic regression"));
        assert!(rendered.contains("Random forest"));
        assert!(rendered.contains("100.0%"));
    }
}
