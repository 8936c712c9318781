//! Search command - ranked destination matches for a query

use std::path::Path;

use anyhow::Result;
use colored::{ColoredString, Colorize};
use unicode_width::UnicodeWidthStr;

use crate::catalog::BudgetTier;
use crate::error::PlannerError;
use crate::search::aspect::{Aspect, AspectWeights};
use crate::search::engine::{ScoredResult, SearchFilters, TripPlanner};

#[allow(clippy::too_many_arguments)]
pub fn run(
    query: &str,
    top: usize,
    weights: &[String],
    country: Option<String>,
    budget: Option<String>,
    season: Option<String>,
    index: &Path,
    json: bool,
) -> Result<()> {
    // Reject bad weight and filter input before touching the index.
    let weights = AspectWeights::parse_args(weights)?;
    let filters = SearchFilters {
        country,
        budget: budget.as_deref().map(|s| s.parse::<BudgetTier>()).transpose()?,
        season,
    };

    let planner = match TripPlanner::open(index) {
        Ok(planner) => planner,
        Err(PlannerError::IndexUnavailable(path)) => {
            eprintln!(
                "{} No search index at {}. Run {} first.",
                "!".yellow().bold(),
                path.display(),
                "wayfinder build".cyan()
            );
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    let results = planner.search(query, &weights, top, &filters)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!(
            "{} No destinations matched your filters for: {}",
            "→".dimmed(),
            query.cyan()
        );
        return Ok(());
    }

    println!(
        "{} {} results for: {}",
        "→".dimmed(),
        results.len(),
        query.cyan()
    );
    println!();
    print_table(&results);
    print_top_match(&results[0]);

    Ok(())
}

fn print_table(results: &[ScoredResult]) {
    let name_width = column_width("Destination", results.iter().map(|r| r.name.as_str()));
    let location_width = column_width("Location", results.iter().map(|r| r.location.as_str()));
    let budget_width = column_width("Budget", results.iter().map(|r| r.budget.as_str()));

    println!(
        "{}  {}  {}  {}  {}",
        "Rank".bold(),
        pad("Destination", name_width).bold(),
        pad("Location", location_width).bold(),
        pad("Budget", budget_width).bold(),
        "Score".bold()
    );

    for result in results {
        println!(
            "{}  {}  {}  {}  {}",
            pad(&result.rank.to_string(), 4),
            pad(&result.name, name_width).cyan(),
            pad(&result.location, location_width),
            pad(result.budget.as_str(), budget_width),
            score_colored(result.combined_score)
        );
    }
}

fn print_top_match(top: &ScoredResult) {
    println!();
    println!(
        "{} {}",
        "Top match:".bold().green(),
        top.name.cyan().bold()
    );
    println!("  {}", top.explanation);
    println!();
    for aspect in Aspect::ALL {
        println!(
            "  {}  {}",
            pad(aspect.as_str(), 10),
            score_colored(top.aspect_scores.get(aspect))
        );
    }
    println!("  {}  {}", pad("combined", 10), score_colored(top.combined_score));

    if !top.matched_phrases.is_empty() {
        println!();
        for phrase in &top.matched_phrases {
            println!("  {} {}", "•".dimmed(), phrase.dimmed());
        }
    }
}

/// Width of a column: the widest cell or the header, whichever is
/// larger. Display width, not byte length.
fn column_width<'a>(header: &str, cells: impl Iterator<Item = &'a str>) -> usize {
    cells
        .map(UnicodeWidthStr::width)
        .chain(std::iter::once(header.width()))
        .max()
        .unwrap_or(0)
}

fn pad(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(padding))
}

fn score_colored(score: f32) -> ColoredString {
    let text = format!("{score:.3}");
    if score > 0.8 {
        text.green()
    } else if score > 0.6 {
        text.yellow()
    } else {
        text.dimmed()
    }
}
