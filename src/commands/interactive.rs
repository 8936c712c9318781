//! Interactive command - REPL search session

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::error::PlannerError;
use crate::search::aspect::AspectWeights;
use crate::search::engine::{SearchFilters, TripPlanner};

const RESULTS_PER_QUERY: usize = 3;

pub fn run(index: &Path) -> Result<()> {
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

    println!("{}", "Wayfinder - Interactive Mode".bold().green());
    println!(
        "{}",
        format!(
            "{} destinations loaded. Type 'quit' or 'exit' to end the session.",
            planner.destination_count()
        )
        .dimmed()
    );

    let stdin = io::stdin();
    let weights = AspectWeights::default();
    let filters = SearchFilters::none();

    loop {
        print!("\n{} ", "What kind of destination are you looking for?".cyan());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();

        if query.is_empty() {
            continue;
        }
        if matches!(query.to_lowercase().as_str(), "quit" | "exit" | "q") {
            println!("{}", "Happy travels!".bold().green());
            break;
        }

        match planner.search(query, &weights, RESULTS_PER_QUERY, &filters) {
            Ok(results) if results.is_empty() => {
                println!("{}", "No results found. Try a different query.".yellow());
            }
            Ok(results) => {
                for result in results {
                    println!(
                        "\n{}. {} - {}",
                        result.rank.to_string().bold(),
                        result.name.cyan().bold(),
                        result.location
                    );
                    println!(
                        "   Score: {} | {}",
                        format!("{:.3}", result.combined_score).green(),
                        result.budget
                    );
                    println!("   {}", result.explanation.dimmed());
                }
            }
            Err(err) => {
                eprintln!("{} {}", "Error:".red().bold(), err);
            }
        }
    }

    Ok(())
}
