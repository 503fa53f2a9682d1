//! Play command - simulate a full season in the terminal
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: create_season(), play_season()
//! - Level 3: play_week()
//! - Level 4: formatting and printing

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use league_core::{Fixture, Prediction, Season, SeasonConfig, StandingsRow};

use crate::roster::RosterArgs;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    #[command(flatten)]
    pub roster: RosterArgs,

    /// Output the finished season as JSON
    #[arg(long)]
    pub json: bool,
}

/// One simulated week
#[derive(Clone, Debug)]
struct WeekRecord {
    week: u32,
    fixtures: Vec<Fixture>,
    table: Vec<StandingsRow>,
    predictions: Option<Vec<Prediction>>,
}

/// Finished season document
#[derive(Debug, Serialize)]
struct SeasonSummary {
    fixtures: Vec<Fixture>,
    table: Vec<StandingsRow>,
    predictions: Vec<Prediction>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// This function reads like a table of contents:
/// 1. Build an in-memory season
/// 2. Simulate it week by week
/// 3. Report results
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let season = create_season(&args, seed)?;

    let weeks = play_season(&season, !args.json)?;
    let summary = SeasonSummary {
        fixtures: season.fixtures()?,
        table: season.table()?,
        predictions: season.predictions()?,
    };

    tracing::info!("Season complete after {} weeks", weeks.len());

    if args.json {
        print_json_summary(&summary)
    } else {
        print_text_summary(&summary);
        Ok(())
    }
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn create_season(args: &PlayArgs, seed: Option<u64>) -> Result<Season> {
    let names = args.roster.names()?;

    let mut config = SeasonConfig::default();
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }

    Season::in_memory(&names, config).context("Failed to create season")
}

/// Simulate every scheduled week in order, optionally printing each one
fn play_season(season: &Season, verbose: bool) -> Result<Vec<WeekRecord>> {
    season.generate_fixtures()?;
    let last_week = season.last_week()?;

    let mut weeks = Vec::with_capacity(last_week as usize);
    for week in 1..=last_week {
        let record = play_week(season, week)?;
        if verbose {
            print_week(&record);
        }
        weeks.push(record);
    }

    Ok(weeks)
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn play_week(season: &Season, week: u32) -> Result<WeekRecord> {
    let report = season
        .simulate_week(i64::from(week))
        .with_context(|| format!("Failed to simulate week {}", week))?;

    Ok(WeekRecord {
        week,
        fixtures: report.fixtures,
        table: season.table()?,
        predictions: report.predictions,
    })
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn format_result(fixture: &Fixture) -> String {
    match fixture.score() {
        Some((home, away)) => format!(
            "{:>18} {} - {} {}",
            fixture.home.name, home, away, fixture.away.name
        ),
        None => format!("{:>18}   v   {}", fixture.home.name, fixture.away.name),
    }
}

fn format_table(table: &[StandingsRow]) -> Vec<String> {
    let mut lines = vec![format!(
        "{:>3} {:<18} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4}",
        "#", "Team", "P", "W", "D", "L", "GD", "Pts"
    )];
    for (i, row) in table.iter().enumerate() {
        lines.push(format!(
            "{:>3} {:<18} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4}",
            i + 1,
            row.competitor.name,
            row.played,
            row.wins,
            row.draws,
            row.losses,
            row.goal_difference,
            row.points
        ));
    }
    lines
}

fn format_predictions(predictions: &[Prediction]) -> Vec<String> {
    predictions
        .iter()
        .map(|p| {
            format!(
                "{:>3} {:<18} {:>4} pts {:>5.1}%",
                p.predicted_position, p.competitor.name, p.predicted_points, p.prediction_percentage
            )
        })
        .collect()
}

fn print_week(record: &WeekRecord) {
    println!("\n=== Week {} ===", record.week);
    for fixture in &record.fixtures {
        println!("{}", format_result(fixture));
    }
    println!();
    for line in format_table(&record.table) {
        println!("{}", line);
    }
    if let Some(predictions) = &record.predictions {
        println!("\nChampionship predictions:");
        for line in format_predictions(predictions) {
            println!("{}", line);
        }
    }
}

fn print_text_summary(summary: &SeasonSummary) {
    println!("\n=== Final Table ===");
    for line in format_table(&summary.table) {
        println!("{}", line);
    }
    if let Some(champion) = summary.table.first() {
        println!("\nChampions: {} ({} pts)", champion.competitor.name, champion.points);
    }
}

fn print_json_summary(summary: &SeasonSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    println!("{}", json);
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use league_core::DEFAULT_ROSTER;

    fn args(teams: &[&str]) -> PlayArgs {
        PlayArgs {
            roster: RosterArgs {
                teams: teams.iter().map(|t| t.to_string()).collect(),
            },
            json: true,
        }
    }

    #[test]
    fn test_play_season_covers_every_week() {
        let season = create_season(&args(&DEFAULT_ROSTER), Some(3)).unwrap();
        let weeks = play_season(&season, false).unwrap();

        assert_eq!(weeks.len(), 6);
        assert!(weeks.iter().all(|w| w.fixtures.len() == 2));
        assert!(weeks[2].predictions.is_none());
        assert!(weeks[3].predictions.is_some());
        assert!(weeks[5].table.iter().all(|r| r.played == 6));
    }

    #[test]
    fn test_seeded_seasons_repeat() {
        let results = |seed| {
            let season = create_season(&args(&DEFAULT_ROSTER), Some(seed)).unwrap();
            play_season(&season, false).unwrap();
            season
                .fixtures()
                .unwrap()
                .iter()
                .map(|f| f.score())
                .collect::<Vec<_>>()
        };
        assert_eq!(results(8), results(8));
    }

    #[test]
    fn test_summary_serializes() {
        let season = create_season(&args(&DEFAULT_ROSTER), Some(5)).unwrap();
        play_season(&season, false).unwrap();
        let summary = SeasonSummary {
            fixtures: season.fixtures().unwrap(),
            table: season.table().unwrap(),
            predictions: season.predictions().unwrap(),
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["fixtures"].as_array().unwrap().len(), 12);
        assert_eq!(json["table"][0]["played"], 6);
        assert_eq!(json["predictions"].as_array().unwrap().len(), 4);
        assert_eq!(json["predictions"][0]["predicted_position"], 1);
    }

    #[test]
    fn test_two_team_season_has_no_predictions() {
        // two fixtures end the season before the halfway threshold
        let season = create_season(&args(&["Leeds", "Everton"]), Some(5)).unwrap();
        let weeks = play_season(&season, false).unwrap();
        assert_eq!(weeks.len(), 2);
        assert!(season.predictions().unwrap().is_empty());
    }

    #[test]
    fn test_format_result() {
        let season = create_season(&args(&DEFAULT_ROSTER), Some(1)).unwrap();
        let fixtures = season.generate_fixtures().unwrap();
        assert!(format_result(&fixtures[0]).contains("Chelsea   v   Arsenal"));
    }
}
