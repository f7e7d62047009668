use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

use crate::config::Config;
use crate::models::{NormalizedMatch, Sport, SportDetails};
use crate::services::{normalize_tag, try_normalize, DataFetcher, PredictionEngine, PromptContext};

pub async fn show_live(config: &Config, sport_tag: &str, match_id: Option<&str>) -> Result<()> {
    let sport = Sport::from_tag(sport_tag);
    let fetcher = DataFetcher::new(config);

    println!("📡 Fetching live {} data...", sport);

    match match_id {
        Some(id) => {
            let record = fetcher.get_live_match_data(sport, id).await;
            print_match(&record);
        }
        None => {
            let matches = fetcher.get_live_matches(sport).await;
            if matches.is_empty() {
                println!("📭 No {} matches in progress right now.", sport);
                return Ok(());
            }
            println!("🟢 {} live {} match(es):\n", matches.len(), sport);
            for record in &matches {
                print_match(record);
                println!();
            }
        }
    }

    Ok(())
}

pub async fn predict(
    config: &Config,
    sport_tag: &str,
    match_id: &str,
    prediction_type: &str,
    recent_form: Option<&str>,
) -> Result<()> {
    let sport = Sport::from_tag(sport_tag);
    let fetcher = DataFetcher::new(config);
    let engine = PredictionEngine::new(config);

    if !engine.is_configured() {
        println!("❌ OPENAI_API_KEY is not set. Add it to your environment or .env file.");
        return Ok(());
    }

    println!("🔮 Generating {} prediction for match {}...", sport, match_id);

    let record = fetcher.get_live_match_data(sport, match_id).await;
    print_match(&record);

    let context = PromptContext {
        prediction_type: Some(prediction_type),
        recent_form,
    };
    let prediction = engine.generate_prediction(&record, &context).await?;

    println!("\n🎯 Prediction:\n{}", prediction.prediction);
    println!("\n   Confidence: {:.1}%", prediction.confidence * 100.0);
    println!("   Generated at: {}", prediction.timestamp.format("%Y-%m-%d %H:%M:%S"));

    Ok(())
}

/// Normalize a saved scoreboard payload without touching the network.
pub async fn normalize_file(sport_tag: &str, path: &Path) -> Result<()> {
    let sport = Sport::from_tag(sport_tag);
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let payload: Value = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {} as JSON", path.display()))?;

    if let Err(e) = try_normalize(sport, &payload) {
        println!("⚠️  {}; showing the {} fallback record", e, sport);
    }

    let record = normalize_tag(sport_tag, &payload);
    println!("{}", serde_json::to_string_pretty(&record)?);

    Ok(())
}

fn print_match(record: &NormalizedMatch) {
    println!(
        "{} vs {} [{}] | {} | {}",
        record.home_team, record.away_team, record.match_id, record.score, record.time
    );

    match &record.details {
        SportDetails::Soccer { possession, shots_on_target } => {
            println!("   Possession: {}% - {}%", possession.home, possession.away);
            println!("   Shots on target: {} - {}", shots_on_target.home, shots_on_target.away);
        }
        SportDetails::Basketball { period, statistics } => {
            println!("   Period: {}", period);
            println!(
                "   FG / REB / AST: {}/{}/{} - {}/{}/{}",
                statistics.home.field_goals,
                statistics.home.rebounds,
                statistics.home.assists,
                statistics.away.field_goals,
                statistics.away.rebounds,
                statistics.away.assists
            );
        }
        SportDetails::Tennis { set, statistics } => {
            println!("   Set: {}", set);
            println!(
                "   Aces: {} - {} | Double faults: {} - {} | 1st serve: {:.1}% - {:.1}%",
                statistics.home.aces,
                statistics.away.aces,
                statistics.home.double_faults,
                statistics.away.double_faults,
                statistics.home.first_serve_pct,
                statistics.away.first_serve_pct
            );
        }
    }
}
