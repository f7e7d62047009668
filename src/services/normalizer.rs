//! Maps raw scoreboard payloads into [`NormalizedMatch`] records.
//!
//! Normalization is total: a payload either maps cleanly or the fixed
//! fallback record for the sport is returned. Missing leaf statistics are
//! zeroed individually and never cause a fallback.

use serde_json::Value;
use thiserror::Error;

use crate::models::{BasketballStats, NormalizedMatch, SidePair, Sport, SportDetails, TennisStats};
use crate::utils::{display_value, value_as_f64, value_as_u32};

/// `status.type.state` of an event that is currently being played.
pub const LIVE_STATE: &str = "in";
pub const DEFAULT_CLOCK: &str = "0:00";
pub const DEFAULT_SCORE: &str = "0";
pub const DEFAULT_PERIOD: u32 = 1;
pub const TENNIS_SCORE_FALLBACK: &str = "0-0";

/// The feed carries no possession figures.
const EVEN_POSSESSION: SidePair<u32> = SidePair { home: 50, away: 50 };

#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("feed contains no events")]
    EmptyFeed,

    #[error("no in-progress event in feed")]
    NoLiveEvent,

    #[error("malformed event structure: {0}")]
    MalformedStructure(String),
}

#[derive(Debug, Error, PartialEq)]
#[error("cannot format tennis score: {0}")]
pub struct ScoreFormatError(String);

type Extractor = fn(&Value) -> Result<NormalizedMatch, NormalizeError>;

fn extractor(sport: Sport) -> Extractor {
    match sport {
        Sport::Soccer => extract_soccer,
        Sport::Basketball => extract_basketball,
        Sport::Tennis => extract_tennis,
    }
}

/// Normalize the first live event of `payload`, or return the fallback record.
pub fn normalize(sport: Sport, payload: &Value) -> NormalizedMatch {
    match try_normalize(sport, payload) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!("Using {} fallback record: {}", sport, e);
            fallback_match(sport)
        }
    }
}

/// Same as [`normalize`] for a free-form sport tag. Unknown tags are treated as soccer.
pub fn normalize_tag(tag: &str, payload: &Value) -> NormalizedMatch {
    normalize(Sport::from_tag(tag), payload)
}

pub fn try_normalize(sport: Sport, payload: &Value) -> Result<NormalizedMatch, NormalizeError> {
    let events = events(payload).ok_or(NormalizeError::EmptyFeed)?;
    let event = events
        .iter()
        .find(|e| is_live(e))
        .ok_or(NormalizeError::NoLiveEvent)?;

    extractor(sport)(event)
}

/// Every live event in feed order. Malformed events are skipped; no fallback is inserted.
pub fn normalize_live(sport: Sport, payload: &Value) -> Vec<NormalizedMatch> {
    let Some(events) = events(payload) else {
        return Vec::new();
    };

    let extract = extractor(sport);
    events
        .iter()
        .filter(|e| is_live(e))
        .filter_map(|event| match extract(event) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(
                    "Skipping {} event {}: {}",
                    sport,
                    event["id"].as_str().unwrap_or("?"),
                    e
                );
                None
            }
        })
        .collect()
}

fn events(payload: &Value) -> Option<&Vec<Value>> {
    payload
        .get("events")
        .and_then(Value::as_array)
        .filter(|events| !events.is_empty())
}

fn is_live(event: &Value) -> bool {
    event.pointer("/status/type/state").and_then(Value::as_str) == Some(LIVE_STATE)
}

// ── Event access ────────────────────────────────────────────────────────────

struct EventView<'a> {
    event: &'a Value,
    home: &'a Value,
    away: &'a Value,
}

impl<'a> EventView<'a> {
    fn new(event: &'a Value) -> Result<Self, NormalizeError> {
        let competitors = event
            .pointer("/competitions/0/competitors")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                NormalizeError::MalformedStructure("missing competitions[0].competitors".to_string())
            })?;

        match competitors.as_slice() {
            [home, away, ..] => Ok(Self { event, home, away }),
            other => Err(NormalizeError::MalformedStructure(format!(
                "expected two competitors, found {}",
                other.len()
            ))),
        }
    }

    fn match_id(&self) -> String {
        self.event
            .get("id")
            .and_then(display_value)
            .unwrap_or_default()
    }

    fn clock(&self) -> String {
        self.event
            .pointer("/status/displayClock")
            .and_then(display_value)
            .unwrap_or_else(|| DEFAULT_CLOCK.to_string())
    }

    fn period(&self) -> u32 {
        self.event
            .pointer("/status/period")
            .and_then(value_as_u32)
            .unwrap_or(DEFAULT_PERIOD)
    }

    fn per_side<T>(&self, read: impl Fn(&Value) -> T) -> SidePair<T> {
        SidePair::new(read(self.home), read(self.away))
    }

    fn names(&self, pointer: &str) -> Result<(String, String), NormalizeError> {
        let name = |competitor: &Value, side: &str| {
            competitor
                .pointer(pointer)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    NormalizeError::MalformedStructure(format!("{} competitor has no {}", side, pointer))
                })
        };
        Ok((name(self.home, "home")?, name(self.away, "away")?))
    }

    fn score_line(&self) -> String {
        format!("{} - {}", competitor_score(self.home), competitor_score(self.away))
    }
}

fn competitor_score(competitor: &Value) -> String {
    competitor
        .get("score")
        .and_then(display_value)
        .unwrap_or_else(|| DEFAULT_SCORE.to_string())
}

/// Look up a named statistic for a competitor.
///
/// `statistics[0]` is read as a flat object first. ESPN also ships
/// statistics as a list of `{name, value, displayValue}` entries, which is
/// searched when the flat lookup misses.
fn stat_value<'a>(competitor: &'a Value, key: &str) -> Option<&'a Value> {
    let stats = competitor.get("statistics")?.as_array()?;

    if let Some(value) = stats.first().and_then(|first| first.get(key)) {
        return Some(value);
    }

    stats
        .iter()
        .find(|entry| entry.get("name").and_then(Value::as_str) == Some(key))
        .and_then(|entry| entry.get("value").or_else(|| entry.get("displayValue")))
}

fn stat_u32(competitor: &Value, key: &str) -> u32 {
    stat_value(competitor, key).and_then(value_as_u32).unwrap_or(0)
}

fn stat_f64(competitor: &Value, key: &str) -> f64 {
    stat_value(competitor, key).and_then(value_as_f64).unwrap_or(0.0)
}

// ── Per-sport extractors ────────────────────────────────────────────────────

fn extract_soccer(event: &Value) -> Result<NormalizedMatch, NormalizeError> {
    let view = EventView::new(event)?;
    let (home_team, away_team) = view.names("/team/name")?;

    Ok(NormalizedMatch {
        match_id: view.match_id(),
        home_team,
        away_team,
        score: view.score_line(),
        time: view.clock(),
        details: SportDetails::Soccer {
            possession: EVEN_POSSESSION,
            shots_on_target: view.per_side(|c| stat_u32(c, "shotsOnTarget")),
        },
    })
}

fn extract_basketball(event: &Value) -> Result<NormalizedMatch, NormalizeError> {
    let view = EventView::new(event)?;
    let (home_team, away_team) = view.names("/team/name")?;

    Ok(NormalizedMatch {
        match_id: view.match_id(),
        home_team,
        away_team,
        score: view.score_line(),
        time: view.clock(),
        details: SportDetails::Basketball {
            period: view.period(),
            statistics: view.per_side(|c| BasketballStats {
                field_goals: stat_u32(c, "fieldGoalsMade"),
                rebounds: stat_u32(c, "rebounds"),
                assists: stat_u32(c, "assists"),
            }),
        },
    })
}

fn extract_tennis(event: &Value) -> Result<NormalizedMatch, NormalizeError> {
    let view = EventView::new(event)?;
    let (home_player, away_player) = view.names("/athlete/displayName")?;

    let score = format_tennis_score(view.home, view.away).unwrap_or_else(|e| {
        tracing::error!("{}", e);
        TENNIS_SCORE_FALLBACK.to_string()
    });

    Ok(NormalizedMatch {
        match_id: view.match_id(),
        home_team: home_player,
        away_team: away_player,
        score,
        time: view.clock(),
        details: SportDetails::Tennis {
            set: view.period(),
            statistics: view.per_side(|c| TennisStats {
                aces: stat_u32(c, "aces"),
                double_faults: stat_u32(c, "doubleFaults"),
                first_serve_pct: stat_f64(c, "firstServePercent"),
            }),
        },
    })
}

/// `"<home>-<away> (<set>, <set>, …)"`, one set token per index both sides have.
pub fn format_tennis_score(home: &Value, away: &Value) -> Result<String, ScoreFormatError> {
    let home_sets = line_scores(home)?;
    let away_sets = line_scores(away)?;

    let sets = home_sets
        .iter()
        .zip(away_sets)
        .map(|(h, a)| -> Result<String, ScoreFormatError> {
            Ok(format!("{}-{}", line_value(h)?, line_value(a)?))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(format!(
        "{}-{} ({})",
        competitor_score(home),
        competitor_score(away),
        sets.join(", ")
    ))
}

fn line_scores(competitor: &Value) -> Result<&[Value], ScoreFormatError> {
    match competitor.get("linescores") {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(sets)) => Ok(sets.as_slice()),
        Some(other) => Err(ScoreFormatError(format!("linescores is not a list: {}", other))),
    }
}

fn line_value(entry: &Value) -> Result<String, ScoreFormatError> {
    if !entry.is_object() {
        return Err(ScoreFormatError(format!("line score entry is not an object: {}", entry)));
    }
    Ok(entry
        .get("value")
        .and_then(display_value)
        .unwrap_or_else(|| DEFAULT_SCORE.to_string()))
}

// ── Fallback records ────────────────────────────────────────────────────────

pub const FALLBACK_MATCH_ID: &str = "test_match";

/// Fixed record returned whenever a payload cannot be normalized.
pub fn fallback_match(sport: Sport) -> NormalizedMatch {
    match sport {
        Sport::Soccer => NormalizedMatch {
            match_id: FALLBACK_MATCH_ID.to_string(),
            home_team: "Test Home Team".to_string(),
            away_team: "Test Away Team".to_string(),
            score: "2 - 1".to_string(),
            time: "65".to_string(),
            details: SportDetails::Soccer {
                possession: SidePair::new(60, 40),
                shots_on_target: SidePair::new(5, 3),
            },
        },
        Sport::Basketball => NormalizedMatch {
            match_id: FALLBACK_MATCH_ID.to_string(),
            home_team: "Test Home Team".to_string(),
            away_team: "Test Away Team".to_string(),
            score: "88 - 84".to_string(),
            time: "4:32".to_string(),
            details: SportDetails::Basketball {
                period: 3,
                statistics: SidePair::new(
                    BasketballStats { field_goals: 31, rebounds: 38, assists: 19 },
                    BasketballStats { field_goals: 29, rebounds: 35, assists: 17 },
                ),
            },
        },
        Sport::Tennis => NormalizedMatch {
            match_id: FALLBACK_MATCH_ID.to_string(),
            home_team: "Test Home Player".to_string(),
            away_team: "Test Away Player".to_string(),
            score: "1-0 (6-4, 3-2)".to_string(),
            time: "1:12".to_string(),
            details: SportDetails::Tennis {
                set: 2,
                statistics: SidePair::new(
                    TennisStats { aces: 6, double_faults: 2, first_serve_pct: 64.0 },
                    TennisStats { aces: 3, double_faults: 4, first_serve_pct: 58.0 },
                ),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn live_event(competitors: Value) -> Value {
        json!({
            "id": "401",
            "status": {"type": {"state": "in"}, "displayClock": "55'", "period": 2},
            "competitions": [{"competitors": competitors}]
        })
    }

    fn assert_no_nulls(value: &Value) {
        match value {
            Value::Null => panic!("null field in normalized record"),
            Value::Array(items) => items.iter().for_each(assert_no_nulls),
            Value::Object(map) => map.values().for_each(assert_no_nulls),
            _ => {}
        }
    }

    #[test]
    fn test_alpha_beta_soccer_scenario() {
        let payload = json!({
            "events": [{
                "status": {"type": {"state": "in"}},
                "competitions": [{"competitors": [
                    {"team": {"name": "Alpha"}, "score": "2"},
                    {"team": {"name": "Beta"}, "score": "1"}
                ]}]
            }]
        });

        let record = normalize(Sport::Soccer, &payload);

        assert_eq!(record.home_team, "Alpha");
        assert_eq!(record.away_team, "Beta");
        assert_eq!(record.score, "2 - 1");
        assert_eq!(record.time, DEFAULT_CLOCK);
        assert_eq!(
            record.details,
            SportDetails::Soccer {
                possession: SidePair::new(50, 50),
                shots_on_target: SidePair::new(0, 0),
            }
        );
    }

    #[test]
    fn test_empty_or_missing_events_fall_back() {
        for sport in Sport::ALL {
            assert_eq!(normalize(sport, &json!({"events": []})), fallback_match(sport));
            assert_eq!(normalize(sport, &json!({})), fallback_match(sport));
            assert_eq!(normalize(sport, &json!({"events": "nope"})), fallback_match(sport));
        }
        assert_eq!(try_normalize(Sport::Soccer, &json!({})), Err(NormalizeError::EmptyFeed));
    }

    #[test]
    fn test_no_live_event_falls_back() {
        let payload = json!({
            "events": [
                {"status": {"type": {"state": "pre"}}, "competitions": []},
                {"status": {"type": {"state": "post"}}, "competitions": []}
            ]
        });

        for sport in Sport::ALL {
            assert_eq!(normalize(sport, &payload), fallback_match(sport));
        }
        assert_eq!(
            try_normalize(Sport::Tennis, &payload),
            Err(NormalizeError::NoLiveEvent)
        );
    }

    #[test]
    fn test_first_live_event_wins() {
        let payload = json!({
            "events": [
                {"id": "1", "status": {"type": {"state": "post"}}},
                live_event(json!([
                    {"team": {"name": "First"}, "score": "0"},
                    {"team": {"name": "Live"}, "score": "0"}
                ])),
                {
                    "id": "3",
                    "status": {"type": {"state": "in"}},
                    "competitions": [{"competitors": [
                        {"team": {"name": "Second"}}, {"team": {"name": "Live"}}
                    ]}]
                }
            ]
        });

        let record = normalize(Sport::Soccer, &payload);
        assert_eq!(record.match_id, "401");
        assert_eq!(record.home_team, "First");
    }

    #[test]
    fn test_missing_statistics_default_to_zero() {
        let payload = json!({"events": [live_event(json!([
            {"team": {"name": "Lakers"}, "score": "101", "statistics": [{"rebounds": 40}]},
            {"team": {"name": "Celtics"}, "score": "99"}
        ]))]});

        let record = normalize(Sport::Basketball, &payload);

        assert_eq!(record.score, "101 - 99");
        assert_eq!(record.time, "55'");
        assert_eq!(
            record.details,
            SportDetails::Basketball {
                period: 2,
                statistics: SidePair::new(
                    BasketballStats { field_goals: 0, rebounds: 40, assists: 0 },
                    BasketballStats::default(),
                ),
            }
        );
    }

    #[test]
    fn test_statistics_list_shape() {
        let payload = json!({"events": [live_event(json!([
            {"team": {"name": "Arsenal"}, "score": 1, "statistics": [
                {"name": "possessionPct", "displayValue": "58.2"},
                {"name": "shotsOnTarget", "displayValue": "6"}
            ]},
            {"team": {"name": "Chelsea"}, "score": 0, "statistics": [
                {"name": "shotsOnTarget", "value": 2.0}
            ]}
        ]))]});

        let record = normalize(Sport::Soccer, &payload);

        assert_eq!(record.score, "1 - 0");
        match record.details {
            SportDetails::Soccer { shots_on_target, .. } => {
                assert_eq!(shots_on_target, SidePair::new(6, 2));
            }
            other => panic!("expected soccer details, got {:?}", other),
        }
    }

    #[test]
    fn test_single_competitor_falls_back() {
        let payload = json!({"events": [live_event(json!([
            {"team": {"name": "Alone"}, "score": "1"}
        ]))]});

        assert_eq!(normalize(Sport::Soccer, &payload), fallback_match(Sport::Soccer));
        assert!(matches!(
            try_normalize(Sport::Soccer, &payload),
            Err(NormalizeError::MalformedStructure(_))
        ));
    }

    #[test]
    fn test_missing_competitions_falls_back() {
        let payload = json!({"events": [{"status": {"type": {"state": "in"}}}]});
        assert_eq!(normalize(Sport::Basketball, &payload), fallback_match(Sport::Basketball));
    }

    #[test]
    fn test_missing_team_name_falls_back() {
        let payload = json!({"events": [live_event(json!([
            {"team": {"name": "Alpha"}, "score": "1"},
            {"team": {}, "score": "1"}
        ]))]});
        assert_eq!(normalize(Sport::Soccer, &payload), fallback_match(Sport::Soccer));
    }

    #[test]
    fn test_unknown_tag_uses_soccer_extractor() {
        let payload = json!({"events": [live_event(json!([
            {"team": {"name": "India"}, "score": "245"},
            {"team": {"name": "England"}, "score": "230"}
        ]))]});

        let record = normalize_tag("cricket", &payload);

        assert_eq!(record.sport(), Sport::Soccer);
        assert_eq!(record.score, "245 - 230");
        assert!(matches!(record.details, SportDetails::Soccer { .. }));
        assert_eq!(normalize_tag("cricket", &json!({})), fallback_match(Sport::Soccer));

        for tag in ["nba", "Tennis", " BASKETBALL ", "football"] {
            let record = normalize_tag(tag, &payload);
            assert_eq!(record.sport(), Sport::Soccer, "tag {:?}", tag);
            assert_eq!(record.home_team, "India");
        }
    }

    #[test]
    fn test_tennis_sets_truncate_to_shorter_list() {
        let payload = json!({"events": [live_event(json!([
            {
                "athlete": {"displayName": "Player A"},
                "score": "1",
                "linescores": [{"value": 6.0}, {"value": 3.0}, {"value": 2.0}],
                "statistics": [{"aces": 7, "doubleFaults": "1", "firstServePercent": "66%"}]
            },
            {
                "athlete": {"displayName": "Player B"},
                "score": "1",
                "linescores": [{"value": 4.0}, {"value": 6.0}]
            }
        ]))]});

        let record = normalize(Sport::Tennis, &payload);

        assert_eq!(record.home_team, "Player A");
        assert_eq!(record.away_team, "Player B");
        assert_eq!(record.score, "1-1 (6-4, 3-6)");
        assert_eq!(
            record.details,
            SportDetails::Tennis {
                set: 2,
                statistics: SidePair::new(
                    TennisStats { aces: 7, double_faults: 1, first_serve_pct: 66.0 },
                    TennisStats::default(),
                ),
            }
        );
    }

    #[test]
    fn test_tennis_sets_truncate_when_away_list_is_longer() {
        let home = json!({"score": "0", "linescores": [{"value": 4}, {"value": 5}]});
        let away = json!({
            "score": "1",
            "linescores": [{"value": 6}, {"value": 7}, {"value": 1}]
        });

        assert_eq!(format_tennis_score(&home, &away).unwrap(), "0-1 (4-6, 5-7)");
    }

    #[test]
    fn test_tennis_score_formatting_failure_is_local() {
        let payload = json!({"events": [live_event(json!([
            {"athlete": {"displayName": "Player A"}, "score": "2", "linescores": "6-4"},
            {"athlete": {"displayName": "Player B"}, "score": "0", "statistics": [{"aces": 3}]}
        ]))]});

        let record = normalize(Sport::Tennis, &payload);

        assert_eq!(record.score, TENNIS_SCORE_FALLBACK);
        assert_eq!(record.home_team, "Player A");
        assert_eq!(record.match_id, "401");
        match record.details {
            SportDetails::Tennis { statistics, .. } => assert_eq!(statistics.away.aces, 3),
            other => panic!("expected tennis details, got {:?}", other),
        }
    }

    #[test]
    fn test_format_tennis_score_without_sets() {
        let home = json!({"score": "0"});
        let away = json!({});
        assert_eq!(format_tennis_score(&home, &away).unwrap(), "0-0 ()");

        let bad_entry = json!({"score": "1", "linescores": [6]});
        assert!(format_tennis_score(&bad_entry, &bad_entry).is_err());
    }

    #[test]
    fn test_records_are_fully_populated() {
        let payload = json!({"events": [live_event(json!([
            {"team": {"name": "H"}, "athlete": {"displayName": "H"}},
            {"team": {"name": "A"}, "athlete": {"displayName": "A"}}
        ]))]});

        for sport in Sport::ALL {
            let value = serde_json::to_value(normalize(sport, &payload)).unwrap();
            assert_no_nulls(&value);
            assert_eq!(value["sport"], sport.as_str());

            let fallback = serde_json::to_value(fallback_match(sport)).unwrap();
            assert_no_nulls(&fallback);
        }
    }

    #[test]
    fn test_normalize_live_skips_malformed_events() {
        let payload = json!({"events": [
            live_event(json!([{"team": {"name": "A"}}, {"team": {"name": "B"}}])),
            {"id": "bad", "status": {"type": {"state": "in"}}, "competitions": [{"competitors": []}]},
            {"id": "done", "status": {"type": {"state": "post"}}},
            live_event(json!([{"team": {"name": "C"}}, {"team": {"name": "D"}}]))
        ]});

        let live = normalize_live(Sport::Soccer, &payload);

        assert_eq!(live.len(), 2);
        assert_eq!(live[0].home_team, "A");
        assert_eq!(live[1].home_team, "C");
        assert!(normalize_live(Sport::Soccer, &json!({})).is_empty());
    }
}
