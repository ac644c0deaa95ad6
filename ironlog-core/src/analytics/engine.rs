//! Pure analytics over in-memory session and template snapshots. All
//! functions take `today` explicitly so results are reproducible.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Days, NaiveDate};

use crate::model::{
    CATEGORIES, ExerciseStats, ExerciseSuggestion, ExerciseTemplate, Priority, Trend, WeeklyStats,
    WorkoutSession,
};

/// Smallest relative change treated as real progress; anything inside
/// the band is noise.
const TREND_DEADBAND: f64 = 0.05;

/// Sessions needed before a trend is computed (two recent, two older).
const TREND_MIN_SESSIONS: usize = 4;

/// A category is suggested after this many days without training it.
const IDLE_DAYS_THRESHOLD: i64 = 3;

/// Idle this long (or an upward trend) bumps a suggestion to high
/// priority.
const STALE_DAYS_THRESHOLD: i64 = 7;

/// Working-weight suggestion as a fraction of the historical max.
const SUGGESTED_WEIGHT_FACTOR: f64 = 0.85;

const MAX_SUGGESTIONS: usize = 6;

/// How far back the streak scan looks.
const STREAK_WINDOW_DAYS: u64 = 30;

/// One session's worth of history for a single exercise name.
struct HistoryEntry {
    date: NaiveDate,
    max_weight: f64,
    volume: f64,
    category: String,
    set_weights: Vec<f64>,
}

/// Aggregate history for one exercise name, newest session first.
fn exercise_history(sessions: &[WorkoutSession], exercise_name: &str) -> Vec<HistoryEntry> {
    let mut history: Vec<HistoryEntry> = sessions
        .iter()
        .filter_map(|session| {
            let matching: Vec<_> = session
                .exercises
                .iter()
                .filter(|e| e.name == exercise_name)
                .collect();
            if matching.is_empty() {
                return None;
            }
            let set_weights: Vec<f64> = matching
                .iter()
                .flat_map(|e| e.sets.iter())
                .map(|s| s.weight)
                .collect();
            let max_weight = set_weights.iter().copied().fold(0.0_f64, f64::max);
            let volume: f64 = matching.iter().map(|e| e.volume()).sum();
            let category = matching[0].category.clone();
            Some(HistoryEntry {
                date: session.date,
                max_weight,
                volume,
                category,
                set_weights,
            })
        })
        .collect();
    history.sort_by(|a, b| b.date.cmp(&a.date));
    history
}

/// Mean weight across every set in the given sessions. Warm-up sets
/// count the same as working sets.
fn mean_set_weight(entries: &[HistoryEntry]) -> f64 {
    let weights: Vec<f64> = entries
        .iter()
        .flat_map(|e| e.set_weights.iter().copied())
        .collect();
    if weights.is_empty() {
        return 0.0;
    }
    weights.iter().sum::<f64>() / weights.len() as f64
}

fn trend_from_history(history: &[HistoryEntry]) -> Trend {
    if history.len() < TREND_MIN_SESSIONS {
        return Trend::Stable;
    }
    let recent = mean_set_weight(&history[..2]);
    let older = mean_set_weight(&history[2..4]);
    if older == 0.0 {
        return Trend::Stable;
    }
    // Scaled comparison keeps the 5% boundary exact (105 vs 100 is Up,
    // not a float rounding casualty). The down side is strict: exactly
    // -5% is still Stable.
    if recent * 100.0 >= older * (100.0 + TREND_DEADBAND * 100.0) {
        Trend::Up
    } else if recent * 100.0 < older * (100.0 - TREND_DEADBAND * 100.0) {
        Trend::Down
    } else {
        Trend::Stable
    }
}

/// Stats for one exercise name, or `None` if it was never performed.
pub fn exercise_stats(sessions: &[WorkoutSession], exercise_name: &str) -> Option<ExerciseStats> {
    let history = exercise_history(sessions, exercise_name);
    let newest = history.first()?;
    let last_performed = newest.date;
    let category = newest.category.clone();
    let max_weight = history.iter().map(|h| h.max_weight).fold(0.0_f64, f64::max);
    let total_volume = history.iter().map(|h| h.volume).sum();
    Some(ExerciseStats {
        exercise_name: exercise_name.to_string(),
        category,
        max_weight,
        total_volume,
        last_performed,
        progress_trend: trend_from_history(&history),
    })
}

/// Stats for every distinct exercise name present in the sessions,
/// sorted by name.
pub fn all_exercise_stats(sessions: &[WorkoutSession]) -> Vec<ExerciseStats> {
    let mut names: Vec<&str> = sessions
        .iter()
        .flat_map(|s| s.exercises.iter().map(|e| e.name.as_str()))
        .collect();
    names.sort_unstable();
    names.dedup();
    names
        .iter()
        .filter_map(|name| exercise_stats(sessions, name))
        .collect()
}

fn last_trained(sessions: &[WorkoutSession], category: &str) -> Option<NaiveDate> {
    sessions
        .iter()
        .filter(|s| s.exercises.iter().any(|e| e.category == category))
        .map(|s| s.date)
        .max()
}

/// Sessions in the last seven days (inclusive of today) touching the
/// category.
fn recent_frequency(sessions: &[WorkoutSession], category: &str, today: NaiveDate) -> usize {
    let window_start = today - Days::new(6);
    sessions
        .iter()
        .filter(|s| s.date >= window_start && s.date <= today)
        .filter(|s| s.exercises.iter().any(|e| e.category == category))
        .count()
}

fn suggestion_for(
    template: &ExerciseTemplate,
    sessions: &[WorkoutSession],
    reason: String,
    priority: Priority,
) -> ExerciseSuggestion {
    let history = exercise_history(sessions, &template.name);
    let max_weight = history.iter().map(|h| h.max_weight).fold(0.0_f64, f64::max);
    let suggested_weight = (max_weight > 0.0).then(|| (max_weight * SUGGESTED_WEIGHT_FACTOR).round());
    ExerciseSuggestion {
        exercise: template.clone(),
        reason,
        priority,
        suggested_weight,
        suggested_reps: Some(template.difficulty.suggested_reps()),
    }
}

/// Pick up to six exercises worth doing today: categories gone idle or
/// rarely trained first, then whatever balances out what was already
/// trained today. One entry per exercise, highest priority wins.
pub fn suggest_todays_exercises(
    sessions: &[WorkoutSession],
    templates: &[ExerciseTemplate],
    today: NaiveDate,
) -> Vec<ExerciseSuggestion> {
    // Insertion order is category order, which doubles as the tiebreak
    // when priorities are equal.
    let mut suggestions: Vec<ExerciseSuggestion> = Vec::new();
    let mut insert = |suggestion: ExerciseSuggestion| {
        match suggestions
            .iter_mut()
            .find(|s| s.exercise.id == suggestion.exercise.id)
        {
            Some(existing) => {
                if suggestion.priority > existing.priority {
                    *existing = suggestion;
                }
            }
            None => suggestions.push(suggestion),
        }
    };

    for category in CATEGORIES {
        let last = last_trained(sessions, category);
        let days_idle = last.map(|d| (today - d).num_days());
        let frequency = recent_frequency(sessions, category, today);

        let flagged = match days_idle {
            None => true,
            Some(days) => days >= IDLE_DAYS_THRESHOLD || frequency <= 1,
        };
        if !flagged {
            continue;
        }

        // Every exercise of a flagged category is a candidate; the
        // overall cap trims the list later.
        for template in templates.iter().filter(|t| t.category == category) {
            let trend = exercise_stats(sessions, &template.name)
                .map(|s| s.progress_trend)
                .unwrap_or(Trend::Stable);
            let stale = days_idle.is_none_or(|days| days >= STALE_DAYS_THRESHOLD);
            let (reason, priority) = if stale {
                (
                    match days_idle {
                        Some(days) => format!("No {category} work in {days} days"),
                        None => format!("{category} has not been trained yet"),
                    },
                    Priority::High,
                )
            } else if trend == Trend::Up {
                (
                    format!("{} is trending up, keep pushing", template.name),
                    Priority::High,
                )
            } else {
                (
                    format!("{category} trained only {frequency} time(s) this week"),
                    Priority::Medium,
                )
            };
            insert(suggestion_for(template, sessions, reason, priority));
        }
    }

    // Round out today's plan with categories not yet touched today.
    let trained_today: Vec<&str> = sessions
        .iter()
        .filter(|s| s.date == today)
        .flat_map(|s| s.exercises.iter().map(|e| e.category.as_str()))
        .collect();
    for category in CATEGORIES {
        if trained_today.contains(&category) {
            continue;
        }
        for template in templates.iter().filter(|t| t.category == category).take(2) {
            insert(suggestion_for(
                template,
                sessions,
                format!("Balance today's session with some {category} work"),
                Priority::Medium,
            ));
        }
    }

    suggestions.sort_by(|a, b| b.priority.cmp(&a.priority));
    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

/// Consecutive training days ending at (or just before) today, scanned
/// back at most thirty days. Untrained days before the streak starts are
/// skipped, the first gap after it ends the scan.
pub fn training_streak(sessions: &[WorkoutSession], today: NaiveDate) -> u32 {
    let mut streak = 0u32;
    for offset in 0..STREAK_WINDOW_DAYS {
        let day = today - Days::new(offset);
        let trained = sessions.iter().any(|s| s.date == day);
        if trained {
            streak += 1;
        } else if streak > 0 {
            break;
        }
    }
    streak
}

/// Totals over the last seven days plus the current streak.
pub fn weekly_stats(sessions: &[WorkoutSession], today: NaiveDate) -> WeeklyStats {
    let window_start = today - Days::new(6);
    let in_window: Vec<&WorkoutSession> = sessions
        .iter()
        .filter(|s| s.date >= window_start && s.date <= today)
        .collect();

    // A category counts once per session no matter how many of its
    // exercises the session contains.
    let mut category_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for session in &in_window {
        let in_session: BTreeSet<&str> = session
            .exercises
            .iter()
            .map(|e| e.category.as_str())
            .collect();
        for category in in_session {
            *category_counts.entry(category).or_default() += 1;
        }
    }
    let most_trained_category = category_counts
        .iter()
        .max_by_key(|(_, count)| **count)
        .map(|(category, _)| category.to_string());

    WeeklyStats {
        total_workouts: in_window.len(),
        total_volume: in_window.iter().map(|s| s.total_volume()).sum(),
        most_trained_category,
        streak: training_streak(sessions, today),
    }
}
