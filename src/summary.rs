//! Annual summary: the pipeline from collected corpus to report-ready struct.

use crate::aggregate::{aggregate, DailyActivity};
use crate::collector::{self, Corpus};
use crate::error::Result;
use crate::filter::YearFilter;
use crate::names::{model_display_name, provider_display_name, DisplayNames, NameKind};
use crate::ranking::top_n;
use crate::streak::{current_streak, longest_streak};
use chrono::{DateTime, Datelike, Local, NaiveDate};
use serde::Serialize;
use std::path::Path;

pub const TOP_MODELS: usize = 3;
pub const TOP_PROVIDERS: usize = 3;
pub const TOP_TOOLS: usize = 5;

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStats {
    pub id: String,
    pub name: String,
    pub provider_id: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStats {
    pub id: String,
    pub name: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolStats {
    pub name: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MostActiveDay {
    pub date: NaiveDate,
    pub count: u64,
    /// e.g. "Mar 7"
    pub formatted_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayActivity {
    /// 0 = Sunday .. 6 = Saturday
    pub counts: [u64; 7],
    pub most_active_day: usize,
    pub most_active_day_name: &'static str,
    pub max_count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualSummary {
    pub year: i32,

    // Time-based, over every session ever recorded
    pub first_session_date: Option<DateTime<Local>>,
    pub days_since_first_session: i64,

    // Counts
    pub total_sessions: u64,
    pub total_messages: u64,
    pub total_projects: u64,
    pub total_tool_calls: u64,

    // Tokens
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_tokens: u64,

    // Rankings
    pub top_models: Vec<ModelStats>,
    pub top_providers: Vec<ProviderStats>,
    pub top_tools: Vec<ToolStats>,

    // Streaks
    pub max_streak: u32,
    pub max_streak_days: Vec<NaiveDate>,
    pub current_streak: u32,

    /// Every active day in the corpus, including other years
    pub daily_activity: DailyActivity,
    pub most_active_day: Option<MostActiveDay>,
    pub weekday_activity: WeekdayActivity,
}

impl AnnualSummary {
    /// Nothing to report for the year.
    pub fn is_empty(&self) -> bool {
        self.total_sessions == 0
    }
}

/// Collect `root` from disk and summarize `year` as of now.
pub fn generate(root: &Path, year: i32, names: &dyn DisplayNames) -> Result<AnnualSummary> {
    let corpus = collector::collect(root)?;
    Ok(summarize(&corpus, year, names, Local::now()))
}

pub fn summarize(
    corpus: &Corpus,
    year: i32,
    names: &dyn DisplayNames,
    now: DateTime<Local>,
) -> AnnualSummary {
    let filter = YearFilter::new(year);
    let tally = aggregate(&corpus.messages, &filter);

    let first_session_date = corpus.sessions.iter().map(|s| s.first_message_at).min();
    let days_since_first_session = first_session_date
        .map(|first| (now - first).num_days().max(0))
        .unwrap_or(0);

    let top_models = top_n(&tally.models, TOP_MODELS)
        .into_iter()
        .map(|entry| {
            let provider_id = tally
                .provider_of(&entry.key)
                .map(str::to_string)
                .or_else(|| names.lookup(NameKind::ModelProvider, &entry.key))
                .unwrap_or_else(|| "unknown".to_string());
            ModelStats {
                name: model_display_name(names, &entry.key),
                provider_id,
                id: entry.key,
                count: entry.count,
                percentage: entry.percentage,
            }
        })
        .collect();

    let top_providers = top_n(&tally.providers, TOP_PROVIDERS)
        .into_iter()
        .map(|entry| ProviderStats {
            name: provider_display_name(names, &entry.key),
            id: entry.key,
            count: entry.count,
            percentage: entry.percentage,
        })
        .collect();

    let top_tools = top_n(&tally.tools, TOP_TOOLS)
        .into_iter()
        .map(|entry| ToolStats {
            name: entry.key,
            count: entry.count,
            percentage: entry.percentage,
        })
        .collect();

    let longest = longest_streak(&tally.daily, year);
    let current = current_streak(&tally.daily, now.date_naive());

    AnnualSummary {
        year,
        first_session_date,
        days_since_first_session,
        total_sessions: filter.sessions(&corpus.sessions).count() as u64,
        total_messages: tally.messages,
        total_projects: corpus.projects.len() as u64,
        total_tool_calls: tally.tool_calls,
        total_input_tokens: tally.input_tokens,
        total_output_tokens: tally.output_tokens,
        total_tokens: tally.total_tokens(),
        top_models,
        top_providers,
        top_tools,
        max_streak: longest.length,
        max_streak_days: longest.days,
        current_streak: current,
        most_active_day: most_active_day(&tally.daily, year),
        weekday_activity: weekday_activity(tally.weekdays),
        daily_activity: tally.daily,
    }
}

/// Busiest date of `year`; the earliest date wins a tie.
pub fn most_active_day(daily: &DailyActivity, year: i32) -> Option<MostActiveDay> {
    let mut best: Option<(NaiveDate, u64)> = None;
    for (date, count) in daily.iter().filter(|(d, _)| d.year() == year) {
        if *count > best.map_or(0, |(_, c)| c) {
            best = Some((*date, *count));
        }
    }
    best.map(|(date, count)| MostActiveDay {
        date,
        count,
        formatted_date: date.format("%b %-d").to_string(),
    })
}

/// Modal weekday; the lowest index wins a tie, Sunday when all are zero.
pub fn weekday_activity(counts: [u64; 7]) -> WeekdayActivity {
    let mut most_active_day = 0;
    let mut max_count = 0;
    for (day, &count) in counts.iter().enumerate() {
        if count > max_count {
            max_count = count;
            most_active_day = day;
        }
    }
    WeekdayActivity {
        counts,
        most_active_day,
        most_active_day_name: WEEKDAY_NAMES[most_active_day],
        max_count,
    }
}
