//! Aggregation engine: one reduction pass over the message corpus.
//!
//! Every message feeds the daily activity table so streaks can see across the
//! year boundary. Everything else (tokens, attribution, tools, weekdays, the
//! message count) only counts messages inside the target year.

use crate::filter::YearFilter;
use crate::record::{MessageRecord, Role};
use chrono::NaiveDate;
use fxhash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeMap;

/// Local calendar date -> message count.
pub type DailyActivity = BTreeMap<NaiveDate, u64>;

/// Occurrence counts keyed by model id, provider id or tool name.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct FrequencyTable {
    counts: FxHashMap<Box<str>, u64>,
}

impl FrequencyTable {
    #[inline]
    pub fn increment(&mut self, key: &str) {
        self.add(key, 1);
    }

    pub fn add(&mut self, key: &str, count: u64) {
        // Avoid allocating the key on the common path
        if let Some(existing) = self.counts.get_mut(key) {
            *existing += count;
        } else {
            self.counts.insert(key.into(), count);
        }
    }

    #[inline]
    pub fn get(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Sum of all counts; the denominator for percentages of this category.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (&**k, *v))
    }
}

impl<'a> FromIterator<(&'a str, u64)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (&'a str, u64)>>(iter: I) -> Self {
        let mut table = FrequencyTable::default();
        for (key, count) in iter {
            table.add(key, count);
        }
        table
    }
}

/// Running accumulators of the engine.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    pub messages: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub tool_calls: u64,
    pub models: FrequencyTable,
    pub providers: FrequencyTable,
    pub tools: FrequencyTable,
    /// Providers seen alongside each model id.
    pub model_providers: FxHashMap<Box<str>, FrequencyTable>,
    /// Full corpus, not year-scoped.
    pub daily: DailyActivity,
    /// 0 = Sunday .. 6 = Saturday
    pub weekdays: [u64; 7],
}

impl Tally {
    #[inline]
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }

    /// Most frequent provider recorded for `model`, ties by name.
    pub fn provider_of(&self, model: &str) -> Option<&str> {
        self.model_providers
            .get(model)?
            .iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(provider, _)| provider)
    }

    pub fn observe(&mut self, message: &MessageRecord, in_year: bool) {
        *self.daily.entry(message.local_date()).or_insert(0) += 1;
        if !in_year {
            return;
        }

        self.messages += 1;
        self.weekdays[message.weekday_index()] += 1;

        if let Some(usage) = &message.usage {
            self.input_tokens = self.input_tokens.saturating_add(usage.input_tokens);
            self.output_tokens = self.output_tokens.saturating_add(usage.output_tokens);
        }

        for tool in message.tool_names() {
            self.tool_calls += 1;
            self.tools.increment(tool);
        }

        if message.role != Role::Assistant {
            return;
        }
        let Some(model_ref) = &message.model else {
            return;
        };
        if let Some(model) = model_ref.model.as_deref() {
            self.models.increment(model);
            if let Some(provider) = model_ref.provider.as_deref() {
                if let Some(table) = self.model_providers.get_mut(model) {
                    table.increment(provider);
                } else {
                    let mut table = FrequencyTable::default();
                    table.increment(provider);
                    self.model_providers.insert(model.into(), table);
                }
            }
        }
        if let Some(provider) = model_ref.provider.as_deref() {
            self.providers.increment(provider);
        }
    }
}

pub fn aggregate<'a, I>(messages: I, filter: &YearFilter) -> Tally
where
    I: IntoIterator<Item = &'a MessageRecord>,
{
    let mut tally = Tally::default();
    for message in messages {
        tally.observe(message, filter.contains_message(message));
    }
    tally
}
