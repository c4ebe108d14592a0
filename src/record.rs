//! Record types for session logs.
//!
//! Every line of a session file is decoded into a [`RawRecord`] whose fields
//! are all lenient: a malformed optional field becomes `None` instead of
//! failing the whole line. Only `type == "message"` records with a parseable
//! timestamp are promoted to [`MessageRecord`].

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::ops::Deref;
use std::path::PathBuf;

pub const MESSAGE_KIND: &str = "message";

// ---------------------------------------------------------------------------
// Lenient scalars
// ---------------------------------------------------------------------------

/// Deserialize a field, turning any shape mismatch into `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// A list whose malformed elements are dropped one by one instead of failing
/// the whole list.
pub(crate) struct LenientVec<T>(pub(crate) Vec<T>);

impl<'de, T: DeserializeOwned> Deserialize<'de> for LenientVec<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
        Ok(Self(
            values
                .into_iter()
                .filter_map(|v| T::deserialize(v).ok())
                .collect(),
        ))
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LenientU64(pub u64);

impl<'de> serde::Deserialize<'de> for LenientU64 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct LenientVisitor;
        impl<'de> Visitor<'de> for LenientVisitor {
            type Value = u64;
            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a non-negative integer, a float or a numeric string")
            }
            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
                Ok(v)
            }
            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
                Ok(v.max(0) as u64)
            }
            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
                Ok(if v.is_finite() && v > 0.0 { v as u64 } else { 0 })
            }
            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.trim().parse::<u64>().map_err(serde::de::Error::custom)
            }
        }
        deserializer.deserialize_any(LenientVisitor).map(LenientU64)
    }
}

impl Deref for LenientU64 {
    type Target = u64;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LenientString(pub String);

impl<'de> serde::Deserialize<'de> for LenientString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct LenientVisitor;
        impl<'de> Visitor<'de> for LenientVisitor {
            type Value = String;
            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a string or a number")
            }
            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
                Ok(v.to_string())
            }
            fn visit_string<E>(self, v: String) -> Result<Self::Value, E> {
                Ok(v)
            }
            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
                Ok(v.to_string())
            }
            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
                Ok(v.to_string())
            }
            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
                Ok(v.to_string())
            }
        }
        deserializer
            .deserialize_any(LenientVisitor)
            .map(LenientString)
    }
}

impl Deref for LenientString {
    type Target = String;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for LenientString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A point in time given as RFC 3339, a naive local datetime, or epoch
/// seconds/milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct LenientTimestamp(pub DateTime<Local>);

impl<'de> serde::Deserialize<'de> for LenientTimestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct LenientVisitor;
        impl<'de> Visitor<'de> for LenientVisitor {
            type Value = DateTime<Local>;
            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("an RFC 3339 timestamp or epoch number")
            }
            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                parse_timestamp_str(v)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {v}")))
            }
            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                parse_timestamp_i64(v)
                    .ok_or_else(|| serde::de::Error::custom("timestamp out of range"))
            }
            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                let v = i64::try_from(v).map_err(serde::de::Error::custom)?;
                self.visit_i64(v)
            }
            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                self.visit_i64(v as i64)
            }
        }
        deserializer
            .deserialize_any(LenientVisitor)
            .map(LenientTimestamp)
    }
}

pub fn parse_timestamp_str(raw: &str) -> Option<DateTime<Local>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local));
    }
    // No offset: interpret as local wall-clock time.
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return naive.and_local_timezone(Local).earliest();
        }
    }
    if let Ok(num) = raw.parse::<i64>() {
        return parse_timestamp_i64(num);
    }
    None
}

pub fn parse_timestamp_i64(num: i64) -> Option<DateTime<Local>> {
    if num <= 0 {
        return None;
    }
    // Values past ~year 2286 in seconds are taken as milliseconds.
    let utc = if num > 10_000_000_000 {
        Utc.timestamp_millis_opt(num).single()
    } else {
        Utc.timestamp_opt(num, 0).single()
    };
    utc.map(|dt| dt.with_timezone(&Local))
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Deserialize, Default)]
pub(crate) struct UsageData {
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) input_tokens: Option<LenientU64>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) output_tokens: Option<LenientU64>,
}

#[derive(Deserialize, Default)]
pub(crate) struct ToolCallData {
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) name: Option<LenientString>,
}

#[derive(Deserialize, Default)]
pub(crate) struct ContentBlockData {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub(crate) block_type: Option<LenientString>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) name: Option<LenientString>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) text: Option<LenientString>,
}

#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum ContentData {
    Text(String),
    Blocks(LenientVec<ContentBlockData>),
}

/// One decoded line of a session file, of any kind.
#[derive(Deserialize, Default)]
pub(crate) struct RawRecord {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub(crate) kind: Option<LenientString>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) role: Option<LenientString>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) content: Option<ContentData>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) model: Option<LenientString>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) usage: Option<UsageData>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) timestamp: Option<LenientTimestamp>,
    #[serde(rename = "sessionId", default, deserialize_with = "lenient")]
    pub(crate) session_id: Option<LenientString>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) tool_calls: Option<LenientVec<ToolCallData>>,
}

impl RawRecord {
    #[inline]
    pub(crate) fn is_message(&self) -> bool {
        self.kind.as_deref().map(String::as_str) == Some(MESSAGE_KIND)
    }

    /// Promote to a message. `None` for non-message kinds and for messages
    /// without a valid timestamp.
    pub(crate) fn into_message(self, fallback_session: &str) -> Option<MessageRecord> {
        if !self.is_message() {
            return None;
        }
        let timestamp = self.timestamp?.0;

        let session_id: Box<str> = match self.session_id {
            Some(s) if !s.is_empty() => s.0.into_boxed_str(),
            _ => fallback_session.into(),
        };

        let content = match self.content {
            Some(ContentData::Text(text)) => Content::Text(text.into_boxed_str()),
            Some(ContentData::Blocks(blocks)) => Content::Blocks(
                blocks
                    .0
                    .into_iter()
                    .map(|b| ContentBlock {
                        kind: b.block_type.map(|s| s.0).unwrap_or_default().into_boxed_str(),
                        name: b.name.map(|s| s.0.into_boxed_str()),
                        text: b.text.map(|s| s.0.into_boxed_str()),
                    })
                    .collect(),
            ),
            None => Content::Text("".into()),
        };

        let tool_calls = self
            .tool_calls
            .map(|calls| calls.0)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|t| t.name.map(|n| n.0))
            .filter(|n| !n.is_empty())
            .map(String::into_boxed_str)
            .collect();

        Some(MessageRecord {
            role: Role::from(self.role.as_ref().map(|s| s.as_str()).unwrap_or("")),
            content,
            model: self.model.as_ref().and_then(|m| ModelRef::parse(m)),
            usage: self.usage.map(|u| Usage {
                input_tokens: u.input_tokens.map(|v| *v).unwrap_or(0),
                output_tokens: u.output_tokens.map(|v| *v).unwrap_or(0),
            }),
            timestamp,
            session_id,
            tool_calls,
        })
    }
}

// ---------------------------------------------------------------------------
// Domain records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Other,
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            _ => Role::Other,
        }
    }
}

/// A `provider/model-id` reference. Either part may be unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    pub provider: Option<Box<str>>,
    pub model: Option<Box<str>>,
}

impl ModelRef {
    /// Split on the first `/`. Returns `None` for an empty string.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let (provider, model) = match raw.split_once('/') {
            Some((p, m)) => (Some(p), m),
            None => (None, raw),
        };
        Some(Self {
            provider: provider.and_then(resolved),
            model: resolved(model),
        })
    }
}

/// Empty parts and the literal "unknown" count as unresolved.
fn resolved(part: &str) -> Option<Box<str>> {
    if part.is_empty() || part == "unknown" {
        None
    } else {
        Some(part.into())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Usage {
    #[inline]
    pub fn total(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

#[derive(Debug, Clone)]
pub struct ContentBlock {
    pub kind: Box<str>,
    pub name: Option<Box<str>>,
    pub text: Option<Box<str>>,
}

impl ContentBlock {
    /// Tool name when this is a named `tool_use` block.
    pub fn tool_name(&self) -> Option<&str> {
        if &*self.kind != "tool_use" {
            return None;
        }
        self.name.as_deref().filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Clone)]
pub enum Content {
    Text(Box<str>),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Clone)]
pub struct MessageRecord {
    pub role: Role,
    pub content: Content,
    pub model: Option<ModelRef>,
    pub usage: Option<Usage>,
    pub timestamp: DateTime<Local>,
    pub session_id: Box<str>,
    /// Names from the explicit `tool_calls` list.
    pub tool_calls: Vec<Box<str>>,
}

impl MessageRecord {
    /// Every tool invocation this message carries, explicit list first, then
    /// `tool_use` content blocks. The two sources are not deduplicated.
    pub fn tool_names(&self) -> impl Iterator<Item = &str> {
        let blocks: &[ContentBlock] = match &self.content {
            Content::Blocks(blocks) => blocks,
            Content::Text(_) => &[],
        };
        self.tool_calls
            .iter()
            .map(|t| &**t)
            .chain(blocks.iter().filter_map(ContentBlock::tool_name))
    }

    #[inline]
    pub fn local_date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    #[inline]
    pub fn year(&self) -> i32 {
        self.timestamp.year()
    }

    /// 0 = Sunday .. 6 = Saturday
    #[inline]
    pub fn weekday_index(&self) -> usize {
        self.timestamp.weekday().num_days_from_sunday() as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionRecord {
    pub id: Box<str>,
    pub project_id: Box<str>,
    pub first_message_at: DateTime<Local>,
    pub last_message_at: DateTime<Local>,
    pub message_count: u64,
}

impl SessionRecord {
    /// Derive a session from its valid messages; `None` when there are none.
    pub fn from_messages(id: &str, project_id: &str, messages: &[MessageRecord]) -> Option<Self> {
        let first = messages.iter().map(|m| m.timestamp).min()?;
        let last = messages.iter().map(|m| m.timestamp).max()?;
        Some(Self {
            id: id.into(),
            project_id: project_id.into(),
            first_message_at: first,
            last_message_at: last,
            message_count: messages.len() as u64,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRecord {
    pub id: Box<str>,
    pub path: PathBuf,
}
