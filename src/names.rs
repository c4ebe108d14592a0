//! Display-name resolution for model and provider ids.
//!
//! The summary only depends on the [`DisplayNames`] trait. Any lookup may come
//! back empty, in which case a deterministic formatting of the id is used.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    /// Human-readable model name for a model id
    Model,
    /// Human-readable provider name for a provider id
    Provider,
    /// Provider id that serves a model id
    ModelProvider,
}

pub trait DisplayNames {
    fn lookup(&self, kind: NameKind, id: &str) -> Option<String>;
}

/// No lookups at all; every name comes from the fallback formatting.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineNames;

impl DisplayNames for OfflineNames {
    fn lookup(&self, _kind: NameKind, _id: &str) -> Option<String> {
        None
    }
}

pub fn model_display_name(names: &dyn DisplayNames, model_id: &str) -> String {
    names
        .lookup(NameKind::Model, model_id)
        .unwrap_or_else(|| format_model_id(model_id))
}

pub fn provider_display_name(names: &dyn DisplayNames, provider_id: &str) -> String {
    names
        .lookup(NameKind::Provider, provider_id)
        .unwrap_or_else(|| capitalize(provider_id))
}

/// "claude-3-5-sonnet" -> "Claude 3 5 Sonnet". Segments starting with a digit
/// are kept as-is.
pub fn format_model_id(model_id: &str) -> String {
    model_id
        .split(['-', '_'])
        .map(|part| {
            if part.starts_with(|c: char| c.is_ascii_digit()) {
                part.to_string()
            } else {
                capitalize(part)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
