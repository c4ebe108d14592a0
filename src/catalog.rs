use crate::error::{Error, Result};
use crate::names::{DisplayNames, NameKind};
use fxhash::FxHashMap;
use log::{debug, warn};
use std::path::Path;
use std::time::Duration;

pub const MODELS_DEV_URL: &str = "https://models.dev/api.json";
pub const CACHE_FILE: &str = "models-dev.json";

const FETCH_TIMEOUT: Duration = Duration::from_secs(5);
const CACHE_MAX_AGE: Duration = Duration::from_secs(86400);

#[derive(Debug, Clone)]
struct CatalogModel {
    name: String,
    provider: String,
}

/// Model and provider names from models.dev.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: FxHashMap<String, CatalogModel>,
    providers: FxHashMap<String, String>,
}

impl ModelCatalog {
    /// Load from the disk cache when fresh, otherwise fetch. Falls back to a
    /// stale cache, then to an empty catalog. Never fails.
    pub fn load(cache_dir: &Path) -> Self {
        let path = cache_dir.join(CACHE_FILE);

        // Use disk cache if fresh (< 1 day old)
        if cache_is_fresh(&path) {
            if let Some(catalog) = read_cache(&path) {
                return catalog;
            }
        }

        match fetch() {
            Ok(body) => {
                let catalog = Self::from_json(&body);
                if !catalog.is_empty() {
                    if let Err(e) = write_cache(cache_dir, &path, &body) {
                        debug!("Could not write catalog cache {}: {}", path.display(), e);
                    }
                    return catalog;
                }
            }
            Err(e) => debug!("Catalog fetch failed: {}", e),
        }

        // Stale cache fallback
        if let Some(catalog) = read_cache(&path) {
            return catalog;
        }

        warn!("Failed to fetch models.dev data, using fallback names");
        Self::default()
    }

    /// Parse the models.dev shape: `{ provider_id: { name, models: { model_id: { name } } } }`.
    pub fn from_json(body: &serde_json::Value) -> Self {
        let mut catalog = Self::default();
        let Some(providers) = body.as_object() else {
            return catalog;
        };

        for (provider_id, provider) in providers {
            let Some(provider) = provider.as_object() else {
                continue;
            };
            if let Some(name) = provider.get("name").and_then(|v| v.as_str()) {
                catalog
                    .providers
                    .insert(provider_id.clone(), name.to_string());
            }
            let Some(models) = provider.get("models").and_then(|v| v.as_object()) else {
                continue;
            };
            for (model_id, model) in models {
                let Some(name) = model.get("name").and_then(|v| v.as_str()) else {
                    continue;
                };
                // Later providers overwrite earlier ones for shared model ids
                catalog.models.insert(
                    model_id.clone(),
                    CatalogModel {
                        name: name.to_string(),
                        provider: provider_id.clone(),
                    },
                );
            }
        }
        catalog
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty() && self.providers.is_empty()
    }
}

impl DisplayNames for ModelCatalog {
    fn lookup(&self, kind: NameKind, id: &str) -> Option<String> {
        match kind {
            NameKind::Model => self.models.get(id).map(|m| m.name.clone()),
            NameKind::Provider => self.providers.get(id).cloned(),
            NameKind::ModelProvider => self.models.get(id).map(|m| m.provider.clone()),
        }
    }
}

fn cache_is_fresh(path: &Path) -> bool {
    let Ok(meta) = std::fs::metadata(path) else {
        return false;
    };
    meta.modified()
        .ok()
        .and_then(|t| t.elapsed().ok())
        .is_some_and(|age| age < CACHE_MAX_AGE)
}

fn read_cache(path: &Path) -> Option<ModelCatalog> {
    let bytes = std::fs::read(path).ok()?;
    let body = serde_json::from_slice::<serde_json::Value>(&bytes).ok()?;
    let catalog = ModelCatalog::from_json(&body);
    (!catalog.is_empty()).then_some(catalog)
}

fn write_cache(dir: &Path, path: &Path, body: &serde_json::Value) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    std::fs::write(path, serde_json::to_vec(body)?)?;
    Ok(())
}

fn fetch() -> Result<serde_json::Value> {
    let response = ureq::AgentBuilder::new()
        .timeout(FETCH_TIMEOUT)
        .build()
        .get(MODELS_DEV_URL)
        .call()
        .map_err(|e| Error::Catalog(e.to_string()))?;
    Ok(response.into_json::<serde_json::Value>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::{model_display_name, provider_display_name};
    use serde_json::json;
    use tempfile::TempDir;

    fn sample() -> serde_json::Value {
        json!({
            "anthropic": {
                "name": "Anthropic",
                "models": {
                    "claude-sonnet-4": { "name": "Claude Sonnet 4" },
                    "nameless": { "cost": { "input": 3.0 } }
                }
            },
            "zai-coding-plan": {
                "models": { "glm-4.6": { "name": "GLM-4.6" } }
            },
            "broken": 42
        })
    }

    #[test]
    fn test_from_json() {
        let catalog = ModelCatalog::from_json(&sample());
        assert_eq!(
            catalog.lookup(NameKind::Model, "claude-sonnet-4").as_deref(),
            Some("Claude Sonnet 4")
        );
        assert_eq!(
            catalog.lookup(NameKind::ModelProvider, "glm-4.6").as_deref(),
            Some("zai-coding-plan")
        );
        assert_eq!(
            catalog.lookup(NameKind::Provider, "anthropic").as_deref(),
            Some("Anthropic")
        );
        assert_eq!(catalog.lookup(NameKind::Provider, "zai-coding-plan"), None);
        assert_eq!(catalog.lookup(NameKind::Model, "nameless"), None);
    }

    #[test]
    fn test_catalog_with_fallback_names() {
        let catalog = ModelCatalog::from_json(&sample());
        assert_eq!(model_display_name(&catalog, "glm-4.6"), "GLM-4.6");
        assert_eq!(model_display_name(&catalog, "gpt-4o"), "Gpt 4o");
        assert_eq!(provider_display_name(&catalog, "zai-coding-plan"), "Zai-coding-plan");
    }

    #[test]
    fn test_non_object_body_is_empty() {
        assert!(ModelCatalog::from_json(&json!([1, 2, 3])).is_empty());
    }

    #[test]
    fn test_fresh_cache_is_used() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CACHE_FILE);
        write_cache(dir.path(), &path, &sample()).unwrap();
        assert!(cache_is_fresh(&path));

        let catalog = ModelCatalog::load(dir.path());
        assert_eq!(
            catalog.lookup(NameKind::Model, "claude-sonnet-4").as_deref(),
            Some("Claude Sonnet 4")
        );
    }
}
