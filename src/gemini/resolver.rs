//! Startup model resolution.
//!
//! Discovers which (API version, model) pair actually works for the
//! configured credential. Listing a model does not guarantee the generation
//! endpoint accepts it, so every candidate gets one live probe. The first
//! probe success wins and resolution stops there.

use tracing::{info, warn};

use super::{strip_models_prefix, GenerativeBackend, ModelBinding};
use crate::error::{Result, TutorError};

/// Known common models, most capable first.
pub const KNOWN_MODELS: [&str; 4] = [
    "gemini-2.0-flash",
    "gemini-2.0-pro",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
];

/// API versions to try, newest first.
pub const API_VERSIONS: [&str; 2] = ["v1", "v1beta"];

/// Priority ordering over the available models: the operator-preferred model
/// first if present, then known common models in declared order, then every
/// other available model. Stable, each model at most once.
fn order_candidates(available: &[String], preferred: &str) -> Vec<String> {
    let preferred = strip_models_prefix(preferred);
    let mut ordered: Vec<String> = Vec::new();

    if available.iter().any(|m| *m == preferred) {
        ordered.push(preferred.clone());
    }

    for known in KNOWN_MODELS {
        if available.iter().any(|m| m == known) && !ordered.iter().any(|m| m == known) {
            ordered.push(known.to_string());
        }
    }

    for model in available {
        if !ordered.contains(model) {
            ordered.push(model.clone());
        }
    }

    ordered
}

/// Resolve the binding used for the rest of the process lifetime.
///
/// Fails with [`TutorError::Configuration`] only after every discovered
/// candidate and every known fallback pair has been probed without success.
pub async fn resolve(backend: &dyn GenerativeBackend, preferred: &str) -> Result<ModelBinding> {
    for version in API_VERSIONS {
        // Listing failure is recoverable; the next version may still work.
        let available = match backend.list_models(version).await {
            Ok(models) => models,
            Err(e) => {
                warn!("ListModels {} failed: {}", version, e);
                Vec::new()
            }
        };

        if available.is_empty() {
            continue;
        }

        let candidates = order_candidates(&available, preferred);
        info!(
            "{} available: {}{}",
            version,
            candidates[..candidates.len().min(8)].join(", "),
            if candidates.len() > 8 { " ..." } else { "" }
        );

        for model in candidates {
            let binding = ModelBinding::new(version, model);
            if backend.probe(&binding).await {
                info!("Using {}", binding);
                return Ok(binding);
            }
        }
    }

    // Discovery found nothing usable; probe the known pairs directly.
    for version in API_VERSIONS {
        for model in KNOWN_MODELS {
            let binding = ModelBinding::new(version, model);
            if backend.probe(&binding).await {
                info!("Using {} (fallback)", binding);
                return Ok(binding);
            }
        }
    }

    Err(TutorError::Configuration(
        "no Gemini model available for this API key".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Scripted backend recording every probe it receives.
    struct ScriptedBackend {
        listings: HashMap<&'static str, Vec<String>>,
        accept: Vec<ModelBinding>,
        probes: Mutex<Vec<ModelBinding>>,
    }

    impl ScriptedBackend {
        fn new(listings: HashMap<&'static str, Vec<String>>, accept: Vec<ModelBinding>) -> Self {
            Self {
                listings,
                accept,
                probes: Mutex::new(Vec::new()),
            }
        }

        fn probed(&self) -> Vec<ModelBinding> {
            self.probes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerativeBackend for ScriptedBackend {
        async fn list_models(&self, api_version: &str) -> Result<Vec<String>> {
            match self.listings.get(api_version) {
                Some(models) => Ok(models.clone()),
                None => Err(TutorError::remote(403, "listing disabled")),
            }
        }

        async fn probe(&self, binding: &ModelBinding) -> bool {
            self.probes.lock().unwrap().push(binding.clone());
            self.accept.contains(binding)
        }

        async fn generate(&self, _binding: &ModelBinding, _prompt: &str) -> Result<String> {
            Ok("ok".to_string())
        }
    }

    fn models(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_order_candidates_preferred_first_no_duplicates() {
        let available = models(&["gemini-1.5-pro", "gemini-exp", "gemini-2.0-flash"]);
        let ordered = order_candidates(&available, "models/gemini-1.5-pro");
        assert_eq!(
            ordered,
            models(&["gemini-1.5-pro", "gemini-2.0-flash", "gemini-exp"])
        );
    }

    #[test]
    fn test_order_candidates_without_preferred() {
        let available = models(&["other-model", "gemini-1.5-flash"]);
        let ordered = order_candidates(&available, "gemini-9.9-ultra");
        assert_eq!(ordered, models(&["gemini-1.5-flash", "other-model"]));
    }

    #[tokio::test]
    async fn test_resolve_short_circuits_on_first_probe_success() {
        let mut listings = HashMap::new();
        listings.insert("v1", models(&["gemini-2.0-flash", "gemini-1.5-flash"]));
        listings.insert("v1beta", models(&["gemini-1.5-pro"]));

        let backend = ScriptedBackend::new(
            listings,
            vec![ModelBinding::new("v1", "gemini-2.0-flash")],
        );

        let binding = resolve(&backend, "gemini-2.0-flash").await.unwrap();
        assert_eq!(binding, ModelBinding::new("v1", "gemini-2.0-flash"));
        // First probe succeeded; nothing else may have been touched.
        assert_eq!(backend.probed().len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_never_probes_a_candidate_twice() {
        let mut listings = HashMap::new();
        listings.insert("v1", models(&["gemini-1.5-flash", "gemini-1.5-pro"]));

        // Nothing accepts: discovery and fallback both run to exhaustion.
        let backend = ScriptedBackend::new(listings, vec![]);
        let err = resolve(&backend, "gemini-1.5-flash").await.unwrap_err();
        assert!(matches!(err, TutorError::Configuration(_)));

        let probed = backend.probed();
        // The fallback pass may legitimately revisit known models, but within
        // the discovery pass each candidate appears exactly once.
        let discovery = &probed[..2];
        let mut seen = discovery.to_vec();
        seen.dedup();
        assert_eq!(seen.len(), discovery.len());
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_known_pairs_when_listing_fails() {
        // Both listings error out; fallback probing still finds a binding.
        let backend = ScriptedBackend::new(
            HashMap::new(),
            vec![ModelBinding::new("v1beta", "gemini-1.5-flash")],
        );

        let binding = resolve(&backend, "gemini-1.5-flash").await.unwrap();
        assert_eq!(binding, ModelBinding::new("v1beta", "gemini-1.5-flash"));

        // Fallback order is version-major: all v1 known models first.
        let probed = backend.probed();
        assert!(probed.len() > KNOWN_MODELS.len());
        assert!(probed[..KNOWN_MODELS.len()]
            .iter()
            .all(|b| b.api_version == "v1"));
    }

    #[tokio::test]
    async fn test_resolve_exhaustion_is_fatal() {
        let backend = ScriptedBackend::new(HashMap::new(), vec![]);
        let err = resolve(&backend, "gemini-1.5-flash").await.unwrap_err();
        assert!(matches!(err, TutorError::Configuration(_)));
        // Every (version, known model) pair was tried exactly once.
        assert_eq!(
            backend.probed().len(),
            API_VERSIONS.len() * KNOWN_MODELS.len()
        );
    }
}
