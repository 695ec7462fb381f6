//! Loading of the optional classifier, scaler, feature ordering, and blacklist.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::config::ModelSettings;
use crate::types::FeatureVector;

#[cfg(feature = "ml-scoring")]
use ort::session::Session;

/// Per-feature standardization: `(x - mean) / std`.
#[derive(Debug, Clone, Deserialize)]
struct Scaler {
    mean: Vec<f64>,
    std: Vec<f64>,
}

/// Everything the Scoring Engine needs to run model inference, loaded once at
/// startup. Any piece may be absent; absence of the session alone is enough
/// to force fallback-only mode.
pub struct ModelArtifacts {
    #[cfg(feature = "ml-scoring")]
    session: Option<Session>,
    feature_names: Vec<String>,
    scaler: Option<Scaler>,
    blacklist: HashSet<String>,
}

impl std::fmt::Debug for ModelArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifacts")
            .field("loaded", &self.is_model_loaded())
            .field("feature_names", &self.feature_names.len())
            .field("scaler", &self.scaler.is_some())
            .field("blacklist", &self.blacklist.len())
            .finish()
    }
}

impl ModelArtifacts {
    /// Load whatever artifacts are present and parseable. Missing or
    /// unparseable files are logged and skipped rather than treated as fatal.
    #[must_use]
    pub fn load(settings: &ModelSettings) -> Self {
        let feature_names = settings
            .features_path
            .as_deref()
            .and_then(|path| load_json::<Vec<String>>(path, "feature names"))
            .unwrap_or_default();

        let scaler = settings
            .scaler_path
            .as_deref()
            .and_then(|path| load_json::<Scaler>(path, "scaler"));

        let blacklist = settings
            .blacklist_path
            .as_deref()
            .and_then(|path| load_json::<Vec<String>>(path, "blacklist"))
            .map(|addrs| addrs.into_iter().map(|a| a.to_lowercase()).collect())
            .unwrap_or_default();

        #[cfg(feature = "ml-scoring")]
        let session = settings.model_path.as_deref().and_then(|path| {
            Session::builder()
                .and_then(|builder| builder.commit_from_file(path))
                .map_err(|err| {
                    tracing::warn!(error = %err, path, "failed to load scoring model, running in fallback-only mode");
                    err
                })
                .ok()
        });

        Self {
            #[cfg(feature = "ml-scoring")]
            session,
            feature_names,
            scaler,
            blacklist,
        }
    }

    /// Artifacts with nothing loaded; the engine always runs the rule-based
    /// fallback against these.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            #[cfg(feature = "ml-scoring")]
            session: None,
            feature_names: Vec::new(),
            scaler: None,
            blacklist: HashSet::new(),
        }
    }

    #[must_use]
    pub fn is_model_loaded(&self) -> bool {
        #[cfg(feature = "ml-scoring")]
        {
            self.session.is_some()
        }
        #[cfg(not(feature = "ml-scoring"))]
        {
            false
        }
    }

    #[must_use]
    pub fn is_blacklisted(&self, wallet_canonical: &str) -> bool {
        self.blacklist.contains(wallet_canonical)
    }

    /// Map a feature vector to the model's declared feature order, applying
    /// the scaler when present.
    #[must_use]
    pub fn mapped_row(&self, features: &FeatureVector) -> Vec<f64> {
        let raw: Vec<f64> = self
            .feature_names
            .iter()
            .map(|name| features.get_by_name(name))
            .collect();
        match &self.scaler {
            Some(scaler) => raw
                .iter()
                .enumerate()
                .map(|(i, value)| {
                    let mean = scaler.mean.get(i).copied().unwrap_or(0.0);
                    let std = scaler.std.get(i).copied().unwrap_or(1.0);
                    if std == 0.0 { 0.0 } else { (value - mean) / std }
                })
                .collect(),
            None => raw,
        }
    }

    /// Run the loaded model on an already-mapped, already-scaled row and
    /// return the positive-class probability in `[0, 1]`.
    #[cfg(feature = "ml-scoring")]
    pub fn infer(&self, row: &[f64]) -> Option<f64> {
        use ndarray::Array2;
        use ort::value::Tensor;

        let session = self.session.as_ref()?;
        let input = Array2::from_shape_vec((1, row.len()), row.to_vec()).ok()?;
        let tensor = Tensor::from_array(input).ok()?;
        let outputs = session.run(ort::inputs![tensor]).ok()?;
        let (_, values) = outputs.iter().next()?.1.try_extract_tensor::<f32>().ok()?;
        let values: Vec<f64> = values.iter().map(|v| *v as f64).collect();
        Some(positive_class_probability(&values))
    }

    #[cfg(not(feature = "ml-scoring"))]
    pub fn infer(&self, _row: &[f64]) -> Option<f64> {
        None
    }
}

/// Interpret raw model output per the three documented shapes: a two-element
/// probability vector, a single logit (sigmoid-converted), or a probability
/// vector whose argmax is taken.
#[must_use]
pub fn positive_class_probability(values: &[f64]) -> f64 {
    match values {
        [] => 0.5,
        [logit] => 1.0 / (1.0 + (-logit).exp()),
        [_, positive] => *positive,
        many => many.iter().cloned().fold(f64::MIN, f64::max),
    }
}

fn load_json<T: for<'de> Deserialize<'de>>(path: &str, what: &str) -> Option<T> {
    if !Path::new(path).exists() {
        tracing::warn!(path, what, "model artifact not found, skipping");
        return None;
    }
    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(path, what, error = %err, "failed to parse model artifact");
                None
            }
        },
        Err(err) => {
            tracing::warn!(path, what, error = %err, "failed to read model artifact");
            None
        }
    }
}
