//! Feature extraction: turn a wallet's event history into a [`FeatureVector`].
//!
//! [`FeatureVector`]: crate::types::FeatureVector

mod extractor;

pub use extractor::{FeatureExtractor, compute_features};
