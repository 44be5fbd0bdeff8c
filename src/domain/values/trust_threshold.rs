use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum squared Euclidean distance at which a retrieval hit is trusted.
///
/// Thresholds only mean something for the embedding model they were tuned
/// against, which is why [`TrustThreshold::for_model`] refuses to guess for
/// models it does not know.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrustThreshold(f32);

/// Tuned thresholds, keyed by embedding model id. All models listed emit
/// unit-length vectors, so squared distance lies in `[0, 4]`.
const TUNED: &[(&str, f32)] = &[
    ("hashing-v2", 0.9),
    ("all-minilm", 0.7),
    ("all-MiniLM-L6-v2", 0.7),
    ("nomic-embed-text", 0.6),
    ("text-embedding-3-small", 0.9),
    ("voyage-4-lite", 0.8),
    ("voyage-3-lite", 0.8),
    ("voyage-3", 0.8),
];

impl TrustThreshold {
    pub fn new(value: f32) -> Result<Self, String> {
        if !value.is_finite() || value < 0.0 {
            return Err(format!(
                "Trust threshold must be a finite, non-negative distance, got {value}"
            ));
        }
        Ok(TrustThreshold(value))
    }

    /// The tuned threshold for `model_id`. Ollama-style tags (`all-minilm:latest`) match their base name.
    pub fn for_model(model_id: &str) -> Option<Self> {
        let base = model_id.split(':').next().unwrap_or(model_id);
        TUNED
            .iter()
            .find(|(m, _)| *m == base)
            .map(|(_, v)| TrustThreshold(*v))
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    /// Distance-based gate: closer than or equal to the threshold is trusted.
    pub fn trusts(&self, distance: f32) -> bool {
        distance <= self.0
    }
}

impl fmt::Display for TrustThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        assert!(TrustThreshold::new(0.0).is_ok());
        assert!(TrustThreshold::new(0.7).is_ok());
        assert!(TrustThreshold::new(-0.1).is_err());
        assert!(TrustThreshold::new(f32::NAN).is_err());
    }

    #[test]
    fn test_gate_is_inclusive() {
        let t = TrustThreshold::new(0.5).unwrap();
        assert!(t.trusts(0.5));
        assert!(t.trusts(0.1));
        assert!(!t.trusts(0.51));
    }

    #[test]
    fn test_known_models() {
        assert_eq!(TrustThreshold::for_model("all-minilm:latest").unwrap().value(), 0.7);
        assert_eq!(TrustThreshold::for_model("hashing-v2").unwrap().value(), 0.9);
        assert!(TrustThreshold::for_model("hashing-v1").is_none());
        assert!(TrustThreshold::for_model("some-new-model").is_none());
    }
}
