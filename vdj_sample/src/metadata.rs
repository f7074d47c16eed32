use serde::{Deserialize, Serialize};

/// Opaque description of a sample. Shared between a sample and every sample
/// derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SampleMetadata {
    /// Unique sample identifier.
    pub sample_id: String,
    /// Free-form annotations, in the order they were supplied.
    pub annotations: Vec<(String, String)>,
}

impl SampleMetadata {
    /// Metadata carrying only a sample id.
    pub fn new(sample_id: impl Into<String>) -> Self {
        SampleMetadata {
            sample_id: sample_id.into(),
            annotations: Vec::new(),
        }
    }

    /// Add an annotation.
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.push((key.into(), value.into()));
        self
    }

    /// Value of the first annotation named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.annotations
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
