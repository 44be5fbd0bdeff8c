use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A record read from the knowledge store, before the builder assigns it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    pub text: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl KnowledgeRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The text user queries are matched against: the row's question when
    /// the source has one, otherwise the answer text itself.
    pub fn match_text(&self) -> &str {
        self.metadata
            .get("question")
            .map(|q| q.trim())
            .filter(|q| !q.is_empty())
            .unwrap_or(self.text.as_str())
    }
}

/// One indexed, answerable piece of knowledge. Immutable once the index is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeRow {
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl KnowledgeRow {
    pub fn from_record(id: u64, record: KnowledgeRecord) -> Self {
        Self {
            id,
            text: record.text,
            metadata: record.metadata,
        }
    }

    /// Category/topic tag, if the source table carried one.
    pub fn topic(&self) -> Option<&str> {
        self.metadata
            .get("department")
            .or_else(|| self.metadata.get("category"))
            .or_else(|| self.metadata.get("topic"))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_text_prefers_question() {
        let record = KnowledgeRecord::new("Mess is open 24/7").with_meta("question", " When is the mess open? ");
        assert_eq!(record.match_text(), "When is the mess open?");
    }

    #[test]
    fn test_match_text_falls_back_to_text() {
        assert_eq!(KnowledgeRecord::new("Mess is open 24/7").match_text(), "Mess is open 24/7");
        let blank = KnowledgeRecord::new("Mess is open 24/7").with_meta("question", "  ");
        assert_eq!(blank.match_text(), "Mess is open 24/7");
    }
}
