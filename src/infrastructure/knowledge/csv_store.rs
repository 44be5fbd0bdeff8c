use crate::domain::entities::knowledge_row::KnowledgeRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::knowledge_source::KnowledgeSource;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

/// Header names accepted for the answer text, in order of preference.
pub const TEXT_COLUMNS: &[&str] = &["answer", "text", "content"];

/// Knowledge store backed by a CSV file with a header row.
///
/// Schema: one of [`TEXT_COLUMNS`] is required and becomes the row text.
/// Every other column (`question`, `department`, `keywords`, ...) is kept as
/// metadata when non-empty. Header names are matched case-insensitively.
pub struct CsvKnowledgeStore {
    path: PathBuf,
}

impl CsvKnowledgeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse records from any reader; `origin` only labels error messages.
    pub fn parse<R: Read>(reader: R, origin: &str) -> Result<Vec<KnowledgeRecord>, DomainError> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers: Vec<String> = csv
            .headers()
            .map_err(|e| DomainError::KnowledgeStore(format!("{origin}: unreadable header: {e}")))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_lowercase())
            .collect();

        let text_col = TEXT_COLUMNS
            .iter()
            .find_map(|name| headers.iter().position(|h| h == name))
            .ok_or_else(|| {
                DomainError::KnowledgeStore(format!(
                    "{origin}: missing required column (one of: {}); found: {}",
                    TEXT_COLUMNS.join(", "),
                    headers.join(", ")
                ))
            })?;

        let mut records = Vec::new();
        for (i, result) in csv.records().enumerate() {
            let record = result.map_err(|e| {
                DomainError::KnowledgeStore(format!("{origin}: malformed record {}: {e}", i + 1))
            })?;

            let mut metadata = BTreeMap::new();
            for (col, value) in record.iter().enumerate() {
                let value = value.trim();
                if col != text_col && !value.is_empty() && !headers[col].is_empty() {
                    metadata.insert(headers[col].clone(), value.to_string());
                }
            }
            records.push(KnowledgeRecord {
                text: record.get(text_col).unwrap_or_default().to_string(),
                metadata,
            });
        }

        debug!(origin, records = records.len(), "Parsed knowledge CSV");
        Ok(records)
    }
}

impl KnowledgeSource for CsvKnowledgeStore {
    fn load_records(&self) -> Result<Vec<KnowledgeRecord>, DomainError> {
        let file = std::fs::File::open(&self.path).map_err(|e| {
            DomainError::KnowledgeStore(format!("cannot open {}: {e}", self.path.display()))
        })?;
        Self::parse(file, &self.path.display().to_string())
    }
}
