use crate::domain::entities::knowledge_index::KnowledgeIndex;
use crate::domain::entities::knowledge_row::KnowledgeRow;
use crate::domain::entities::side_table::{IndexHeader, SideTable};
use crate::domain::entities::vector_index::METRIC;
use crate::domain::error::DomainError;
use crate::domain::ports::index_repository::IndexRepository;
use crate::infrastructure::sqlite::vector_store::SqliteVectorStore;
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

pub const VECTORS_FILE: &str = "vectors.sqlite";
pub const ROWS_FILE: &str = "rows.json";

/// `rows.json` as found on disk; rows are re-sorted through [`SideTable::new`].
#[derive(Deserialize)]
struct StoredSideTable {
    header: IndexHeader,
    rows: Vec<KnowledgeRow>,
}

/// Stores the index as two files in one directory: `vectors.sqlite` and `rows.json`.
///
/// Saving writes both into a fresh staging directory next to the target and
/// then swaps directories by rename, so readers see the old pair, the new
/// pair, or (during the swap) no pair, never a mix.
pub struct FsIndexRepository {
    dir: PathBuf,
}

impl FsIndexRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn vectors_path(&self) -> PathBuf {
        self.dir.join(VECTORS_FILE)
    }

    pub fn rows_path(&self) -> PathBuf {
        self.dir.join(ROWS_FILE)
    }

    fn parent(&self) -> &Path {
        match self.dir.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn sibling_prefix(&self, tag: &str) -> String {
        let name = self
            .dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "index".to_string());
        format!(".{name}.{tag}-")
    }

    fn sibling(&self, tag: &str) -> PathBuf {
        let prefix = self.sibling_prefix(tag);
        self.parent()
            .join(format!("{prefix}{}", uuid::Uuid::new_v4().simple()))
    }

    /// Retired index directories left behind by a save that died between its two renames.
    pub fn leftover_retired(&self) -> Vec<PathBuf> {
        let prefix = self.sibling_prefix("old");
        let Ok(entries) = fs::read_dir(self.parent()) else {
            return Vec::new();
        };
        let mut found: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(&prefix))
            .map(|e| e.path())
            .collect();
        found.sort();
        found
    }

    fn write_pair(dir: &Path, index: &KnowledgeIndex) -> Result<(), DomainError> {
        SqliteVectorStore::write(&dir.join(VECTORS_FILE), index.vectors(), index.model_id())?;

        let file = File::create(dir.join(ROWS_FILE))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, index.table())
            .map_err(|e| DomainError::Storage(format!("cannot write side table: {e}")))?;
        writer.flush()?;
        writer
            .into_inner()
            .map_err(|e| DomainError::Io(e.into_error()))?
            .sync_all()?;
        Ok(())
    }

    fn swap_in(&self, staging: &Path) -> Result<(), DomainError> {
        if !self.dir.exists() {
            fs::rename(staging, &self.dir)?;
            return Ok(());
        }

        let retired = self.sibling("old");
        fs::rename(&self.dir, &retired)?;
        if let Err(e) = fs::rename(staging, &self.dir) {
            // Put the previous pair back rather than leave nothing behind.
            if let Err(restore) = fs::rename(&retired, &self.dir) {
                error!(
                    retired = %retired.display(),
                    dir = %self.dir.display(),
                    error = %restore,
                    "Could not restore previous index; move it back by hand"
                );
            }
            return Err(e.into());
        }
        if let Err(e) = fs::remove_dir_all(&retired) {
            warn!(path = %retired.display(), error = %e, "Could not remove previous index");
        }
        Ok(())
    }
}

impl IndexRepository for FsIndexRepository {
    fn save(&self, index: &KnowledgeIndex) -> Result<(), DomainError> {
        if let Some(parent) = self.dir.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let staging = self.sibling("staging");
        fs::create_dir(&staging)?;
        debug!(staging = %staging.display(), "Writing index artifacts");

        let result = Self::write_pair(&staging, index).and_then(|_| self.swap_in(&staging));
        if result.is_err() {
            let _ = fs::remove_dir_all(&staging);
        } else {
            info!(dir = %self.dir.display(), rows = index.len(), "Index artifacts saved");
        }
        result
    }

    fn load(&self) -> Result<KnowledgeIndex, DomainError> {
        for retired in self.leftover_retired() {
            warn!(
                path = %retired.display(),
                dir = %self.dir.display(),
                "Found a retired index from an interrupted save"
            );
        }

        let vectors_path = self.vectors_path();
        let rows_path = self.rows_path();
        for path in [&vectors_path, &rows_path] {
            if !path.is_file() {
                return Err(DomainError::IndexArtifactMissing(path.clone()));
            }
        }

        let (vectors, meta) = SqliteVectorStore::read(&vectors_path)?;
        let stored: StoredSideTable = serde_json::from_reader(BufReader::new(File::open(&rows_path)?))
            .map_err(|e| DomainError::IndexCorrupt(format!("unreadable side table: {e}")))?;
        let table = SideTable::new(stored.header, stored.rows);

        if meta.model_id != table.header.model_id {
            return Err(DomainError::IndexCorrupt(format!(
                "vector file was built with '{}' but side table with '{}'",
                meta.model_id, table.header.model_id
            )));
        }
        for (artifact, metric) in [("vector file", &meta.metric), ("side table", &table.header.metric)] {
            if metric != METRIC {
                return Err(DomainError::IndexCorrupt(format!(
                    "{artifact} was built for metric '{metric}', expected '{METRIC}'"
                )));
            }
        }

        let index = KnowledgeIndex::new(vectors, table)?;
        info!(
            dir = %self.dir.display(),
            rows = index.len(),
            dimension = index.dimension(),
            model = %index.model_id(),
            "Index loaded"
        );
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leftover_retired_dirs_are_found() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = FsIndexRepository::new(tmp.path().join("index_store"));
        assert!(repo.leftover_retired().is_empty());

        fs::create_dir(tmp.path().join(".index_store.old-1234")).unwrap();
        fs::create_dir(tmp.path().join(".index_store.staging-5678")).unwrap();
        fs::create_dir(tmp.path().join(".other.old-9")).unwrap();

        assert_eq!(
            repo.leftover_retired(),
            vec![tmp.path().join(".index_store.old-1234")]
        );
    }

    #[test]
    fn test_sibling_lives_next_to_index_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = FsIndexRepository::new(tmp.path().join("index_store"));
        let staging = repo.sibling("staging");
        assert_eq!(staging.parent(), Some(tmp.path()));
        assert!(staging
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(".index_store.staging-"));
    }
}
