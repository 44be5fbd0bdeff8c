use crate::domain::entities::vector_index::{VectorIndex, METRIC};
use crate::domain::error::DomainError;
use crate::infrastructure::sqlite::migrations::run_migrations;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;

/// The vector half of a persisted index: one SQLite file holding every
/// vector as a little-endian f32 blob plus the dimension and model it was built with.
pub struct SqliteVectorStore;

/// What the vector file says about itself.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorFileMeta {
    pub dimension: usize,
    pub model_id: String,
    pub metric: String,
}

impl SqliteVectorStore {
    pub fn write(path: &Path, index: &VectorIndex, model_id: &str) -> Result<(), DomainError> {
        let mut conn = Connection::open(path)?;
        run_migrations(&conn).map_err(DomainError::Storage)?;

        let tx = conn.transaction()?;
        {
            let mut insert = tx.prepare("INSERT INTO vectors (id, vector) VALUES (?1, ?2)")?;
            for (id, vector) in index.iter() {
                insert.execute(params![id as i64, Self::serialize_vector(vector)])?;
            }

            let mut meta = tx.prepare("INSERT OR REPLACE INTO index_meta (key, value) VALUES (?1, ?2)")?;
            meta.execute(params!["dimension", index.dimension().to_string()])?;
            meta.execute(params!["model_id", model_id])?;
            meta.execute(params!["metric", METRIC])?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<(VectorIndex, VectorFileMeta), DomainError> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;

        let meta = VectorFileMeta {
            dimension: Self::meta_value(&conn, "dimension")?
                .parse()
                .map_err(|e| DomainError::IndexCorrupt(format!("bad dimension in vector file: {e}")))?,
            model_id: Self::meta_value(&conn, "model_id")?,
            metric: Self::meta_value(&conn, "metric")?,
        };

        let mut stmt = conn.prepare("SELECT id, vector FROM vectors ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let blob: Vec<u8> = row.get(1)?;
            Ok((id, blob))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, blob) = row?;
            let vector = Self::deserialize_vector(&blob).ok_or_else(|| {
                DomainError::IndexCorrupt(format!("vector {id} has a truncated blob"))
            })?;
            entries.push((id as u64, vector));
        }

        let index = VectorIndex::from_vectors(meta.dimension, entries).map_err(|e| match e {
            DomainError::DimensionMismatch { expected, actual } => DomainError::IndexCorrupt(format!(
                "vector file declares dimension {expected} but holds a vector of {actual}"
            )),
            other => other,
        })?;
        Ok((index, meta))
    }

    fn meta_value(conn: &Connection, key: &str) -> Result<String, DomainError> {
        conn.query_row(
            "SELECT value FROM index_meta WHERE key = ?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?
        .ok_or_else(|| DomainError::IndexCorrupt(format!("vector file has no '{key}' entry")))
    }

    fn serialize_vector(v: &[f32]) -> Vec<u8> {
        v.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_vector(bytes: &[u8]) -> Option<Vec<f32>> {
        if bytes.len() % 4 != 0 {
            return None;
        }
        Some(
            bytes
                .chunks_exact(4)
                .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect(),
        )
    }
}
