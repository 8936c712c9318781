//! Persisted index artifact: four aspect indices plus the order table,
//! in a single SQLite file.
//!
//! Row position is the lookup key: `destinations.position` is assigned
//! in catalog iteration order at build time, and every aspect's vectors
//! are read back `ORDER BY position`, so all four indices and the
//! destination table stay positionally aligned by construction. The
//! scoring step depends on that alignment.
//!
//! Writers never touch a live index file; the builder writes a fresh
//! database elsewhere and renames it into place (see `index`).

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use crate::catalog::Destination;
use crate::error::{PlannerError, Result};
use crate::search::aspect::Aspect;

/// Metadata stamped at build time and verified at query time.
#[derive(Debug, Clone)]
pub struct IndexMeta {
    pub model_id: String,
    pub embedding_dim: usize,
    pub destination_count: usize,
    pub built_at: i64,
}

/// One destination's slice of the index: the record plus its four
/// aspect embeddings.
pub struct IndexEntry {
    pub destination: Destination,
    pub embeddings: Vec<(Aspect, Vec<f32>)>,
}

#[derive(Debug)]
pub struct IndexStore {
    conn: Connection,
    path: PathBuf,
}

impl IndexStore {
    /// Create a fresh store for writing. The builder points this at a
    /// temporary path, never at a published index.
    pub fn create(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn,
            path: path.to_path_buf(),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory store for tests.
    pub fn create_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn,
            path: PathBuf::from(":memory:"),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Open a published index read side. A missing file is the distinct
    /// "no index yet" condition, not an empty result set.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PlannerError::IndexUnavailable(path.to_path_buf()));
        }
        let conn = Connection::open(path)?;
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            -- Order table: position is assigned in catalog iteration order
            CREATE TABLE IF NOT EXISTS destinations (
                position INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                record TEXT NOT NULL
            );

            -- Four rows per destination, one per aspect
            CREATE TABLE IF NOT EXISTS embeddings (
                position INTEGER NOT NULL,
                aspect TEXT NOT NULL,
                embedding BLOB NOT NULL,
                PRIMARY KEY (position, aspect),
                FOREIGN KEY (position) REFERENCES destinations(position)
            );

            CREATE TABLE IF NOT EXISTS index_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Write the whole index in one transaction. Either every entry and
    /// the metadata land together or nothing does.
    pub fn write_all(&mut self, entries: &[IndexEntry], meta: &IndexMeta) -> Result<()> {
        let tx = self.conn.transaction()?;

        for (position, entry) in entries.iter().enumerate() {
            let record = serde_json::to_string(&entry.destination).map_err(|source| {
                PlannerError::MalformedRecord {
                    path: self.path.clone(),
                    source,
                }
            })?;
            tx.execute(
                "INSERT INTO destinations (position, name, record) VALUES (?1, ?2, ?3)",
                params![position as i64, entry.destination.name, record],
            )?;

            for (aspect, embedding) in &entry.embeddings {
                tx.execute(
                    "INSERT INTO embeddings (position, aspect, embedding) VALUES (?1, ?2, ?3)",
                    params![position as i64, aspect.as_str(), embedding_to_blob(embedding)],
                )?;
            }
        }

        tx.execute(
            "INSERT INTO index_meta (key, value) VALUES ('model_id', ?1)",
            params![meta.model_id],
        )?;
        tx.execute(
            "INSERT INTO index_meta (key, value) VALUES ('embedding_dim', ?1)",
            params![meta.embedding_dim.to_string()],
        )?;
        tx.execute(
            "INSERT INTO index_meta (key, value) VALUES ('destination_count', ?1)",
            params![meta.destination_count.to_string()],
        )?;
        tx.execute(
            "INSERT INTO index_meta (key, value) VALUES ('built_at', ?1)",
            params![meta.built_at.to_string()],
        )?;

        tx.commit()?;
        Ok(())
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM index_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    fn require_meta(&self, key: &str) -> Result<String> {
        self.get_meta(key)?.ok_or_else(|| PlannerError::CorruptIndex {
            path: self.path.clone(),
            key: key.to_string(),
        })
    }

    pub fn meta(&self) -> Result<IndexMeta> {
        let parse_usize = |key: &str, value: String| {
            value.parse::<usize>().map_err(|_| PlannerError::CorruptIndex {
                path: self.path.clone(),
                key: key.to_string(),
            })
        };

        Ok(IndexMeta {
            model_id: self.require_meta("model_id")?,
            embedding_dim: parse_usize("embedding_dim", self.require_meta("embedding_dim")?)?,
            destination_count: parse_usize(
                "destination_count",
                self.require_meta("destination_count")?,
            )?,
            built_at: self
                .require_meta("built_at")?
                .parse::<i64>()
                .map_err(|_| PlannerError::CorruptIndex {
                    path: self.path.clone(),
                    key: "built_at".to_string(),
                })?,
        })
    }

    /// All destinations, in index position order.
    pub fn destinations(&self) -> Result<Vec<Destination>> {
        let mut stmt = self
            .conn
            .prepare("SELECT record FROM destinations ORDER BY position")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut destinations = Vec::new();
        for row in rows {
            let record = row?;
            let dest =
                serde_json::from_str(&record).map_err(|source| PlannerError::MalformedRecord {
                    path: self.path.clone(),
                    source,
                })?;
            destinations.push(dest);
        }
        Ok(destinations)
    }

    /// One aspect's vectors, in index position order (aligned with
    /// `destinations`).
    pub fn aspect_vectors(&self, aspect: Aspect) -> Result<Vec<Vec<f32>>> {
        let mut stmt = self.conn.prepare(
            "SELECT embedding FROM embeddings WHERE aspect = ?1 ORDER BY position",
        )?;
        let rows = stmt.query_map(params![aspect.as_str()], |row| row.get::<_, Vec<u8>>(0))?;

        let mut vectors = Vec::new();
        for row in rows {
            vectors.push(blob_to_embedding(&row?));
        }
        Ok(vectors)
    }

    pub fn embedding_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM embeddings", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        blob.extend_from_slice(&value.to_le_bytes());
    }
    blob
}

fn blob_to_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_destination(name: &str) -> Destination {
        Destination {
            name: name.into(),
            location: "Pacific Coast".into(),
            state: Some("CA".into()),
            country: "USA".into(),
            description: "Cliffside views".into(),
            activities: vec!["hiking".into()],
            scenery: vec!["cliffs".into()],
            amenities: vec!["restaurants".into()],
            best_season: vec!["Summer".into()],
            travel_time: None,
            nearby_attractions: vec![],
            keywords: vec!["coastal".into()],
        }
    }

    fn sample_entry(name: &str, fill: f32) -> IndexEntry {
        IndexEntry {
            destination: sample_destination(name),
            embeddings: Aspect::ALL
                .iter()
                .map(|&aspect| (aspect, vec![fill; 4]))
                .collect(),
        }
    }

    fn sample_meta(count: usize) -> IndexMeta {
        IndexMeta {
            model_id: "test-model".into(),
            embedding_dim: 4,
            destination_count: count,
            built_at: 1_700_000_000,
        }
    }

    #[test]
    fn blob_codec_round_trips() {
        let embedding = vec![1.0, -0.5, 0.25, 3.5];
        assert_eq!(blob_to_embedding(&embedding_to_blob(&embedding)), embedding);
    }

    #[test]
    fn written_index_reads_back_aligned() {
        let mut store = IndexStore::create_in_memory().unwrap();
        let entries = vec![sample_entry("Big Sur", 0.5), sample_entry("Mendocino", -0.5)];
        store.write_all(&entries, &sample_meta(2)).unwrap();

        let destinations = store.destinations().unwrap();
        assert_eq!(destinations.len(), 2);
        assert_eq!(destinations[0].name, "Big Sur");
        assert_eq!(destinations[1].name, "Mendocino");

        for aspect in Aspect::ALL {
            let vectors = store.aspect_vectors(aspect).unwrap();
            assert_eq!(vectors.len(), 2);
            assert_eq!(vectors[0], vec![0.5; 4]);
            assert_eq!(vectors[1], vec![-0.5; 4]);
        }

        assert_eq!(store.embedding_count().unwrap(), 8);
    }

    #[test]
    fn meta_round_trips() {
        let mut store = IndexStore::create_in_memory().unwrap();
        store
            .write_all(&[sample_entry("Solo", 1.0)], &sample_meta(1))
            .unwrap();

        let meta = store.meta().unwrap();
        assert_eq!(meta.model_id, "test-model");
        assert_eq!(meta.embedding_dim, 4);
        assert_eq!(meta.destination_count, 1);
        assert_eq!(meta.built_at, 1_700_000_000);
    }

    #[test]
    fn missing_meta_is_corrupt_not_missing_index() {
        let store = IndexStore::create_in_memory().unwrap();
        let err = store.meta().unwrap_err();
        assert!(matches!(err, PlannerError::CorruptIndex { .. }));
    }

    #[test]
    fn opening_a_missing_index_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = IndexStore::open(&dir.path().join("no-such.db")).unwrap_err();
        assert!(matches!(err, PlannerError::IndexUnavailable(_)));
    }
}
