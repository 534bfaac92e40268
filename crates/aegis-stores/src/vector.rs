//! SQLite vector store: embeddings as f32 BLOBs, brute-force cosine top-K.
//!
//! The corpus is small (one row per confirmed control), so a full scan with
//! cosine computed in Rust beats carrying a vector-index extension.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;

use aegis_core::errors::{AegisResult, StoreError};
use aegis_core::models::{CandidateControl, Risk};
use aegis_core::traits::IVectorStore;

use crate::to_store_err;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS control_vectors (
    control_id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    payload TEXT NOT NULL,
    embedding BLOB NOT NULL,
    dimensions INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_control_vectors_user ON control_vectors(user_id);

CREATE TABLE IF NOT EXISTS risk_vectors (
    risk_id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    payload TEXT NOT NULL,
    embedding BLOB NOT NULL,
    dimensions INTEGER NOT NULL
);
";

pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    pub fn open(path: &Path) -> AegisResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_store_err(e.to_string()))?;
        Self::initialize(conn)
    }

    pub fn open_in_memory() -> AegisResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_store_err(e.to_string()))?;
        Self::initialize(conn)
    }

    fn initialize(conn: Connection) -> AegisResult<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| to_store_err(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> AegisResult<T>) -> AegisResult<T> {
        let conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());
        f(&conn)
    }

    fn upsert(
        &self,
        table: &str,
        key_column: &str,
        key: &str,
        user_id: &str,
        payload: &str,
        embedding: &[f32],
    ) -> AegisResult<()> {
        let blob = f32_vec_to_bytes(embedding);
        let dims = embedding.len() as i64;
        let sql = format!(
            "INSERT INTO {table} ({key_column}, user_id, payload, embedding, dimensions)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT({key_column}) DO UPDATE SET
               user_id = excluded.user_id,
               payload = excluded.payload,
               embedding = excluded.embedding,
               dimensions = excluded.dimensions"
        );
        self.with_conn(|conn| {
            conn.execute(&sql, params![key, user_id, payload, blob, dims])
                .map_err(|e| to_store_err(e.to_string()))?;
            Ok(())
        })
    }

    fn scan<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
        query_embedding: &[f32],
        limit: usize,
    ) -> AegisResult<Vec<(T, f64)>> {
        // Zero-norm queries match nothing.
        let query_norm_sq: f64 = query_embedding
            .iter()
            .map(|x| f64::from(*x) * f64::from(*x))
            .sum();
        if query_norm_sq == 0.0 || query_embedding.is_empty() {
            return Ok(Vec::new());
        }

        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(sql)
                .map_err(|e| to_store_err(e.to_string()))?;
            let rows = stmt
                .query_map(params, |row| {
                    let payload: String = row.get(0)?;
                    let blob: Vec<u8> = row.get(1)?;
                    let dims: i64 = row.get(2)?;
                    Ok((payload, blob, dims))
                })
                .map_err(|e| to_store_err(e.to_string()))?;

            let mut scored: Vec<(String, f64)> = Vec::new();
            for row in rows {
                let (payload, blob, dims) = row.map_err(|e| to_store_err(e.to_string()))?;
                // Skip dimension mismatches without deserializing the vector.
                if dims as usize != query_embedding.len() {
                    continue;
                }
                let stored = bytes_to_f32_vec(&blob, dims as usize);
                let sim = cosine_similarity(query_embedding, &stored);
                if sim > 0.0 {
                    scored.push((payload, sim));
                }
            }

            scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            scored.truncate(limit);

            let mut results = Vec::with_capacity(scored.len());
            for (payload, sim) in scored {
                let record: T = serde_json::from_str(&payload).map_err(|e| StoreError::Serialization {
                    reason: e.to_string(),
                })?;
                results.push((record, sim));
            }
            Ok(results)
        })
    }
}

impl IVectorStore for SqliteVectorStore {
    fn upsert_control_embedding(
        &self,
        control: &CandidateControl,
        embedding: &[f32],
    ) -> AegisResult<()> {
        let payload = serde_json::to_string(control).map_err(|e| StoreError::Serialization {
            reason: e.to_string(),
        })?;
        self.upsert(
            "control_vectors",
            "control_id",
            &control.id,
            &control.user_id,
            &payload,
            embedding,
        )
    }

    fn upsert_risk_embedding(&self, risk: &Risk, embedding: &[f32]) -> AegisResult<()> {
        let payload = serde_json::to_string(risk).map_err(|e| StoreError::Serialization {
            reason: e.to_string(),
        })?;
        self.upsert(
            "risk_vectors",
            "risk_id",
            &risk.id,
            &risk.user_id,
            &payload,
            embedding,
        )
    }

    fn search_controls(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> AegisResult<Vec<(CandidateControl, f64)>> {
        self.scan(
            "SELECT payload, embedding, dimensions FROM control_vectors",
            &[],
            embedding,
            limit,
        )
    }

    fn search_user_controls(
        &self,
        user_id: &str,
        embedding: &[f32],
        limit: usize,
    ) -> AegisResult<Vec<(CandidateControl, f64)>> {
        self.scan(
            "SELECT payload, embedding, dimensions FROM control_vectors WHERE user_id = ?1",
            &[&user_id],
            embedding,
            limit,
        )
    }

    fn search_risks(&self, embedding: &[f32], limit: usize) -> AegisResult<Vec<(Risk, f64)>> {
        self.scan(
            "SELECT payload, embedding, dimensions FROM risk_vectors",
            &[],
            embedding,
            limit,
        )
    }
}

fn f32_vec_to_bytes(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn bytes_to_f32_vec(bytes: &[u8], dims: usize) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .take(dims)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
