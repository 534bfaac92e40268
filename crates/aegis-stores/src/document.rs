//! SQLite document store: canonical control/risk/profile records plus
//! durable selection sessions.
//!
//! Records are stored as JSON payloads with the filterable fields broken
//! out into indexed columns. All upserts are `ON CONFLICT DO UPDATE`, so
//! retrying a write is safe.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use aegis_core::errors::{AegisResult, StoreError};
use aegis_core::models::{ConfirmedControl, Risk, SelectionSession, SessionStatus, UserProfile};
use aegis_core::traits::{IDocumentStore, ISessionStore};

use crate::to_store_err;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS controls (
    id TEXT PRIMARY KEY,
    control_code TEXT NOT NULL,
    user_id TEXT NOT NULL,
    risk_id TEXT NOT NULL,
    annex_reference TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    implementation_guidance TEXT NOT NULL,
    payload TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_controls_user ON controls(user_id);
CREATE INDEX IF NOT EXISTS idx_controls_risk ON controls(risk_id);

CREATE TABLE IF NOT EXISTS risks (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    category TEXT NOT NULL,
    payload TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_risks_user ON risks(user_id);

CREATE TABLE IF NOT EXISTS profiles (
    user_id TEXT PRIMARY KEY,
    payload TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    status TEXT NOT NULL,
    payload TEXT NOT NULL
);
";

/// Document + session store over a single SQLite database.
pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    /// Open a file-backed store, creating the schema if needed.
    pub fn open(path: &Path) -> AegisResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_store_err(e.to_string()))?;
        Self::initialize(conn)
    }

    /// Open an in-memory store (for tests).
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
}

fn to_json<T: Serialize>(value: &T) -> AegisResult<String> {
    serde_json::to_string(value).map_err(|e| {
        StoreError::Serialization {
            reason: e.to_string(),
        }
        .into()
    })
}

fn from_json<T: DeserializeOwned>(raw: &str) -> AegisResult<T> {
    serde_json::from_str(raw).map_err(|e| {
        StoreError::Serialization {
            reason: e.to_string(),
        }
        .into()
    })
}

fn collect_payloads<T: DeserializeOwned>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> AegisResult<Vec<T>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| to_store_err(e.to_string()))?;
    let rows = stmt
        .query_map(params, |row| row.get::<_, String>(0))
        .map_err(|e| to_store_err(e.to_string()))?;
    let mut out = Vec::new();
    for row in rows {
        let raw = row.map_err(|e| to_store_err(e.to_string()))?;
        out.push(from_json(&raw)?);
    }
    Ok(out)
}

impl IDocumentStore for SqliteDocumentStore {
    fn upsert_control(&self, control: &ConfirmedControl) -> AegisResult<()> {
        let payload = to_json(control)?;
        let c = &control.control;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO controls
                   (id, control_code, user_id, risk_id, annex_reference,
                    title, description, implementation_guidance, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(id) DO UPDATE SET
                   control_code = excluded.control_code,
                   user_id = excluded.user_id,
                   risk_id = excluded.risk_id,
                   annex_reference = excluded.annex_reference,
                   title = excluded.title,
                   description = excluded.description,
                   implementation_guidance = excluded.implementation_guidance,
                   payload = excluded.payload",
                params![
                    c.id,
                    c.control_code,
                    c.user_id,
                    c.risk_id,
                    c.annex_reference,
                    c.title,
                    c.description,
                    c.implementation_guidance,
                    payload,
                ],
            )
            .map_err(|e| to_store_err(e.to_string()))?;
            Ok(())
        })
    }

    fn get_control(&self, id: &str) -> AegisResult<Option<ConfirmedControl>> {
        self.with_conn(|conn| {
            let raw: Option<String> = conn
                .query_row("SELECT payload FROM controls WHERE id = ?1", [id], |row| {
                    row.get(0)
                })
                .optional()
                .map_err(|e| to_store_err(e.to_string()))?;
            raw.map(|r| from_json(&r)).transpose()
        })
    }

    fn controls_by_risk(&self, risk_id: &str, user_id: &str) -> AegisResult<Vec<ConfirmedControl>> {
        self.with_conn(|conn| {
            collect_payloads(
                conn,
                "SELECT payload FROM controls WHERE risk_id = ?1 AND user_id = ?2",
                &[&risk_id, &user_id],
            )
        })
    }

    fn controls_by_user(&self, user_id: &str) -> AegisResult<Vec<ConfirmedControl>> {
        self.with_conn(|conn| {
            collect_payloads(
                conn,
                "SELECT payload FROM controls WHERE user_id = ?1",
                &[&user_id],
            )
        })
    }

    fn controls_by_category(
        &self,
        category: &str,
        user_id: &str,
    ) -> AegisResult<Vec<ConfirmedControl>> {
        self.with_conn(|conn| {
            collect_payloads(
                conn,
                "SELECT c.payload FROM controls c
                 JOIN risks r ON r.id = c.risk_id
                 WHERE r.category = ?1 AND c.user_id = ?2",
                &[&category, &user_id],
            )
        })
    }

    fn controls_by_reference_prefix(
        &self,
        prefix: &str,
        user_id: &str,
    ) -> AegisResult<Vec<ConfirmedControl>> {
        let pattern = format!("{}%", prefix.replace('%', ""));
        self.with_conn(|conn| {
            collect_payloads(
                conn,
                "SELECT payload FROM controls
                 WHERE annex_reference LIKE ?1 AND user_id = ?2",
                &[&pattern, &user_id],
            )
        })
    }

    fn search_controls_text(
        &self,
        query: &str,
        limit: usize,
    ) -> AegisResult<Vec<ConfirmedControl>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let pattern = format!("%{}%", query.trim().replace('%', ""));
        let limit = limit as i64;
        self.with_conn(|conn| {
            collect_payloads(
                conn,
                "SELECT payload FROM controls
                 WHERE title LIKE ?1 COLLATE NOCASE
                    OR description LIKE ?1 COLLATE NOCASE
                    OR implementation_guidance LIKE ?1 COLLATE NOCASE
                 LIMIT ?2",
                &[&pattern, &limit],
            )
        })
    }

    fn upsert_risk(&self, risk: &Risk) -> AegisResult<()> {
        let payload = to_json(risk)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO risks (id, user_id, category, payload)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                   user_id = excluded.user_id,
                   category = excluded.category,
                   payload = excluded.payload",
                params![risk.id, risk.user_id, risk.category, payload],
            )
            .map_err(|e| to_store_err(e.to_string()))?;
            Ok(())
        })
    }

    fn get_risk(&self, risk_id: &str, user_id: &str) -> AegisResult<Option<Risk>> {
        self.with_conn(|conn| {
            let raw: Option<String> = conn
                .query_row(
                    "SELECT payload FROM risks WHERE id = ?1 AND user_id = ?2",
                    [risk_id, user_id],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| to_store_err(e.to_string()))?;
            raw.map(|r| from_json(&r)).transpose()
        })
    }

    fn risks_by_user(&self, user_id: &str, exclude_covered: bool) -> AegisResult<Vec<Risk>> {
        let sql = if exclude_covered {
            "SELECT r.payload FROM risks r
             WHERE r.user_id = ?1
               AND NOT EXISTS (SELECT 1 FROM controls c WHERE c.risk_id = r.id)"
        } else {
            "SELECT payload FROM risks WHERE user_id = ?1"
        };
        self.with_conn(|conn| collect_payloads(conn, sql, &[&user_id]))
    }

    fn upsert_profile(&self, profile: &UserProfile) -> AegisResult<()> {
        let payload = to_json(profile)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO profiles (user_id, payload) VALUES (?1, ?2)
                 ON CONFLICT(user_id) DO UPDATE SET payload = excluded.payload",
                params![profile.user_id, payload],
            )
            .map_err(|e| to_store_err(e.to_string()))?;
            Ok(())
        })
    }

    fn get_profile(&self, user_id: &str) -> AegisResult<Option<UserProfile>> {
        self.with_conn(|conn| {
            let raw: Option<String> = conn
                .query_row(
                    "SELECT payload FROM profiles WHERE user_id = ?1",
                    [user_id],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| to_store_err(e.to_string()))?;
            raw.map(|r| from_json(&r)).transpose()
        })
    }
}

impl ISessionStore for SqliteDocumentStore {
    fn save(&self, session: &SelectionSession) -> AegisResult<()> {
        let payload = to_json(session)?;
        let status = match session.status {
            SessionStatus::Pending => "pending",
            SessionStatus::Stored => "stored",
        };
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions (id, user_id, status, payload)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                   user_id = excluded.user_id,
                   status = excluded.status,
                   payload = excluded.payload",
                params![session.id, session.user_id, status, payload],
            )
            .map_err(|e| to_store_err(e.to_string()))?;
            Ok(())
        })
    }

    fn get(&self, session_id: &str) -> AegisResult<Option<SelectionSession>> {
        self.with_conn(|conn| {
            let row: Option<(String, String)> = conn
                .query_row(
                    "SELECT payload, status FROM sessions WHERE id = ?1",
                    [session_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()
                .map_err(|e| to_store_err(e.to_string()))?;
            match row {
                None => Ok(None),
                Some((payload, status)) => {
                    let mut session: SelectionSession = from_json(&payload)?;
                    // The status column is the truth: a CAS claim updates it
                    // without rewriting the payload.
                    session.status = if status == "stored" {
                        SessionStatus::Stored
                    } else {
                        SessionStatus::Pending
                    };
                    Ok(Some(session))
                }
            }
        })
    }

    fn claim(&self, session_id: &str) -> AegisResult<bool> {
        self.with_conn(|conn| {
            let flipped = conn
                .execute(
                    "UPDATE sessions SET status = 'stored'
                     WHERE id = ?1 AND status = 'pending'",
                    [session_id],
                )
                .map_err(|e| to_store_err(e.to_string()))?;
            if flipped == 1 {
                return Ok(true);
            }
            let exists: Option<String> = conn
                .query_row(
                    "SELECT id FROM sessions WHERE id = ?1",
                    [session_id],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| to_store_err(e.to_string()))?;
            match exists {
                Some(_) => Ok(false),
                None => Err(StoreError::SessionNotFound {
                    session_id: session_id.to_string(),
                }
                .into()),
            }
        })
    }

    fn remove(&self, session_id: &str) -> AegisResult<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM sessions WHERE id = ?1", [session_id])
                .map_err(|e| to_store_err(e.to_string()))?;
            Ok(())
        })
    }

    fn session_ids(&self) -> AegisResult<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT id FROM sessions")
                .map_err(|e| to_store_err(e.to_string()))?;
            let rows = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(|e| to_store_err(e.to_string()))?;
            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|e| to_store_err(e.to_string()).into())
        })
    }
}
