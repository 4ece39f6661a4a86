//! sqlite-adapter — SQLite implementation of the UserRepository port for local/dev.
//!
//! Purpose
//! - Provide a lightweight, file-based repository to run the system locally
//!   with data that survives restarts.
//! - Implements the `UserRepository` trait from the `domain` crate.
//!
//! Notes
//! - Uses `rusqlite` with the `bundled` feature for portability.
//! - Identity comes from the AUTOINCREMENT rowid, so ids stay sequential from
//!   1 in creation order and keep increasing across process restarts.

use std::path::Path;

use domain::{CoreError, NewUser, User, UserRepository};
use rusqlite::{params, Connection};

/// SQLite-backed repository for local development.
pub struct SqliteUserRepo {
    conn: std::sync::Mutex<Connection>,
}

impl SqliteUserRepo {
    /// Open (or create) a SQLite database at the given path and ensure schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        // Ensure the parent directory exists; a bare filename has none.
        if let Some(dir) = path.as_ref().parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        let conn = Connection::open(path).map_err(map_sqerr)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: std::sync::Mutex::new(conn),
        })
    }
}

fn init_schema(conn: &Connection) -> Result<(), CoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL
        );
        "#,
    )
    .map_err(map_sqerr)
}

fn map_sqerr<E: std::fmt::Display>(e: E) -> CoreError {
    CoreError::Repository(format!("sqlite error: {e}"))
}

fn row_to_user(row: &rusqlite::Row) -> Result<User, CoreError> {
    let id: i64 = row.get(0).map_err(map_sqerr)?;
    let name: String = row.get(1).map_err(map_sqerr)?;
    let email: String = row.get(2).map_err(map_sqerr)?;
    Ok(User {
        id: id as u64,
        name,
        email,
    })
}

impl UserRepository for SqliteUserRepo {
    fn create(&self, input: NewUser) -> Result<User, CoreError> {
        // Lock held across insert and last_insert_rowid so the id read
        // belongs to this insert.
        let conn = self
            .conn
            .lock()
            .map_err(|_| CoreError::Repository("mutex poisoned".into()))?;
        conn.execute(
            "INSERT INTO users(name, email) VALUES (?1, ?2)",
            params![input.name, input.email],
        )
        .map_err(map_sqerr)?;
        let id = conn.last_insert_rowid() as u64;
        Ok(User {
            id,
            name: input.name,
            email: input.email,
        })
    }

    fn list(&self) -> Result<Vec<User>, CoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| CoreError::Repository("mutex poisoned".into()))?;
        let mut stmt = conn
            .prepare("SELECT id, name, email FROM users ORDER BY id ASC")
            .map_err(map_sqerr)?;
        let mut rows = stmt.query([]).map_err(map_sqerr)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(map_sqerr)? {
            out.push(row_to_user(row)?);
        }
        Ok(out)
    }
}
