use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use strengths_api::db::{migrations::MIGRATIONS, Built};
use strengths_api::{
    service, AdminUserSummary, ChatMessage, ChatMode, ChatRole, ConversationSummary, TeamMember,
    UserProfile, UserRole,
};

/// Shared database state
#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
}

impl Db {
    /// Lock the connection. Never hold the guard across an `.await`.
    pub fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Initialize the database: open connection, enable WAL, run migrations
pub fn init_db(data_dir: &Path) -> Result<Db> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("creating data directory {}", data_dir.display()))?;
    let db_path = data_dir.join("strengths.db");
    let conn = Connection::open(&db_path).context("opening SQLite database")?;

    // Enable WAL mode for better concurrent read performance
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    open(conn)
}

/// Fresh in-memory database with the full schema (tests, one-off tooling).
pub fn open_in_memory() -> Result<Db> {
    open(Connection::open_in_memory().context("opening in-memory SQLite database")?)
}

fn open(conn: Connection) -> Result<Db> {
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    run_migrations(&conn)?;
    Ok(Db {
        conn: Arc::new(Mutex::new(conn)),
    })
}

fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
            [name],
            |row| row.get(0),
        )?;

        if !already_applied {
            conn.execute_batch(sql)
                .with_context(|| format!("running migration {name}"))?;
            conn.execute("INSERT INTO _migrations (name) VALUES (?1)", [name])?;
            tracing::info!("Applied migration: {name}");
        }
    }

    Ok(())
}

/// SQLite `datetime` text (`YYYY-MM-DD HH:MM:SS`, UTC).
pub fn sqlite_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Current time as SQLite `datetime` text.
pub fn sqlite_now() -> String {
    sqlite_time(Utc::now())
}

/// True for UNIQUE / PRIMARY KEY constraint failures.
pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

// ---------------------------------------------------------------------------
// sea-query execution helpers
// ---------------------------------------------------------------------------

/// Convert `sea_query::Values` into rusqlite bind parameters.
pub fn sq_params(values: &sea_query::Values) -> Vec<SqlValue> {
    use sea_query::Value as V;

    values
        .0
        .iter()
        .map(|v| match v {
            V::Bool(Some(b)) => SqlValue::Integer(i64::from(*b)),
            V::TinyInt(Some(i)) => SqlValue::Integer(i64::from(*i)),
            V::SmallInt(Some(i)) => SqlValue::Integer(i64::from(*i)),
            V::Int(Some(i)) => SqlValue::Integer(i64::from(*i)),
            V::BigInt(Some(i)) => SqlValue::Integer(*i),
            V::TinyUnsigned(Some(i)) => SqlValue::Integer(i64::from(*i)),
            V::SmallUnsigned(Some(i)) => SqlValue::Integer(i64::from(*i)),
            V::Unsigned(Some(i)) => SqlValue::Integer(i64::from(*i)),
            V::BigUnsigned(Some(i)) => SqlValue::Integer(i64::try_from(*i).unwrap_or(i64::MAX)),
            V::Float(Some(f)) => SqlValue::Real(f64::from(*f)),
            V::Double(Some(f)) => SqlValue::Real(*f),
            V::String(Some(s)) => SqlValue::Text(s.to_string()),
            V::Char(Some(c)) => SqlValue::Text(c.to_string()),
            V::Bytes(Some(b)) => SqlValue::Blob(b.to_vec()),
            _ => SqlValue::Null,
        })
        .collect()
}

/// Execute a built statement, returning the number of affected rows.
pub fn sq_execute(conn: &Connection, (sql, values): Built) -> rusqlite::Result<usize> {
    conn.execute(&sql, params_from_iter(sq_params(&values)))
}

/// Run a built query expected to return exactly one row.
pub fn sq_query_row<T, F>(conn: &Connection, (sql, values): Built, f: F) -> rusqlite::Result<T>
where
    F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
{
    conn.query_row(&sql, params_from_iter(sq_params(&values)), f)
}

/// Run a built query and map every row.
pub fn sq_query_map<T, F>(conn: &Connection, (sql, values): Built, f: F) -> rusqlite::Result<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(sq_params(&values)), f)?;
    rows.collect()
}

// ---------------------------------------------------------------------------
// Row mappers
// ---------------------------------------------------------------------------

/// Map `users::profile_by_id` columns.
pub fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<UserProfile> {
    let role: String = row.get(4)?;
    let strengths: String = row.get(5)?;
    Ok(UserProfile {
        id: row.get(0)?,
        email: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        role: UserRole::parse(&role).unwrap_or_default(),
        top_strengths: service::decode_strengths(&strengths),
        created_at: row.get(6)?,
    })
}

/// Map `users::list_for_admin` columns.
pub fn admin_user_from_row(row: &Row<'_>) -> rusqlite::Result<AdminUserSummary> {
    let role: String = row.get(4)?;
    let strengths: String = row.get(5)?;
    Ok(AdminUserSummary {
        id: row.get(0)?,
        email: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        role: UserRole::parse(&role).unwrap_or_default(),
        top_strengths: service::decode_strengths(&strengths),
        team_member_count: row.get(6)?,
        created_at: row.get(7)?,
        last_login_at: row.get(8)?,
    })
}

/// Map `team_members` select columns.
pub fn member_from_row(row: &Row<'_>) -> rusqlite::Result<TeamMember> {
    let strengths: String = row.get(2)?;
    Ok(TeamMember {
        id: row.get(0)?,
        name: row.get(1)?,
        strengths: service::decode_strengths(&strengths),
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Map `chat` conversation select columns.
pub fn conversation_from_row(row: &Row<'_>) -> rusqlite::Result<ConversationSummary> {
    let mode: String = row.get(2)?;
    Ok(ConversationSummary {
        id: row.get(0)?,
        title: row.get(1)?,
        mode: ChatMode::parse(&mode).unwrap_or_default(),
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Map `chat` message select columns.
pub fn message_from_row(row: &Row<'_>) -> rusqlite::Result<ChatMessage> {
    let role: String = row.get(1)?;
    Ok(ChatMessage {
        id: row.get(0)?,
        role: ChatRole::parse(&role).unwrap_or(ChatRole::User),
        content: row.get(2)?,
        created_at: row.get(3)?,
    })
}
