//! SQLite-based backend
//!
//! Implements every collaborator of the view on top of one SQLite database:
//! profiles, follows, the `direct_messages` table and a realtime channel fed
//! by tailing that table. Several processes may share the same database file;
//! each one picks up the others' inserts on its next tail tick.

use crate::{
    backend::{
        AuthProvider, InsertFilter, MessageStore, ProfileDirectory, RealtimeChannel, RealtimeHub,
        Subscription,
    },
    models::{Message, NewMessage, Profile, User},
    Error, Result,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default interval between two scans for rows written by other connections
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

const MESSAGE_COLUMNS: &str =
    "id, sender_id, receiver_id, content, is_read, created_at, client_token";

/// Local backend with SQLite persistence
#[derive(Clone)]
pub struct SqliteBackend {
    inner: Arc<Inner>,
}

struct Inner {
    /// SQLite connection
    conn: Mutex<Connection>,
    /// Live realtime subscriptions
    hub: Mutex<RealtimeHub>,
    /// Highest message rowid already published to the hub
    cursor: Mutex<i64>,
    /// Signed-in user id
    session: Mutex<Option<String>>,
    /// Tail interval for the realtime channel
    poll_interval: Duration,
    /// Whether the tail task has been spawned
    tailer_started: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|e| Error::Storage(format!("Lock poisoned: {}", e)))
}

fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

fn row_to_message(row: &Row<'_>) -> rusqlite::Result<Message> {
    let token: Option<String> = row.get(6)?;
    Ok(Message {
        id: row.get(0)?,
        sender_id: row.get(1)?,
        receiver_id: row.get(2)?,
        content: row.get(3)?,
        is_read: row.get(4)?,
        created_at: millis_to_datetime(row.get(5)?),
        client_token: token.and_then(|t| Uuid::parse_str(&t).ok()),
    })
}

fn row_to_profile(row: &Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: row.get(0)?,
        name: row.get(1)?,
        avatar_url: row.get(2)?,
        bio: row.get(3)?,
    })
}

impl SqliteBackend {
    /// Open (or create) a database file
    pub fn open<P: AsRef<Path>>(path: P, poll_interval: Duration) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::Storage(format!("Failed to open database: {}", e)))?;
        conn.busy_timeout(Duration::from_secs(5))?;
        // Readers in other processes must not block the writer
        conn.query_row("PRAGMA journal_mode=WAL", [], |_| Ok(()))?;

        info!("Opened message database at {}", path.display());
        Self::with_connection(conn, poll_interval)
    }

    /// Create an in-memory backend (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Storage(format!("Failed to create in-memory database: {}", e)))?;
        Self::with_connection(conn, DEFAULT_POLL_INTERVAL)
    }

    fn with_connection(conn: Connection, poll_interval: Duration) -> Result<Self> {
        init_schema(&conn)?;

        let cursor: i64 = conn.query_row(
            "SELECT COALESCE(MAX(rowid), 0) FROM direct_messages",
            [],
            |row| row.get(0),
        )?;

        Ok(Self {
            inner: Arc::new(Inner {
                conn: Mutex::new(conn),
                hub: Mutex::new(RealtimeHub::new()),
                cursor: Mutex::new(cursor),
                session: Mutex::new(None),
                poll_interval: poll_interval.max(Duration::from_millis(1)),
                tailer_started: AtomicBool::new(false),
            }),
        })
    }

    /// Create or update a profile
    pub fn add_profile(&self, profile: &Profile) -> Result<()> {
        let conn = lock(&self.inner.conn)?;
        conn.execute(
            "INSERT INTO profiles (id, name, avatar_url, bio) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                avatar_url = excluded.avatar_url,
                bio = excluded.bio",
            params![profile.id, profile.name, profile.avatar_url, profile.bio],
        )?;
        Ok(())
    }

    /// Record that `follower_id` follows `following_id`
    pub fn follow(&self, follower_id: &str, following_id: &str) -> Result<()> {
        let conn = lock(&self.inner.conn)?;
        for id in [follower_id, following_id] {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM profiles WHERE id = ?1)",
                params![id],
                |row| row.get(0),
            )?;
            if !exists {
                return Err(Error::NotFound(format!("profile {}", id)));
            }
        }

        conn.execute(
            "INSERT OR IGNORE INTO user_follows (follower_id, following_id, created_at)
             VALUES (?1, ?2, ?3)",
            params![follower_id, following_id, Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }

    /// Start a session for an existing profile
    pub fn sign_in(&self, user_id: &str) -> Result<User> {
        {
            let conn = lock(&self.inner.conn)?;
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM profiles WHERE id = ?1)",
                params![user_id],
                |row| row.get(0),
            )?;
            if !exists {
                return Err(Error::Auth(format!("Unknown user: {}", user_id)));
            }
        }

        *lock(&self.inner.session)? = Some(user_id.to_string());
        info!("Signed in as {}", user_id);
        Ok(User::new(user_id))
    }

    /// End the current session
    pub fn sign_out(&self) -> Result<()> {
        *lock(&self.inner.session)? = None;
        Ok(())
    }

    /// Total number of stored messages
    pub fn message_count(&self) -> Result<usize> {
        let conn = lock(&self.inner.conn)?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM direct_messages", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Number of live realtime listeners
    pub fn listener_count(&self) -> Result<usize> {
        Ok(lock(&self.inner.hub)?.listener_count())
    }

    /// Publish rows inserted since the last scan to realtime subscribers
    ///
    /// Called after every local insert and periodically by the tail task.
    /// Returns the number of new rows found.
    pub fn sync_inserts(&self) -> Result<usize> {
        self.inner.sync_inserts()
    }

    /// Poison the realtime hub lock, as a panicking listener thread would
    #[cfg(test)]
    pub(crate) fn poison_realtime_hub(&self) {
        let inner = Arc::clone(&self.inner);
        let _ = std::thread::spawn(move || {
            let _guard = inner.hub.lock();
            panic!("listener thread panicked");
        })
        .join();
    }

    fn ensure_tailer(&self) {
        if self.inner.tailer_started.swap(true, Ordering::SeqCst) {
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        let interval = self.inner.poll_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    debug!("Backend dropped, stopping realtime tail");
                    break;
                };
                if let Err(e) = inner.sync_inserts() {
                    warn!("Realtime tail failed: {}", e);
                }
            }
        });
        debug!("Realtime tail started ({:?} interval)", interval);
    }
}

impl Inner {
    fn sync_inserts(&self) -> Result<usize> {
        let mut cursor = lock(&self.cursor)?;

        let rows: Vec<(i64, Message)> = {
            let conn = lock(&self.conn)?;
            let mut stmt = conn.prepare(&format!(
                "SELECT rowid, {} FROM direct_messages WHERE rowid > ?1 ORDER BY rowid ASC",
                MESSAGE_COLUMNS
            ))?;
            let mapped = stmt.query_map(params![*cursor], |row| {
                let rowid: i64 = row.get(0)?;
                let token: Option<String> = row.get(7)?;
                Ok((
                    rowid,
                    Message {
                        id: row.get(1)?,
                        sender_id: row.get(2)?,
                        receiver_id: row.get(3)?,
                        content: row.get(4)?,
                        is_read: row.get(5)?,
                        created_at: millis_to_datetime(row.get(6)?),
                        client_token: token.and_then(|t| Uuid::parse_str(&t).ok()),
                    },
                ))
            })?;
            mapped.collect::<rusqlite::Result<Vec<_>>>()?
        };

        if rows.is_empty() {
            return Ok(0);
        }

        let mut hub = lock(&self.hub)?;
        for (rowid, message) in &rows {
            hub.publish(message);
            *cursor = *rowid;
        }
        Ok(rows.len())
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            avatar_url TEXT,
            bio TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS user_follows (
            follower_id TEXT NOT NULL,
            following_id TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            PRIMARY KEY (follower_id, following_id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS direct_messages (
            id TEXT PRIMARY KEY,
            sender_id TEXT NOT NULL,
            receiver_id TEXT NOT NULL,
            content TEXT NOT NULL,
            is_read INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            client_token TEXT UNIQUE
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_dm_pair_created
         ON direct_messages(sender_id, receiver_id, created_at)",
        [],
    )?;

    Ok(())
}

impl AuthProvider for SqliteBackend {
    async fn current_user(&self) -> Result<Option<User>> {
        let session = lock(&self.inner.session)?;
        Ok(session.as_deref().map(User::new))
    }
}

impl ProfileDirectory for SqliteBackend {
    async fn fetch_profile(&self, user_id: &str) -> Result<Profile> {
        let conn = lock(&self.inner.conn)?;
        conn.query_row(
            "SELECT id, name, avatar_url, bio FROM profiles WHERE id = ?1",
            params![user_id],
            row_to_profile,
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("profile {}", user_id)))
    }

    async fn followed_profiles(&self, user_id: &str) -> Result<Vec<Profile>> {
        let conn = lock(&self.inner.conn)?;
        let mut stmt = conn.prepare(
            "SELECT p.id, p.name, p.avatar_url, p.bio
             FROM user_follows f
             JOIN profiles p ON p.id = f.following_id
             WHERE f.follower_id = ?1
             ORDER BY p.name ASC",
        )?;
        let profiles = stmt
            .query_map(params![user_id], row_to_profile)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(profiles)
    }
}

impl MessageStore for SqliteBackend {
    async fn fetch_conversation(&self, me: &str, them: &str) -> Result<Vec<Message>> {
        let conn = lock(&self.inner.conn)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM direct_messages
             WHERE (sender_id = ?1 AND receiver_id = ?2)
                OR (sender_id = ?2 AND receiver_id = ?1)
             ORDER BY created_at ASC, rowid ASC",
            MESSAGE_COLUMNS
        ))?;
        let messages = stmt
            .query_map(params![me, them], row_to_message)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!("Fetched {} messages between {} and {}", messages.len(), me, them);
        Ok(messages)
    }

    async fn insert(&self, message: NewMessage) -> Result<Message> {
        let content = message.content.trim();
        if content.is_empty() {
            return Err(Error::Storage("Message content must not be empty".to_string()));
        }

        let token = message.client_token.to_string();
        let stored = {
            let conn = lock(&self.inner.conn)?;
            let inserted = conn.execute(
                "INSERT INTO direct_messages
                 (id, sender_id, receiver_id, content, is_read, created_at, client_token)
                 VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6)
                 ON CONFLICT(client_token) DO NOTHING",
                params![
                    Uuid::new_v4().to_string(),
                    message.sender_id,
                    message.receiver_id,
                    content,
                    Utc::now().timestamp_millis(),
                    token,
                ],
            )?;
            if inserted == 0 {
                debug!("Insert with token {} replayed, returning stored row", token);
            }

            conn.query_row(
                &format!(
                    "SELECT {} FROM direct_messages WHERE client_token = ?1",
                    MESSAGE_COLUMNS
                ),
                params![token],
                row_to_message,
            )?
        };

        // The row is committed; a publish failure is left to the tail task
        if let Err(e) = self.inner.sync_inserts() {
            warn!("Failed to publish message {}: {}", stored.id, e);
        }
        Ok(stored)
    }
}

impl RealtimeChannel for SqliteBackend {
    async fn subscribe(&self, filter: InsertFilter) -> Result<Subscription> {
        self.ensure_tailer();
        let mut hub = lock(&self.inner.hub)?;
        Ok(hub.subscribe(filter))
    }
}
