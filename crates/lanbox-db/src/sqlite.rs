use std::path::Path;
use std::sync::Mutex;

use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

use lanbox_types::models::{
    ChatMessage, NewChatMessage, NewFile, NewUser, StoredFile, UserAccount,
};

use crate::{DocumentStore, migrations, new_id};

/// SQLite-backed store. Rows are read back in rowid order, which is the
/// order they were inserted.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        migrations::run(&conn)?;

        info!("Store opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run(&conn)?;

        info!("Store opened in memory");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Store lock poisoned: {}", e))?;
        f(&conn)
    }
}

impl DocumentStore for SqliteStore {
    // -- Users --

    fn insert_user(&self, user: NewUser) -> Result<UserAccount> {
        let id = new_id();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, password) VALUES (?1, ?2, ?3)",
                rusqlite::params![&id, &user.username, &user.password],
            )?;
            Ok(())
        })?;

        Ok(UserAccount {
            id,
            username: user.username,
            password: user.password,
        })
    }

    fn find_users(&self) -> Result<Vec<UserAccount>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, username, password FROM users ORDER BY rowid")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(UserAccount {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        password: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn find_user(&self, username: &str, password: &str) -> Result<Option<UserAccount>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, username, password FROM users
                 WHERE username = ?1 AND password = ?2
                 ORDER BY rowid LIMIT 1",
                [username, password],
                |row| {
                    Ok(UserAccount {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        password: row.get(2)?,
                    })
                },
            )
            .optional()
        })
    }

    // -- Files --

    fn insert_file(&self, file: NewFile) -> Result<String> {
        let id = new_id();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO files (id, filename, data, content_type) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![&id, &file.filename, &file.data, &file.content_type],
            )?;
            Ok(())
        })?;
        Ok(id)
    }

    fn file_names(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT filename FROM files ORDER BY rowid")?;
            let names = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(names)
        })
    }

    fn find_file(&self, filename: &str) -> Result<Option<StoredFile>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, filename, data, content_type FROM files
                 WHERE filename = ?1
                 ORDER BY rowid LIMIT 1",
                [filename],
                |row| {
                    Ok(StoredFile {
                        id: row.get(0)?,
                        filename: row.get(1)?,
                        data: row.get(2)?,
                        content_type: row.get(3)?,
                    })
                },
            )
            .optional()
        })
    }

    fn delete_file(&self, filename: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM files WHERE rowid = (
                     SELECT rowid FROM files WHERE filename = ?1 ORDER BY rowid LIMIT 1
                 )",
                [filename],
            )?;
            Ok(removed > 0)
        })
    }

    // -- Chat --

    fn insert_chat(&self, message: NewChatMessage) -> Result<ChatMessage> {
        let id = new_id();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO chat_messages (id, user, text) VALUES (?1, ?2, ?3)",
                rusqlite::params![&id, &message.user, &message.text],
            )?;
            Ok(())
        })?;

        Ok(ChatMessage {
            id,
            user: message.user,
            text: message.text,
        })
    }

    fn find_chat(&self) -> Result<Vec<ChatMessage>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, user, text FROM chat_messages ORDER BY rowid")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(ChatMessage {
                        id: row.get(0)?,
                        user: row.get(1)?,
                        text: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
