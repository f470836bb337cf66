// store.rs - channel persistence
//
// simple-irc-server - simple IRC server
// Copyright (C) 2022  Mateusz Szpakowski
//
// This library is free software; you can redistribute it and/or
// modify it under the terms of the GNU Lesser General Public
// License as published by the Free Software Foundation; either
// version 2.1 of the License, or (at your option) any later version.
//
// This library is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public
// License along with this library; if not, write to the Free Software
// Foundation, Inc., 51 Franklin Street, Fifth Floor, Boston, MA  02110-1301  USA

use rusqlite::{Connection, Result as SqlResult};
use std::path::Path;
use tracing::*;

/// Persisted channel: mode flags as letters, mask lists space-delimited.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub(crate) struct ChannelRow {
    pub(crate) name: String,
    pub(crate) flags: String,
    pub(crate) key: Option<String>,
    pub(crate) topic: String,
    pub(crate) user_limit: Option<usize>,
    pub(crate) ban_list: Vec<String>,
    pub(crate) except_list: Vec<String>,
    pub(crate) invite_list: Vec<String>,
}

/// Source of channels materialized at startup. The server never writes back.
pub(crate) trait ChannelStore: Send {
    fn load_channels(&self) -> SqlResult<Vec<ChannelRow>>;
    fn close(self: Box<Self>) -> SqlResult<()>;
}

fn split_masks(list: Option<String>) -> Vec<String> {
    list.map(|l| l.split_ascii_whitespace().map(|m| m.to_string()).collect())
        .unwrap_or_default()
}

pub(crate) struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub(crate) fn open<P: AsRef<Path>>(path: P) -> SqlResult<Self> {
        let store = SqliteStore {
            conn: Connection::open(path)?,
        };
        store.init()?;
        Ok(store)
    }

    #[cfg(test)]
    pub(crate) fn open_memory() -> SqlResult<Self> {
        let store = SqliteStore {
            conn: Connection::open_in_memory()?,
        };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> SqlResult<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS channel (
                name        TEXT PRIMARY KEY,
                flags       TEXT NOT NULL DEFAULT '',
                key         TEXT,
                topic       TEXT NOT NULL DEFAULT '',
                user_limit  INTEGER,
                ban_list    TEXT,
                except_list TEXT,
                invite_list TEXT
            );
            ",
        )
    }

    #[cfg(test)]
    pub(crate) fn save_channel(&self, row: &ChannelRow) -> SqlResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO channel
                (name, flags, key, topic, user_limit, ban_list, except_list, invite_list)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                row.name,
                row.flags,
                row.key,
                row.topic,
                row.user_limit.map(|l| l as i64),
                row.ban_list.join(" "),
                row.except_list.join(" "),
                row.invite_list.join(" "),
            ],
        )?;
        Ok(())
    }
}

impl ChannelStore for SqliteStore {
    fn load_channels(&self) -> SqlResult<Vec<ChannelRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, flags, key, topic, user_limit, ban_list, except_list, invite_list
             FROM channel",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ChannelRow {
                name: row.get(0)?,
                flags: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                key: row.get::<_, Option<String>>(2)?.filter(|k| !k.is_empty()),
                topic: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                user_limit: row
                    .get::<_, Option<i64>>(4)?
                    .filter(|l| *l > 0)
                    .map(|l| l as usize),
                ban_list: split_masks(row.get(5)?),
                except_list: split_masks(row.get(6)?),
                invite_list: split_masks(row.get(7)?),
            })
        })?;
        let channels = rows.collect::<SqlResult<Vec<_>>>()?;
        info!("Loaded {} channels from database", channels.len());
        Ok(channels)
    }

    fn close(self: Box<Self>) -> SqlResult<()> {
        self.conn.close().map_err(|(_, e)| e)
    }
}
