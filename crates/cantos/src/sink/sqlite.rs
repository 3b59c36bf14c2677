use std::path::Path;

use cantos_core::song::Song;
use rusqlite::{params, Connection};

use super::{ClearOutcome, Delivery, ImportOutcome};
use crate::prelude::*;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS cantos (
    id TEXT PRIMARY KEY,
    nh INTEGER NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    type TEXT NOT NULL
)";

pub fn connect(path: &Path) -> std::result::Result<Connection, Error> {
    let conn = Connection::open(path)?;
    conn.execute(CREATE_TABLE, [])?;
    Ok(conn)
}

pub fn clear(conn: &Connection) -> ClearOutcome {
    match conn.execute("DELETE FROM cantos", []) {
        Ok(removed) => {
            log::info!("removed {removed} previous record(s)");
            ClearOutcome::Cleared
        }
        Err(e) => ClearOutcome::Failed(e.into()),
    }
}

/// Insert one song in its own transaction.
fn insert(conn: &mut Connection, song: &Song) -> std::result::Result<(), Error> {
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO cantos (id, nh, title, content, type) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![song.id, song.nh, song.title, song.content, song.kind.to_string()],
    )?;
    tx.commit()?;
    Ok(())
}

/// Insert every song; a failing row is counted and the batch goes on.
pub fn import(conn: &mut Connection, songs: &[Song]) -> ImportOutcome {
    let mut outcome = ImportOutcome::default();
    for song in songs {
        match insert(conn, song) {
            Ok(()) => outcome.imported += 1,
            Err(e) => {
                log::warn!("could not insert song {} ({}): {e}", song.nh, song.title);
                outcome.failed.push(song.nh);
            }
        }
    }
    outcome
}

pub fn deliver(path: &Path, songs: &[Song], clear_first: bool) -> Delivery {
    let target = path.display().to_string();
    let mut conn = match connect(path) {
        Ok(conn) => conn,
        Err(e) => {
            return Delivery {
                target,
                clear: ClearOutcome::Skipped,
                import: ImportOutcome::failed_all(songs, e),
            }
        }
    };

    let cleared = if clear_first {
        clear(&conn)
    } else {
        ClearOutcome::Skipped
    };

    Delivery {
        target,
        clear: cleared,
        import: import(&mut conn, songs),
    }
}
