//! Append-only journal of placed and removed chests.
//!
//! One JSON object per line. Creations are queued from any thread and written
//! by a background task; replaying the file folds it back into the set of
//! chests still standing.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use chests_core::{Chest, ChestRecord, persistence::ChestPersistence};
use chests_utils::ChestLocation;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tokio::{
    fs::{self, File, OpenOptions},
    io::{AsyncWrite, AsyncWriteExt, BufWriter},
    select,
    sync::mpsc,
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::PluginError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum JournalEntry {
    Create(ChestRecord),
    Remove { location: ChestLocation },
}

/// Journals chest creations and explicit removals.
pub struct ChestJournal {
    sender: mpsc::UnboundedSender<JournalEntry>,
}

impl ChestJournal {
    /// Starts the writer task appending to `path`.
    ///
    /// The task runs until `cancel_token` fires or every journal handle is
    /// dropped, and writes whatever is still queued before it exits.
    #[must_use]
    pub fn spawn(
        path: PathBuf,
        cancel_token: CancellationToken,
    ) -> (Self, JoinHandle<Result<(), PluginError>>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(write_entries(path, receiver, cancel_token));
        (Self { sender }, task)
    }

    /// Journals that the chest at `location` is gone.
    pub fn record_removal(&self, location: &ChestLocation) {
        self.enqueue(JournalEntry::Remove {
            location: location.clone(),
        });
    }

    fn enqueue(&self, entry: JournalEntry) {
        if self.sender.send(entry).is_err() {
            log::warn!("Chest journal is closed, dropping entry");
        }
    }
}

impl ChestPersistence for ChestJournal {
    fn record_creation(&self, chest: &Arc<Chest>) {
        self.enqueue(JournalEntry::Create(ChestRecord::of(chest)));
    }
}

async fn write_entries(
    path: PathBuf,
    mut receiver: mpsc::UnboundedReceiver<JournalEntry>,
    cancel_token: CancellationToken,
) -> Result<(), PluginError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .await?;
    let mut writer = BufWriter::new(file);

    loop {
        select! {
            () = cancel_token.cancelled() => {
                break;
            }
            entry = receiver.recv() => {
                let Some(entry) = entry else {
                    break;
                };
                write_entry(&mut writer, &entry).await?;
                if receiver.is_empty() {
                    writer.flush().await?;
                }
            }
        }
    }

    receiver.close();
    while let Ok(entry) = receiver.try_recv() {
        write_entry(&mut writer, &entry).await?;
    }
    writer.flush().await?;
    log::debug!("Chest journal {} closed", path.display());
    Ok(())
}

async fn write_entry<W: AsyncWrite + Unpin>(
    writer: &mut W,
    entry: &JournalEntry,
) -> Result<(), PluginError> {
    let mut line = serde_json::to_vec(entry)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    Ok(())
}

/// Reads the journal at `path` back into the chests still standing.
///
/// A missing journal is an empty one. Lines that don't parse, such as one
/// torn by a crash mid-write, are skipped with a warning.
pub async fn replay(path: &Path) -> Result<Vec<ChestRecord>, PluginError> {
    let contents = match fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut standing: FxHashMap<ChestLocation, ChestRecord> = FxHashMap::default();
    for (number, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<JournalEntry>(line) {
            Ok(JournalEntry::Create(record)) => {
                standing.insert(record.location.clone(), record);
            }
            Ok(JournalEntry::Remove { location }) => {
                standing.remove(&location);
            }
            Err(err) => {
                log::warn!("Skipping line {} of {}: {err}", number + 1, path.display());
            }
        }
    }

    Ok(standing.into_values().collect())
}

/// Rewrites the journal at `path` to hold only `records`.
pub async fn compact(path: &Path, records: &[ChestRecord]) -> Result<(), PluginError> {
    let tmp = path.with_extension("journal.tmp");
    {
        let mut writer = BufWriter::new(File::create(&tmp).await?);
        for record in records {
            write_entry(&mut writer, &JournalEntry::Create(record.clone())).await?;
        }
        writer.flush().await?;
    }
    fs::rename(&tmp, path).await?;
    Ok(())
}
