//! JSON document store.
//!
//! All tickets live in a single JSON file guarded by advisory locks:
//! shared for reads, exclusive for read-modify-write.

use super::{new_ticket_id, watcher, StoreError, Subscription, TicketStore};
use crate::data::sorting::sort_newest_first;
use crate::data::{NewTicket, Ticket, TicketId, TicketPatch};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Current document schema version
pub const DOCUMENT_VERSION: u32 = 1;

/// On-disk document format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketDocument {
    /// Schema version for forward compatibility
    pub version: u32,
    pub tickets: Vec<Ticket>,
}

impl Default for TicketDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            tickets: Vec::new(),
        }
    }
}

/// Ticket store backed by one JSON file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Open (not create) the store at `path`; the parent directory is created if needed
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    StoreError::failed(&format!("Failed to create {}", parent.display()), e)
                })?;
            }
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document under a shared lock. A missing or empty file is an empty store.
    pub fn read_document(&self) -> Result<TicketDocument, StoreError> {
        if !self.path.exists() {
            return Ok(TicketDocument::default());
        }

        let file = File::open(&self.path).map_err(|e| self.io_error("open", e))?;
        file.lock_shared().map_err(|e| self.io_error("lock", e))?;

        let mut content = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut content);
        let _ = file.unlock();
        read.map_err(|e| self.io_error("read", e))?;

        parse_document(&content, &self.path)
    }

    /// Run `change` on the document while holding an exclusive lock, then write it back
    fn mutate<T>(
        &self,
        change: impl FnOnce(&mut TicketDocument) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| self.io_error("open", e))?;
        file.lock_exclusive().map_err(|e| self.io_error("lock", e))?;

        let result = self.mutate_locked(&mut file, change);
        let _ = file.unlock();
        result
    }

    fn mutate_locked<T>(
        &self,
        file: &mut File,
        change: impl FnOnce(&mut TicketDocument) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| self.io_error("read", e))?;
        let mut document = parse_document(&content, &self.path)?;

        let value = change(&mut document)?;

        let content = serde_json::to_string_pretty(&document)
            .map_err(|e| StoreError::failed("Failed to serialize tickets", e))?;
        file.set_len(0).map_err(|e| self.io_error("truncate", e))?;
        file.seek(SeekFrom::Start(0))
            .map_err(|e| self.io_error("seek", e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| self.io_error("write", e))?;
        file.flush().map_err(|e| self.io_error("flush", e))?;

        Ok(value)
    }

    fn io_error(&self, action: &str, err: std::io::Error) -> StoreError {
        StoreError::failed(&format!("Failed to {} {}", action, self.path.display()), err)
    }
}

fn parse_document(content: &str, path: &Path) -> Result<TicketDocument, StoreError> {
    if content.trim().is_empty() {
        return Ok(TicketDocument::default());
    }

    let document: TicketDocument = serde_json::from_str(content)
        .map_err(|e| StoreError::failed(&format!("Failed to parse {}", path.display()), e))?;

    if document.version != DOCUMENT_VERSION {
        return Err(StoreError::OperationFailed(format!(
            "Unsupported ticket document version {} in {} (expected {})",
            document.version,
            path.display(),
            DOCUMENT_VERSION
        )));
    }

    Ok(document)
}

impl TicketStore for FileStore {
    fn snapshot(&self) -> Result<Vec<Ticket>, StoreError> {
        let mut tickets = self.read_document()?.tickets;
        sort_newest_first(&mut tickets);
        Ok(tickets)
    }

    fn create(&self, ticket: NewTicket) -> Result<TicketId, StoreError> {
        let id = new_ticket_id();
        self.mutate(|doc| {
            doc.tickets.push(Ticket::from_new(id.clone(), ticket));
            Ok(())
        })?;
        tracing::debug!("Stored ticket {} in {}", id, self.path.display());
        Ok(id)
    }

    fn update(&self, id: &str, patch: &TicketPatch) -> Result<(), StoreError> {
        self.mutate(|doc| {
            let ticket = doc
                .tickets
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| StoreError::OperationFailed(format!("Ticket {} not found", id)))?;
            patch.apply_to(ticket);
            Ok(())
        })
    }

    fn remove(&self, id: &str) -> Result<(), StoreError> {
        self.mutate(|doc| {
            doc.tickets.retain(|t| t.id != id);
            Ok(())
        })
    }

    fn subscribe(&self) -> Result<Subscription, StoreError> {
        watcher::subscribe_to_file(self.clone())
    }
}
