//! Directory-backed policy store.
//!
//! Each policy lives in `<id>.json` under the base directory, next to a
//! `next_id` counter. Writes go to a temporary file first and are renamed
//! into place.

use async_trait::async_trait;
use bastion_core::error::PersistenceError;
use bastion_core::id::PolicyId;
use bastion_core::log_event;
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::{check_document, check_name_unique, stamp, PolicyStore, SaveOptions};
use crate::model::Policy;

const EXTENSION: &str = "json";
const NEXT_ID_FILE: &str = "next_id";

/// Policy store keeping one JSON document per policy.
pub struct JsonDirPolicyStore {
    /// Directory holding the documents
    base_dir: PathBuf,

    /// Held for the duration of every write
    write_lock: Mutex<()>,
}

impl JsonDirPolicyStore {
    /// Create a store rooted at `base_dir`. The directory is created on the
    /// first write.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Directory holding the documents.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path_for(&self, id: PolicyId) -> PathBuf {
        self.base_dir.join(format!("{}.{}", id, EXTENSION))
    }

    async fn read_policy(&self, path: &Path) -> Result<Policy, PersistenceError> {
        let data = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Read every `<id>.json` document in the directory.
    ///
    /// Other files are ignored. Documents that cannot be decoded are skipped
    /// with a warning, but their ids still count as taken.
    async fn scan(&self) -> Result<Scan, PersistenceError> {
        let mut scan = Scan::default();

        let mut dir = match tokio::fs::read_dir(&self.base_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(scan),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            let Some(file_id) = document_id(&path) else {
                continue;
            };
            if !entry.file_type().await?.is_file() {
                continue;
            }

            scan.highest_id = scan.highest_id.max(file_id);
            match self.read_policy(&path).await {
                Ok(policy) => scan.policies.push(policy),
                Err(PersistenceError::Serialization(reason)) => {
                    log_event!(LogLevel::Warning, "Skipping undecodable policy document",
                        path => path.display(),
                        reason => reason,
                    );
                }
                Err(e) => return Err(e),
            }
        }

        scan.policies.sort_by_key(|p| p.id);
        Ok(scan)
    }

    /// Hand out the next policy id.
    ///
    /// The high-water mark is kept in a `next_id` file so ids of deleted
    /// policies are never reused.
    async fn allocate_id(&self, scan: &Scan) -> Result<PolicyId, PersistenceError> {
        let path = self.base_dir.join(NEXT_ID_FILE);
        let recorded = match tokio::fs::read_to_string(&path).await {
            Ok(content) => match content.trim().parse::<u64>() {
                Ok(next) => next,
                Err(e) => {
                    log_event!(LogLevel::Warning, "Ignoring unreadable id counter",
                        path => path.display(),
                        reason => e,
                    );
                    0
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        };

        let id = recorded.max(scan.highest_id + 1);
        self.write_atomic(&path, (id + 1).to_string().as_bytes()).await?;

        Ok(PolicyId::from_value(id))
    }

    async fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), PersistenceError> {
        tokio::fs::create_dir_all(&self.base_dir).await?;

        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, data).await?;

        // Ensure the data is on disk before it becomes visible
        let file = tokio::fs::File::open(&temp_path).await?;
        file.sync_all().await?;

        tokio::fs::rename(&temp_path, path).await?;

        Ok(())
    }
}

/// Documents found in the store directory.
#[derive(Default)]
struct Scan {
    /// Decoded policies, ordered by id
    policies: Vec<Policy>,

    /// Highest id named by a document file, decodable or not
    highest_id: u64,
}

/// Id encoded in a document file name, e.g. `12.json`.
fn document_id(path: &Path) -> Option<u64> {
    if path.extension()?.to_str()? != EXTENSION {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}

#[async_trait]
impl PolicyStore for JsonDirPolicyStore {
    async fn save(&self, policy: &Policy, options: SaveOptions) -> Result<Policy, PersistenceError> {
        check_document(policy)?;

        let _guard = self.write_lock.lock().await;
        let scan = self.scan().await?;
        let stored = &scan.policies;

        let previous = match policy.id {
            Some(id) => Some(
                stored
                    .iter()
                    .find(|p| p.id == Some(id))
                    .cloned()
                    .ok_or(PersistenceError::NotFound(id))?,
            ),
            None => None,
        };

        check_name_unique(policy, stored)?;

        let id = match policy.id {
            Some(id) => id,
            None => self.allocate_id(&scan).await?,
        };

        let document = stamp(policy, id, previous.as_ref());
        let data = serde_json::to_vec_pretty(&document)?;
        self.write_atomic(&self.path_for(id), &data).await?;

        log_event!(LogLevel::Debug, "Policy written",
            id => id,
            path => self.path_for(id).display(),
            wait => options.wait,
        );

        Ok(document)
    }

    async fn destroy(&self, id: PolicyId) -> Result<(), PersistenceError> {
        let _guard = self.write_lock.lock().await;

        match tokio::fs::remove_file(self.path_for(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(PersistenceError::NotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, id: PolicyId) -> Result<Policy, PersistenceError> {
        match self.read_policy(&self.path_for(id)).await {
            Err(PersistenceError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                Err(PersistenceError::NotFound(id))
            }
            other => other,
        }
    }

    async fn list_for_service(&self, service: &str) -> Result<Vec<Policy>, PersistenceError> {
        Ok(self
            .scan()
            .await?
            .policies
            .into_iter()
            .filter(|p| p.service == service)
            .collect())
    }
}
