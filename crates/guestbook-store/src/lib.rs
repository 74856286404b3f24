pub mod sanitize;
pub mod validate;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use guestbook_types::{Document, Variant};

pub use validate::Rejection;

/// Single-document guestbook store backed by one JSON file.
///
/// Reads return the file verbatim. Writes replace the whole document through
/// a temp file + rename, so readers never observe a torn file. There is no
/// lock: two concurrent writers race and the last rename wins.
pub struct DocumentStore {
    path: PathBuf,
    variant: Variant,
    write_seq: AtomicU64,
}

impl DocumentStore {
    pub async fn open(path: impl Into<PathBuf>, variant: Variant) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating data directory {}", parent.display()))?;
        }
        info!("Guestbook document ({}) at {}", variant, path.display());
        Ok(Self {
            path,
            variant,
            write_seq: AtomicU64::new(0),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Current document as stored. A missing file is initialized to the
    /// variant's empty document first.
    pub async fn read(&self) -> Result<Value> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return self.initialize().await,
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()));
            }
        };
        serde_json::from_slice(&raw)
            .with_context(|| format!("parsing {}", self.path.display()))
    }

    /// Overwrite the stored document in full.
    pub async fn replace(&self, document: &Document) -> Result<()> {
        let tmp = self.write_temp(&serde_json::to_vec(document)?).await?;

        if let Err(e) = fs::rename(&tmp, &self.path).await {
            fs::remove_file(&tmp).await.ok();
            return Err(e).with_context(|| format!("writing {}", self.path.display()));
        }

        debug!("Persisted {} {} entries", document.len(), self.variant);
        Ok(())
    }

    /// Validate a raw request body for this store's variant.
    pub fn accept(&self, payload: &[u8], now: &str) -> Result<Document, Rejection> {
        validate::accept(self.variant, payload, now)
    }

    async fn initialize(&self) -> Result<Value> {
        let empty = self.variant.empty_document();
        let tmp = self.write_temp(&serde_json::to_vec(&empty)?).await?;

        // Publish the complete file with a link, which never replaces an
        // existing document: a reader or writer that got there first wins.
        let linked = fs::hard_link(&tmp, &self.path).await;
        fs::remove_file(&tmp).await.ok();

        match linked {
            Ok(()) => {
                info!("Initialized empty guestbook at {}", self.path.display());
                Ok(serde_json::to_value(empty)?)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let raw = fs::read(&self.path).await?;
                serde_json::from_slice(&raw)
                    .with_context(|| format!("parsing {}", self.path.display()))
            }
            Err(e) => Err(e).with_context(|| format!("creating {}", self.path.display())),
        }
    }

    /// Write `bytes` to a fresh temp file beside the document and sync it.
    async fn write_temp(&self, bytes: &[u8]) -> Result<PathBuf> {
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        let tmp = self.temp_path(seq);

        let result = async {
            let mut file = fs::File::create(&tmp).await?;
            file.write_all(bytes).await?;
            file.sync_all().await
        }
        .await;

        match result {
            Ok(()) => Ok(tmp),
            Err(e) => {
                fs::remove_file(&tmp).await.ok();
                Err(e).with_context(|| format!("writing {}", tmp.display()))
            }
        }
    }

    fn temp_path(&self, seq: u64) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}.{}.tmp", std::process::id(), seq));
        self.path.with_file_name(name)
    }
}
