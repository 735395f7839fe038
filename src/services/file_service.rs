//! src/services/file_service.rs
//!
//! FileService: the resolver between filenames and payloads on local disk.
//! Files live flat beneath `base_path/{filename}`; there is no metadata store,
//! the media type of a file is resolved from its bytes (and name) at read time.

use crate::models::stored_file::StoredFile;
use bytes::Bytes;
use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::{debug, info};
use uuid::Uuid;

/// Media types that may be rendered inline by the image endpoint.
pub const SUPPORTED_IMAGE_TYPES: [&str; 4] =
    ["image/svg+xml", "image/jpeg", "image/png", "image/gif"];

const OCTET_STREAM: &str = "application/octet-stream";
const MAX_FILENAME_LEN: usize = 255;
const TMP_PREFIX: &str = ".tmp-";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("file `{0}` not found")]
    NotFound(String),
    #[error("invalid filename `{name}`: {reason}")]
    InvalidFilename { name: String, reason: &'static str },
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// FileService provides the storage operations behind the HTTP surface:
/// - Save (create or replace a file)
/// - Overwrite (replace an existing file only)
/// - Delete
/// - Load (bytes + resolved media type) and Open (handle for streaming)
///
/// Every write lands in a temporary sibling first and is renamed into place,
/// so readers observe either the old or the new payload, never a partial one.
/// Concurrent writers to the same name are not coordinated: last rename wins.
#[derive(Clone, Debug)]
pub struct FileService {
    /// Directory on disk holding every stored file.
    pub base_path: PathBuf,
}

impl FileService {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Reject names that could escape `base_path` or collide with temp files.
    fn ensure_filename_safe(name: &str) -> StorageResult<()> {
        let invalid = |reason| {
            Err(StorageError::InvalidFilename {
                name: name.to_string(),
                reason,
            })
        };

        if name.is_empty() {
            return invalid("must not be empty");
        }
        if name.len() > MAX_FILENAME_LEN {
            return invalid("must be at most 255 bytes");
        }
        if name.starts_with('.') {
            return invalid("must not start with a dot");
        }
        if name
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_control())
        {
            return invalid("must not contain path separators or control characters");
        }
        Ok(())
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    /// Fail with NotFound unless `name` refers to a regular file.
    ///
    /// A name `save` would refuse cannot be stored, so it is NotFound here
    /// without the disk being consulted.
    async fn ensure_exists(&self, name: &str) -> StorageResult<PathBuf> {
        if let Err(err) = Self::ensure_filename_safe(name) {
            debug!("file {} not found: {}", name, err);
            return Err(StorageError::NotFound(name.to_string()));
        }
        let path = self.file_path(name);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(StorageError::NotFound(name.to_string())),
            Err(err) => Err(not_found_or_io(err, name)),
        }
    }

    /// Write `bytes` to a temp file, fsync it, then rename it over `target`.
    /// The temp file is removed on every failure path.
    async fn write_atomic(&self, target: &Path, bytes: &[u8]) -> StorageResult<()> {
        // A root removed while running is recreated on the next write.
        fs::create_dir_all(&self.base_path).await?;
        let tmp_path = self
            .base_path
            .join(format!("{}{}", TMP_PREFIX, Uuid::new_v4()));

        if let Err(err) = write_synced(&tmp_path, bytes).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StorageError::Io(err));
        }

        let renamed = match fs::rename(&tmp_path, target).await {
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                match fs::remove_file(target).await {
                    Ok(()) => fs::rename(&tmp_path, target).await,
                    Err(err) => Err(err),
                }
            }
            other => other,
        };
        if let Err(err) = renamed {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StorageError::Io(err));
        }

        Ok(())
    }

    /// Store `bytes` under `name`, replacing any previous content.
    ///
    /// Returns the name the file was stored under.
    pub async fn save(&self, name: &str, bytes: &[u8]) -> StorageResult<String> {
        Self::ensure_filename_safe(name)?;
        let path = self.file_path(name);
        self.write_atomic(&path, bytes).await?;
        info!("stored file {} ({} bytes)", name, bytes.len());
        Ok(name.to_string())
    }

    /// Replace the content of an existing file.
    pub async fn overwrite(&self, name: &str, bytes: &[u8]) -> StorageResult<()> {
        let path = self.ensure_exists(name).await?;
        self.write_atomic(&path, bytes).await?;
        info!("overwrote file {} ({} bytes)", name, bytes.len());
        Ok(())
    }

    /// Remove a file. Deleting a missing file is NotFound every time.
    pub async fn delete(&self, name: &str) -> StorageResult<()> {
        let path = self.ensure_exists(name).await?;
        fs::remove_file(&path)
            .await
            .map_err(|err| not_found_or_io(err, name))?;
        info!("deleted file {}", name);
        Ok(())
    }

    /// Read a file fully and resolve its media type.
    pub async fn load(&self, name: &str) -> StorageResult<StoredFile> {
        let path = self.ensure_exists(name).await?;
        let bytes = fs::read(&path)
            .await
            .map_err(|err| not_found_or_io(err, name))?;
        let media_type = resolve_media_type(name, &bytes);
        debug!("loaded file {} as {}", name, media_type);

        Ok(StoredFile {
            filename: name.to_string(),
            bytes: Bytes::from(bytes),
            media_type,
        })
    }

    /// Open a file for streaming out. Returns the handle and its length.
    pub async fn open(&self, name: &str) -> StorageResult<(File, u64)> {
        let path = self.ensure_exists(name).await?;
        let file = File::open(&path)
            .await
            .map_err(|err| not_found_or_io(err, name))?;
        let len = file.metadata().await?.len();
        Ok((file, len))
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await
}

fn not_found_or_io(err: io::Error, name: &str) -> StorageError {
    if err.kind() == ErrorKind::NotFound {
        debug!("file {} not found", name);
        StorageError::NotFound(name.to_string())
    } else {
        StorageError::Io(err)
    }
}

/// Reduce a client-supplied upload name to its last path component.
///
/// Browsers and CLI tools may send `C:\photos\a.png` or `photos/a.png`.
pub fn upload_filename(raw: &str) -> &str {
    raw.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(raw)
}

/// Resolve the media type of a stored file.
///
/// Binary signatures win; text content (XML, HTML, scripts) says little about
/// the intended type, so those fall back to the filename extension, which is
/// how SVG is recognised.
pub fn resolve_media_type(name: &str, bytes: &[u8]) -> String {
    if let Some(kind) = infer::get(bytes) {
        if !matches!(kind.matcher_type(), infer::MatcherType::Text) {
            return kind.mime_type().to_string();
        }
    }

    mime_guess::from_path(name)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}

pub fn is_supported_image(media_type: &str) -> bool {
    SUPPORTED_IMAGE_TYPES.contains(&media_type)
}
