//! A file held by the storage root, as seen by readers.

use bytes::Bytes;

/// A stored file loaded into memory.
///
/// The media type is not persisted anywhere; it is resolved from the bytes
/// (falling back to the filename extension) every time the file is loaded.
#[derive(Clone, Debug)]
pub struct StoredFile {
    /// Name the file is addressed by, unique within the storage root.
    pub filename: String,

    /// Full payload.
    pub bytes: Bytes,

    /// Resolved media type (e.g. `image/png`).
    pub media_type: String,
}
