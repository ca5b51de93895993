//! # VOFP Index
//!
//! The fingerprint corpus: every previously indexed video's coarse fingerprint
//! plus minimal metadata, keyed by video identifier.
//!
//! ## Core Features
//!
//! - **Narrow store trait**: decision logic only sees [`FingerprintStore`]
//!   (`upsert`, `all`, `get`, `len`), so it can run against an in-memory
//!   corpus in tests and against redb in production.
//! - **Pluggable backends**: [`FingerprintIndex`] stores encoded records in
//!   any [`IndexBackend`]: [`InMemoryBackend`] or, with the default
//!   `backend-redb` feature, [`RedbBackend`].
//! - **Validated reads**: vectors are stored as raw little-endian `f32` bytes
//!   next to their declared length. Every read checks one against the other;
//!   a mismatch is [`IndexError::Corrupted`], never a silently shortened
//!   vector.
//!
//! ## Example Usage
//!
//! ```
//! use index::{BackendConfig, FingerprintIndex, FingerprintStore};
//!
//! let index = FingerprintIndex::new(&BackendConfig::in_memory()).unwrap();
//! index.upsert("abc123", "https://example.com/v/abc123", Some("clip"), &[0.6, 0.8]).unwrap();
//!
//! assert_eq!(index.get("abc123").unwrap(), Some(vec![0.6, 0.8]));
//! assert_eq!(index.all().unwrap()[0].title.as_deref(), Some("clip"));
//! ```

mod backend;

#[cfg(feature = "backend-redb")]
pub use backend::RedbBackend;
pub use backend::{BackendConfig, InMemoryBackend, IndexBackend};

use bincode::config::standard;
use bincode::error::{DecodeError, EncodeError};
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Bump this value whenever the on-disk record layout changes.
pub const INDEX_SCHEMA_VERSION: u16 = 1;

const F32_BYTES: usize = std::mem::size_of::<f32>();

/// One stored corpus entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusEntry {
    pub id: String,
    pub url: String,
    pub title: Option<String>,
    pub vector: Vec<f32>,
}

/// Persistent key-value corpus keyed by video identifier.
pub trait FingerprintStore: Send + Sync {
    /// Insert or fully replace the entry for `id`.
    fn upsert(&self, id: &str, url: &str, title: Option<&str>, vector: &[f32])
        -> Result<(), IndexError>;

    /// Every stored entry. Order is stable for an unchanged corpus.
    fn all(&self) -> Result<Vec<CorpusEntry>, IndexError>;

    /// Point lookup of a stored vector.
    fn get(&self, id: &str) -> Result<Option<Vec<f32>>, IndexError>;

    /// Number of stored entries.
    fn len(&self) -> Result<usize, IndexError>;

    fn is_empty(&self) -> Result<bool, IndexError> {
        Ok(self.len()? == 0)
    }
}

/// On-disk layout of one entry.
#[derive(Serialize, Deserialize, Clone, Debug)]
struct StoredRecord {
    #[serde(default = "default_schema_version")]
    schema_version: u16,
    id: String,
    url: String,
    title: Option<String>,
    /// Declared element count of `vector_bytes`.
    vector_len: u32,
    /// Little-endian `f32` values.
    vector_bytes: Vec<u8>,
}

const fn default_schema_version() -> u16 {
    INDEX_SCHEMA_VERSION
}

/// Errors raised by the corpus.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("backend error: {0}")]
    Backend(String),
    #[error("serialization encode error: {0}")]
    Encode(String),
    #[error("serialization decode error: {0}")]
    Decode(String),
    #[error("corrupted record {id}: declared {declared} floats but found {actual} bytes")]
    Corrupted {
        id: String,
        declared: usize,
        actual: usize,
    },
    #[error("corrupted record {id}: {extra} trailing bytes after the record")]
    TrailingBytes { id: String, extra: usize },
}

impl From<EncodeError> for IndexError {
    fn from(e: EncodeError) -> Self {
        IndexError::Encode(e.to_string())
    }
}

impl From<DecodeError> for IndexError {
    fn from(e: DecodeError) -> Self {
        IndexError::Decode(e.to_string())
    }
}

impl IndexError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Serialize an entry into its stored byte form.
pub fn encode_entry(
    id: &str,
    url: &str,
    title: Option<&str>,
    vector: &[f32],
) -> Result<Vec<u8>, IndexError> {
    let vector_len = u32::try_from(vector.len())
        .map_err(|_| IndexError::Encode(format!("vector too long: {}", vector.len())))?;
    let mut vector_bytes = Vec::with_capacity(vector.len() * F32_BYTES);
    for v in vector {
        vector_bytes.extend_from_slice(&v.to_le_bytes());
    }
    let record = StoredRecord {
        schema_version: INDEX_SCHEMA_VERSION,
        id: id.to_string(),
        url: url.to_string(),
        title: title.map(str::to_string),
        vector_len,
        vector_bytes,
    };
    Ok(encode_to_vec(&record, standard())?)
}

/// Decode and validate a stored entry.
pub fn decode_entry(data: &[u8]) -> Result<CorpusEntry, IndexError> {
    let (record, consumed): (StoredRecord, usize) = decode_from_slice(data, standard())?;
    if consumed != data.len() {
        return Err(IndexError::TrailingBytes {
            id: record.id,
            extra: data.len() - consumed,
        });
    }
    if record.schema_version > INDEX_SCHEMA_VERSION {
        return Err(IndexError::Decode(format!(
            "unsupported schema version {} for {}",
            record.schema_version, record.id
        )));
    }
    let declared = record.vector_len as usize;
    if record.vector_bytes.len() != declared * F32_BYTES {
        return Err(IndexError::Corrupted {
            id: record.id,
            declared,
            actual: record.vector_bytes.len(),
        });
    }
    let vector = record
        .vector_bytes
        .chunks_exact(F32_BYTES)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    Ok(CorpusEntry {
        id: record.id,
        url: record.url,
        title: record.title,
        vector,
    })
}

/// [`FingerprintStore`] over any [`IndexBackend`].
pub struct FingerprintIndex {
    backend: Box<dyn IndexBackend>,
}

impl FingerprintIndex {
    /// Build the backend described by `cfg` and wrap it.
    pub fn new(cfg: &BackendConfig) -> Result<Self, IndexError> {
        Ok(Self::with_backend(cfg.build()?))
    }

    /// Wrap an existing backend.
    pub fn with_backend(backend: Box<dyn IndexBackend>) -> Self {
        Self { backend }
    }

    /// Remove the entry for `id`, if any.
    pub fn delete(&self, id: &str) -> Result<(), IndexError> {
        self.backend.delete(id)
    }

    /// Flush backend buffers if supported.
    pub fn flush(&self) -> Result<(), IndexError> {
        self.backend.flush()
    }

    /// Full entry lookup, metadata included.
    pub fn entry(&self, id: &str) -> Result<Option<CorpusEntry>, IndexError> {
        self.backend
            .get(id)?
            .map(|data| decode_entry(&data))
            .transpose()
    }
}

impl FingerprintStore for FingerprintIndex {
    fn upsert(
        &self,
        id: &str,
        url: &str,
        title: Option<&str>,
        vector: &[f32],
    ) -> Result<(), IndexError> {
        let payload = encode_entry(id, url, title, vector)?;
        self.backend.put(id, &payload)?;
        debug!(id, dims = vector.len(), "stored fingerprint");
        Ok(())
    }

    fn all(&self) -> Result<Vec<CorpusEntry>, IndexError> {
        let mut out = Vec::new();
        self.backend.scan(&mut |data| {
            out.push(decode_entry(data)?);
            Ok(())
        })?;
        Ok(out)
    }

    fn get(&self, id: &str) -> Result<Option<Vec<f32>>, IndexError> {
        Ok(self.entry(id)?.map(|e| e.vector))
    }

    fn len(&self) -> Result<usize, IndexError> {
        self.backend.len()
    }
}
