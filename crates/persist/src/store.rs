//! File-backed tileset persistence.
//!
//! Layout inside the store directory:
//! ```text
//! tileset.meta.json  - schema version, tile count, payload hash
//! tileset.cbor.zst   - CBOR+zstd compressed tileset package
//! ```

use crate::package::TilesetPackage;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Current schema version.
const TILESET_SCHEMA_VERSION: u32 = 1;

const META_FILE: &str = "tileset.meta.json";
const PAYLOAD_FILE: &str = "tileset.cbor.zst";

/// Errors from file-backed persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CBOR serialization error: {0}")]
    CborEncode(String),
    #[error("CBOR deserialization error: {0}")]
    CborDecode(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },
    #[error("schema version mismatch: file has v{file_version}, expected v{expected_version}")]
    SchemaMismatch {
        file_version: u32,
        expected_version: u32,
    },
    #[error("no tileset package found at {0}")]
    MissingPackage(PathBuf),
}

/// Metadata stored in tileset.meta.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TilesetMeta {
    pub schema_version: u32,
    pub tile_count: u32,
    /// sha256 of the compressed payload file.
    pub payload_sha256: String,
}

/// File-backed tileset store with schema versioning and integrity
/// checking. Loads are fail-closed: a version or hash mismatch is an
/// error, never a silent partial read.
pub struct TilesetStore {
    root: PathBuf,
}

impl TilesetStore {
    /// Open a store rooted at the given directory, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn meta(&self) -> Result<TilesetMeta, StoreError> {
        let meta_path = self.root.join(META_FILE);
        if !meta_path.exists() {
            return Err(StoreError::MissingPackage(self.root.clone()));
        }
        let meta: TilesetMeta = serde_json::from_reader(std::fs::File::open(&meta_path)?)?;
        if meta.schema_version != TILESET_SCHEMA_VERSION {
            return Err(StoreError::SchemaMismatch {
                file_version: meta.schema_version,
                expected_version: TILESET_SCHEMA_VERSION,
            });
        }
        Ok(meta)
    }

    /// Write the package and its metadata, replacing any previous one.
    pub fn save(&self, package: &TilesetPackage) -> Result<(), StoreError> {
        let cbor_bytes = cbor_serialize(package)?;
        let compressed = zstd_compress(&cbor_bytes)?;
        let payload_sha256 = sha256_hex(&compressed);

        std::fs::write(self.root.join(PAYLOAD_FILE), &compressed)?;
        let meta = TilesetMeta {
            schema_version: TILESET_SCHEMA_VERSION,
            tile_count: package.len() as u32,
            payload_sha256,
        };
        serde_json::to_writer_pretty(std::fs::File::create(self.root.join(META_FILE))?, &meta)?;
        tracing::debug!(tiles = package.len(), path = %self.root.display(), "tileset saved");
        Ok(())
    }

    /// Load the package, verifying schema version and payload hash.
    pub fn load(&self) -> Result<TilesetPackage, StoreError> {
        let meta = self.meta()?;
        let payload_path = self.root.join(PAYLOAD_FILE);
        if !payload_path.exists() {
            return Err(StoreError::MissingPackage(self.root.clone()));
        }
        let compressed = std::fs::read(&payload_path)?;
        let actual = sha256_hex(&compressed);
        if actual != meta.payload_sha256 {
            return Err(StoreError::IntegrityMismatch {
                expected: meta.payload_sha256,
                actual,
            });
        }
        let cbor_bytes = zstd_decompress(&compressed)?;
        let package: TilesetPackage = cbor_deserialize(&cbor_bytes)?;
        tracing::debug!(tiles = package.len(), "tileset loaded");
        Ok(package)
    }
}

pub(crate) fn cbor_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| StoreError::CborEncode(e.to_string()))?;
    Ok(buf)
}

fn cbor_deserialize<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, StoreError> {
    ciborium::from_reader(data).map_err(|e| StoreError::CborDecode(e.to_string()))
}

fn zstd_compress(data: &[u8]) -> Result<Vec<u8>, StoreError> {
    let mut encoder = zstd::Encoder::new(Vec::new(), 3)?;
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn zstd_decompress(data: &[u8]) -> Result<Vec<u8>, StoreError> {
    let mut decoder = zstd::Decoder::new(data)?;
    let mut buf = Vec::new();
    decoder.read_to_end(&mut buf)?;
    Ok(buf)
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
