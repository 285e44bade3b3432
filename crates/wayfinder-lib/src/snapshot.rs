//! Binary snapshots of an assembled building graph.
//!
//! Extraction and assembly only depend on the plan bytes and the
//! [`BuildOptions`], so a graph can be persisted next to its plan and reused
//! as long as both are unchanged.
//!
//! # File Format
//!
//! ```text
//! Header (16 bytes):
//!   - Magic: "WFGS" (4 bytes)
//!   - Version: u8 (currently 1)
//!   - Flags: u8 (bit 0: graph has stair edges)
//!   - Node count: u32 little-endian
//!   - Reserved: 6 bytes
//!
//! Body:
//!   - postcard-serialized snapshot body
//!   - zstd compressed
//!
//! Footer:
//!   - SHA-256 checksum of the compressed body (32 bytes)
//! ```

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::config::BuildOptions;
use crate::error::{Error, Result};
use crate::graph::{EdgeKind, Graph, GraphParts};

/// Magic bytes identifying a graph snapshot file.
const SNAPSHOT_MAGIC: &[u8; 4] = b"WFGS";

/// Current snapshot format version.
const SNAPSHOT_VERSION: u8 = 1;

/// Flag: the graph contains stair-stitching edges.
const FLAG_HAS_STAIRS: u8 = 0x01;

const HEADER_SIZE: usize = 16;

/// Checksum size in bytes (SHA-256).
const CHECKSUM_SIZE: usize = 32;

/// zstd compression level (balanced speed/ratio).
const COMPRESSION_LEVEL: i32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SnapshotBody {
    source_checksum: [u8; 32],
    options: BuildOptions,
    graph: GraphParts,
}

/// A persisted graph together with what it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSnapshot {
    body: SnapshotBody,
}

impl GraphSnapshot {
    /// Capture `graph`, built from `source` with `options`.
    pub fn new(graph: &Graph, source: &[u8], options: &BuildOptions) -> Self {
        Self {
            body: SnapshotBody {
                source_checksum: Sha256::digest(source).into(),
                options: options.clone(),
                graph: graph.to_parts(),
            },
        }
    }

    /// Whether the snapshot was built from exactly this plan and options.
    pub fn matches(&self, source: &[u8], options: &BuildOptions) -> bool {
        let checksum: [u8; 32] = Sha256::digest(source).into();
        self.body.source_checksum == checksum && &self.body.options == options
    }

    pub fn node_count(&self) -> usize {
        self.body.graph.nodes.len()
    }

    /// Re-validate and index the stored graph.
    pub fn into_graph(self) -> Result<Graph> {
        Graph::from_parts(self.body.graph)
    }

    /// Encode into the on-disk format.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let serialized =
            postcard::to_allocvec(&self.body).map_err(|e| Error::SnapshotSerialize {
                message: format!("postcard serialization failed: {}", e),
            })?;

        let compressed =
            zstd::encode_all(serialized.as_slice(), COMPRESSION_LEVEL).map_err(|e| {
                Error::SnapshotSerialize {
                    message: format!("zstd compression failed: {}", e),
                }
            })?;

        let checksum = Sha256::digest(&compressed);

        let has_stairs = self
            .body
            .graph
            .edges
            .iter()
            .any(|edge| edge.kind == EdgeKind::Stairs);
        let flags = if has_stairs { FLAG_HAS_STAIRS } else { 0 };
        let node_count = u32::try_from(self.node_count()).unwrap_or(u32::MAX);

        let mut header = [0u8; HEADER_SIZE];
        header[0..4].copy_from_slice(SNAPSHOT_MAGIC);
        header[4] = SNAPSHOT_VERSION;
        header[5] = flags;
        header[6..10].copy_from_slice(&node_count.to_le_bytes());
        // bytes 10-15 reserved

        let mut bytes = Vec::with_capacity(HEADER_SIZE + compressed.len() + CHECKSUM_SIZE);
        bytes.extend_from_slice(&header);
        bytes.extend_from_slice(&compressed);
        bytes.extend_from_slice(&checksum);
        Ok(bytes)
    }

    /// Decode the on-disk format, verifying header and checksum.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let corrupt = |message: &str| Error::SnapshotDeserialize {
            message: message.to_string(),
        };

        if bytes.len() < HEADER_SIZE + CHECKSUM_SIZE {
            return Err(corrupt("file is too short"));
        }
        let (header, rest) = bytes.split_at(HEADER_SIZE);
        let (compressed, stored_checksum) = rest.split_at(rest.len() - CHECKSUM_SIZE);

        if &header[0..4] != SNAPSHOT_MAGIC {
            return Err(corrupt("invalid magic bytes"));
        }
        let version = header[4];
        if version != SNAPSHOT_VERSION {
            return Err(Error::SnapshotDeserialize {
                message: format!(
                    "unsupported version {} (expected {})",
                    version, SNAPSHOT_VERSION
                ),
            });
        }
        let node_count = u32::from_le_bytes([header[6], header[7], header[8], header[9]]);

        if Sha256::digest(compressed).as_slice() != stored_checksum {
            return Err(corrupt("checksum mismatch - file may be corrupted"));
        }

        let decompressed = zstd::decode_all(compressed).map_err(|e| Error::SnapshotDeserialize {
            message: format!("zstd decompression failed: {}", e),
        })?;
        let body: SnapshotBody =
            postcard::from_bytes(&decompressed).map_err(|e| Error::SnapshotDeserialize {
                message: format!("postcard deserialization failed: {}", e),
            })?;

        if body.graph.nodes.len() != node_count as usize {
            warn!(
                expected = node_count,
                actual = body.graph.nodes.len(),
                "node count mismatch in graph snapshot"
            );
        }

        Ok(Self { body })
    }

    /// Serialize the snapshot to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        info!(
            path = %path.display(),
            nodes = self.node_count(),
            "saving graph snapshot"
        );

        let bytes = self.to_bytes()?;
        let file = fs::File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&bytes)?;
        writer.flush()?;

        info!(file_size = bytes.len(), "graph snapshot saved");
        Ok(())
    }

    /// Load a snapshot from a file.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading graph snapshot");

        let bytes = fs::read(path).map_err(|e| Error::SnapshotLoad {
            path: path.to_path_buf(),
            message: format!("failed to read file: {}", e),
        })?;
        Self::from_bytes(&bytes).map_err(|e| Error::SnapshotLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Derive the snapshot path from a floor-plan path.
///
/// For example, `building.svg` -> `building.svg.graph.bin`.
pub fn snapshot_path(plan_path: &Path) -> PathBuf {
    let mut path = plan_path.as_os_str().to_owned();
    path.push(".graph.bin");
    PathBuf::from(path)
}

/// Load the snapshot stored beside `plan_path` if it was built from
/// `source` with `options`; `None` means the caller should rebuild.
pub fn try_load_snapshot(plan_path: &Path, source: &[u8], options: &BuildOptions) -> Option<Graph> {
    let path = snapshot_path(plan_path);
    if !path.exists() {
        return None;
    }

    let snapshot = match GraphSnapshot::load(&path) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load graph snapshot, will rebuild");
            return None;
        }
    };

    if !snapshot.matches(source, options) {
        warn!(path = %path.display(), "graph snapshot is stale, will rebuild");
        return None;
    }

    match snapshot.into_graph() {
        Ok(graph) => {
            info!(
                nodes = graph.node_count(),
                edges = graph.edge_count(),
                "loaded graph snapshot"
            );
            Some(graph)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "graph snapshot is inconsistent, will rebuild");
            None
        }
    }
}
