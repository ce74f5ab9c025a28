pub mod errors;

pub use errors::{MalformedRule, Result};

use serde::{Deserialize, Serialize};

/// Size of one cache block in bytes; dirty counters are kept in these units.
pub const CACHE_BLOCK_SIZE: u64 = 4096;

/// Number of supported io classes; valid ids are `0..MAX_IO_CLASSES`.
pub const MAX_IO_CLASSES: u32 = 33;

/// Direction of an I/O request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IoDirection {
    Read,
    Write,
}

/// Per-request classification input.
///
/// Built by the filesystem/cache layer from already-resolved metadata and
/// consumed once per request; never persisted. Size and extension are
/// optional because not every request targets a file with a known size or
/// an extension at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Extension of the file the request targets, if the name has one.
    pub file_extension: Option<String>,
    /// Byte offset of this I/O within the file, not within the device.
    pub file_offset: u64,
    /// Total file size at operation time: post-write size for writes,
    /// current size for reads.
    pub file_size: Option<u64>,
    pub direction: IoDirection,
}

impl RequestContext {
    pub fn new(direction: IoDirection) -> Self {
        Self {
            file_extension: None,
            file_offset: 0,
            file_size: None,
            direction,
        }
    }

    /// Context for an I/O against a named file or path.
    pub fn for_file(name: &str, direction: IoDirection) -> Self {
        Self {
            file_extension: file_extension(name).map(str::to_string),
            ..Self::new(direction)
        }
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.file_offset = offset;
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.file_size = Some(size);
        self
    }
}

/// Extension of a file name: the substring after the final `.` of the last
/// path component. A dot-less name has no extension.
pub fn file_extension(name: &str) -> Option<&str> {
    let base = name.rsplit('/').next().unwrap_or(name);
    base.rsplit_once('.').map(|(_, ext)| ext)
}
