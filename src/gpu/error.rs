use std::fmt;

use super::driver::types::{ObjectKind, PixelFormat, RawHandle};

/// Failure surface of the crate.
///
/// Contract violations (`NotAllocated`, `MissingIndirectBuffer`,
/// `MissingIndexBuffer`, `ImmutableReinit`, `StagingOverflow`) signal caller
/// bugs and are never retried. Exhaustion (`OutOfHostMemory`,
/// `OutOfDeviceMemory`) is surfaced separately so callers can degrade instead
/// of crashing. Driver rejections (`InvalidHandle`, `UnsupportedFormat`,
/// `WaitFailed`) report what the driver refused. A fence timeout is a
/// [`WaitStatus`](super::driver::types::WaitStatus) value, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlazeError {
    /// The object was released (or never allocated) and cannot be used.
    NotAllocated { kind: ObjectKind },
    /// A raw handle failed driver validation during reconstruction.
    InvalidHandle { kind: ObjectKind, handle: RawHandle },
    /// A multi-command batch reached the renderer without pre-serialized
    /// indirect commands.
    MissingIndirectBuffer,
    /// An indexed draw was submitted on a vertex binding with no index buffer
    /// attached.
    MissingIndexBuffer,
    /// A second full reinitialization of fixed-storage buffer contents.
    ImmutableReinit,
    /// A write past the end of a fixed-capacity staging region.
    StagingOverflow { capacity: usize, requested: usize },
    OutOfHostMemory { requested: usize },
    OutOfDeviceMemory { requested: usize },
    UnsupportedFormat(PixelFormat),
    /// The driver reported a wait failure (device lost).
    WaitFailed,
}

impl fmt::Display for GlazeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlazeError::NotAllocated { kind } => {
                write!(f, "{:?} object is not allocated", kind)
            }
            GlazeError::InvalidHandle { kind, handle } => {
                write!(f, "handle {} is not a live {:?} object", handle, kind)
            }
            GlazeError::MissingIndirectBuffer => {
                write!(f, "multi-command batch has no indirect command buffer")
            }
            GlazeError::MissingIndexBuffer => {
                write!(f, "indexed draw without an index buffer attached")
            }
            GlazeError::ImmutableReinit => {
                write!(f, "immutable buffer storage cannot be reinitialized")
            }
            GlazeError::StagingOverflow {
                capacity,
                requested,
            } => {
                write!(
                    f,
                    "staging write of {} bytes exceeds capacity {}",
                    requested, capacity
                )
            }
            GlazeError::OutOfHostMemory { requested } => {
                write!(f, "host allocation of {} bytes failed", requested)
            }
            GlazeError::OutOfDeviceMemory { requested } => {
                write!(f, "device allocation of {} bytes failed", requested)
            }
            GlazeError::UnsupportedFormat(format) => {
                write!(f, "pixel format {:?} is not supported", format)
            }
            GlazeError::WaitFailed => write!(f, "fence wait failed"),
        }
    }
}

impl std::error::Error for GlazeError {}

/// Convenient crate-wide result type.
pub type Result<T, E = GlazeError> = std::result::Result<T, E>;
