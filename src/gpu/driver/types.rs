use bitflags::bitflags;

#[cfg(feature = "glaze-serde")]
use serde::{Deserialize, Serialize};

/// Raw driver-side object name. Zero is never produced by allocation.
pub type RawHandle = u32;

/// Discriminator for every driver object the crate manages. Used for debug
/// labeling, kind-dispatched deletion, and type-narrowing when wrapper objects
/// are rebuilt from raw handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "glaze-serde", derive(Serialize, Deserialize))]
pub enum ObjectKind {
    Buffer,
    Image,
    Query,
    Fence,
    Program,
    VertexBinding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "glaze-serde", derive(Serialize, Deserialize))]
pub enum DrawMode {
    Points,
    Lines,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "glaze-serde", derive(Serialize, Deserialize))]
pub enum IndexType {
    U16,
    #[default]
    U32,
}

impl IndexType {
    pub fn byte_width(self) -> usize {
        match self {
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

/// Driver hint for how often mutable buffer contents will be replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "glaze-serde", derive(Serialize, Deserialize))]
pub enum UsageHint {
    #[default]
    StaticDraw,
    DynamicDraw,
    StreamDraw,
}

impl UsageHint {
    pub fn to_raw(self) -> i64 {
        match self {
            UsageHint::StaticDraw => 0,
            UsageHint::DynamicDraw => 1,
            UsageHint::StreamDraw => 2,
        }
    }

    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(UsageHint::StaticDraw),
            1 => Some(UsageHint::DynamicDraw),
            2 => Some(UsageHint::StreamDraw),
            _ => None,
        }
    }
}

bitflags! {
    /// Capabilities fixed at creation time for immutable buffer storage.
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StorageFlags: u32 {
        const MAP_READ       = 0x1;
        const MAP_WRITE      = 0x2;
        const MAP_PERSISTENT = 0x4;
        const MAP_COHERENT   = 0x8;
        const DYNAMIC_WRITE  = 0x10;
        const CLIENT_STORAGE = 0x20;
    }
}

bitflags! {
    /// Options for a host-side fence wait.
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WaitFlags: u32 {
        /// Flush pending commands before waiting, so the fence can actually
        /// be reached.
        const FLUSH_COMMANDS = 0x1;
    }
}

/// Per-buffer values the driver can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferParameter {
    Size,
    Usage,
    StorageFlags,
    Immutable,
}

/// Indexed binding-point namespaces a buffer can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "glaze-serde", derive(Serialize, Deserialize))]
pub enum BindSlot {
    Uniform,
    ShaderStorage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "glaze-serde", derive(Serialize, Deserialize))]
pub enum PixelFormat {
    R8,
    RG8,
    RGB8,
    RGBA8,
    BGRA8,
    RGBA32F,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::R8 => 1,
            PixelFormat::RG8 => 2,
            PixelFormat::RGB8 => 3,
            PixelFormat::RGBA8 | PixelFormat::BGRA8 => 4,
            PixelFormat::RGBA32F => 16,
        }
    }
}

/// Measurement kinds a query object can bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "glaze-serde", derive(Serialize, Deserialize))]
pub enum QueryTarget {
    TimeElapsed,
    SamplesPassed,
}

/// Outcome of a host-side fence wait. A timeout is an expected result, not an
/// error; driver failure surfaces as [`GlazeError::WaitFailed`].
///
/// [`GlazeError::WaitFailed`]: crate::GlazeError::WaitFailed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitStatus {
    /// The fence had signaled before the wait began.
    AlreadySignaled,
    /// The fence signaled while the host was blocked.
    ConditionSatisfied,
    /// The timeout expired with the fence still unsignaled.
    TimedOut,
}
