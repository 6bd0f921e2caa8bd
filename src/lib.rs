pub mod gpu;
pub mod utils;

pub use gpu::driver::types::{
    BindSlot, DrawMode, IndexType, ObjectKind, PixelFormat, QueryTarget, RawHandle, StorageFlags,
    UsageHint, WaitFlags, WaitStatus,
};
pub use gpu::driver::{Driver, DriverCall, RecordingDriver};
pub use gpu::*;
pub use utils::MemoryBlock;
