use super::driver::types::{
    BufferParameter, IndexType, ObjectKind, RawHandle, StorageFlags, UsageHint,
};
use super::driver::Driver;
use super::object::{validate_raw, GpuObject, RawObject};
use crate::utils::memory::MemoryBlock;
use crate::{GlazeError, Result};

#[derive(Debug, Clone, Copy)]
pub struct BufferInfo<'a> {
    pub debug_name: &'a str,
    pub byte_size: usize,
    pub usage: UsageHint,
    pub initial_data: Option<&'a [u8]>,
}

impl<'a> Default for BufferInfo<'a> {
    fn default() -> Self {
        Self {
            debug_name: "",
            byte_size: 1024,
            usage: UsageHint::StaticDraw,
            initial_data: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ImmutableBufferInfo<'a> {
    pub debug_name: &'a str,
    pub byte_size: usize,
    pub flags: StorageFlags,
    pub initial_data: Option<&'a [u8]>,
}

impl<'a> Default for ImmutableBufferInfo<'a> {
    fn default() -> Self {
        Self {
            debug_name: "",
            byte_size: 1024,
            flags: StorageFlags::DYNAMIC_WRITE,
            initial_data: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Storage {
    /// Contents and size replaceable any number of times; the usage hint is
    /// retained across reinitialization.
    Mutable { usage: UsageHint },
    /// Size and flags fixed at creation. Sub-range writes stay legal.
    Immutable,
}

/// A driver buffer object holding vertex, index, indirect-command, or
/// general-purpose data.
///
/// Size, usage, and storage flags are queried from the driver on first use
/// and cached per instance; [`Buffer::reinitialize`] invalidates the cache.
#[derive(Debug)]
pub struct Buffer {
    raw: RawObject,
    storage: Storage,
    cached_size: Option<usize>,
    cached_usage: Option<UsageHint>,
    cached_flags: Option<StorageFlags>,
}

impl Buffer {
    /// Create a mutable buffer.
    pub fn new(driver: &mut dyn Driver, info: &BufferInfo) -> Result<Self> {
        let handle = driver.create_buffer()?;
        if let Err(err) = driver.buffer_data(handle, info.initial_data, info.byte_size, info.usage)
        {
            driver.delete_object(ObjectKind::Buffer, handle);
            return Err(err);
        }
        if !info.debug_name.is_empty() {
            driver.set_debug_name(ObjectKind::Buffer, handle, info.debug_name);
        }
        log::debug!(
            "buffer {} allocated, {} bytes ({:?})",
            handle,
            info.byte_size,
            info.usage
        );
        Ok(Self {
            raw: RawObject::new(handle, ObjectKind::Buffer),
            storage: Storage::Mutable { usage: info.usage },
            cached_size: None,
            cached_usage: None,
            cached_flags: None,
        })
    }

    /// Create a buffer with fixed storage; its size and flags never change.
    pub fn immutable(driver: &mut dyn Driver, info: &ImmutableBufferInfo) -> Result<Self> {
        let handle = driver.create_buffer()?;
        if let Err(err) =
            driver.buffer_storage(handle, info.initial_data, info.byte_size, info.flags)
        {
            driver.delete_object(ObjectKind::Buffer, handle);
            return Err(err);
        }
        if !info.debug_name.is_empty() {
            driver.set_debug_name(ObjectKind::Buffer, handle, info.debug_name);
        }
        log::debug!(
            "immutable buffer {} allocated, {} bytes ({:?})",
            handle,
            info.byte_size,
            info.flags
        );
        Ok(Self {
            raw: RawObject::new(handle, ObjectKind::Buffer),
            storage: Storage::Immutable,
            cached_size: None,
            cached_usage: None,
            cached_flags: None,
        })
    }

    /// Wrap a raw buffer handle after validating it against the driver.
    pub fn from_raw(driver: &dyn Driver, handle: RawHandle) -> Result<Self> {
        let raw = validate_raw(driver, ObjectKind::Buffer, handle)?;
        Ok(Self::wrap_raw(raw, driver.buffer_parameter(handle, BufferParameter::Immutable) != 0))
    }

    /// Wrap a raw buffer handle, trusting the caller that it is live.
    pub fn from_raw_unchecked(handle: RawHandle) -> Self {
        Self::wrap_raw(RawObject::new(handle, ObjectKind::Buffer), false)
    }

    fn wrap_raw(raw: RawObject, immutable: bool) -> Self {
        let storage = if immutable {
            Storage::Immutable
        } else {
            Storage::Mutable {
                usage: UsageHint::StaticDraw,
            }
        };
        Self {
            raw,
            storage,
            cached_size: None,
            cached_usage: None,
            cached_flags: None,
        }
    }

    /// Replace backing storage and size. Valid any number of times on a
    /// mutable buffer, retaining its usage hint; rejected on immutable
    /// storage.
    pub fn reinitialize(&mut self, driver: &mut dyn Driver, data: Option<&[u8]>, size: usize) -> Result<()> {
        let usage = match self.storage {
            Storage::Mutable { usage } => usage,
            Storage::Immutable => return Err(GlazeError::ImmutableReinit),
        };
        let handle = self.raw.handle()?;
        driver.buffer_data(handle, data, size, usage)?;
        self.invalidate_cache();
        Ok(())
    }

    /// Write `data` at `offset`, within the current size. Legal for both
    /// storage modes.
    pub fn write(&self, driver: &mut dyn Driver, offset: usize, data: &[u8]) -> Result<()> {
        let handle = self.raw.handle()?;
        driver.buffer_sub_data(handle, offset, data)
    }

    /// Stage the contents of a host memory block at `offset`.
    pub fn write_block(
        &self,
        driver: &mut dyn Driver,
        offset: usize,
        block: &MemoryBlock,
    ) -> Result<()> {
        self.write(driver, offset, block.as_slice())
    }

    /// Byte size, driver-queried once and cached until reinitialization.
    pub fn size(&mut self, driver: &dyn Driver) -> Result<usize> {
        let handle = self.raw.handle()?;
        if let Some(size) = self.cached_size {
            return Ok(size);
        }
        let size = driver.buffer_parameter(handle, BufferParameter::Size) as usize;
        self.cached_size = Some(size);
        Ok(size)
    }

    /// Usage hint, driver-queried once and cached until reinitialization.
    pub fn usage(&mut self, driver: &dyn Driver) -> Result<UsageHint> {
        let handle = self.raw.handle()?;
        if let Some(usage) = self.cached_usage {
            return Ok(usage);
        }
        let usage = UsageHint::from_raw(driver.buffer_parameter(handle, BufferParameter::Usage))
            .unwrap_or_default();
        self.cached_usage = Some(usage);
        Ok(usage)
    }

    /// Storage flags, driver-queried once and cached until reinitialization.
    pub fn flags(&mut self, driver: &dyn Driver) -> Result<StorageFlags> {
        let handle = self.raw.handle()?;
        if let Some(flags) = self.cached_flags {
            return Ok(flags);
        }
        let bits = driver.buffer_parameter(handle, BufferParameter::StorageFlags) as u32;
        let flags = StorageFlags::from_bits_truncate(bits);
        self.cached_flags = Some(flags);
        Ok(flags)
    }

    pub fn is_immutable(&self) -> bool {
        matches!(self.storage, Storage::Immutable)
    }

    fn invalidate_cache(&mut self) {
        self.cached_size = None;
        self.cached_usage = None;
        self.cached_flags = None;
    }
}

impl GpuObject for Buffer {
    fn raw(&self) -> &RawObject {
        &self.raw
    }

    fn raw_mut(&mut self) -> &mut RawObject {
        &mut self.raw
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VertexBindingInfo<'a> {
    pub debug_name: &'a str,
}

/// Vertex input configuration object: attribute buffer attachments plus an
/// optional index buffer. The renderer picks the indexed or array indirect
/// entry point based on whether an index buffer is attached here.
#[derive(Debug)]
pub struct VertexBinding {
    raw: RawObject,
    index_type: Option<IndexType>,
}

impl VertexBinding {
    pub fn new(driver: &mut dyn Driver, info: &VertexBindingInfo) -> Result<Self> {
        let handle = driver.create_vertex_binding()?;
        if !info.debug_name.is_empty() {
            driver.set_debug_name(ObjectKind::VertexBinding, handle, info.debug_name);
        }
        Ok(Self {
            raw: RawObject::new(handle, ObjectKind::VertexBinding),
            index_type: None,
        })
    }

    pub fn from_raw(driver: &dyn Driver, handle: RawHandle) -> Result<Self> {
        let raw = validate_raw(driver, ObjectKind::VertexBinding, handle)?;
        Ok(Self {
            raw,
            index_type: None,
        })
    }

    pub fn from_raw_unchecked(handle: RawHandle) -> Self {
        Self {
            raw: RawObject::new(handle, ObjectKind::VertexBinding),
            index_type: None,
        }
    }

    /// Attach `buffer` as the attribute source for `slot`, reading vertices
    /// `stride` bytes apart starting at `offset`.
    pub fn attach_vertex_buffer(
        &self,
        driver: &mut dyn Driver,
        buffer: &Buffer,
        slot: u32,
        offset: usize,
        stride: usize,
    ) -> Result<()> {
        driver.attach_vertex_buffer(self.raw.handle()?, buffer.handle()?, slot, offset, stride);
        Ok(())
    }

    /// Attach `buffer` as the index source, recording the index width for
    /// later draws.
    pub fn attach_index_buffer(
        &mut self,
        driver: &mut dyn Driver,
        buffer: &Buffer,
        index_type: IndexType,
    ) -> Result<()> {
        self.attach_index_buffer_raw(driver, buffer.handle()?, index_type)
    }

    /// Attach a shared index buffer by handle. Used for buffers owned
    /// elsewhere, like the per-context quad index buffer.
    pub fn attach_index_buffer_raw(
        &mut self,
        driver: &mut dyn Driver,
        buffer: RawHandle,
        index_type: IndexType,
    ) -> Result<()> {
        driver.attach_index_buffer(self.raw.handle()?, buffer);
        self.index_type = Some(index_type);
        Ok(())
    }

    pub fn has_index_buffer(&self) -> bool {
        self.index_type.is_some()
    }

    pub fn index_type(&self) -> Option<IndexType> {
        self.index_type
    }

    pub fn bind(&self, driver: &mut dyn Driver) -> Result<()> {
        driver.bind_vertex_binding(self.raw.handle()?);
        Ok(())
    }
}

impl GpuObject for VertexBinding {
    fn raw(&self) -> &RawObject {
        &self.raw
    }

    fn raw_mut(&mut self) -> &mut RawObject {
        &mut self.raw
    }
}
