use std::collections::{HashMap, HashSet};

use super::types::*;
use super::Driver;
use crate::{GlazeError, Result};

/// One recorded driver submission.
///
/// Read-only parameter queries (`buffer_parameter`, `debug_name`,
/// `resource_block_index`, `query_result_available`, `query_result`) are not
/// recorded; the log captures the calls that change driver state or submit
/// work.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    CreateObject {
        kind: ObjectKind,
        handle: RawHandle,
    },
    DeleteObject {
        kind: ObjectKind,
        handle: RawHandle,
    },
    SetDebugName {
        kind: ObjectKind,
        handle: RawHandle,
        name: String,
    },
    BufferData {
        handle: RawHandle,
        size: usize,
        usage: UsageHint,
    },
    BufferStorage {
        handle: RawHandle,
        size: usize,
        flags: StorageFlags,
    },
    BufferSubData {
        handle: RawHandle,
        offset: usize,
        len: usize,
    },
    BindVertexBinding {
        handle: RawHandle,
    },
    AttachVertexBuffer {
        binding: RawHandle,
        buffer: RawHandle,
        slot: u32,
        offset: usize,
        stride: usize,
    },
    AttachIndexBuffer {
        binding: RawHandle,
        buffer: RawHandle,
    },
    BindProgram {
        handle: RawHandle,
    },
    UnbindProgram,
    SetUniformMatrix {
        program: RawHandle,
        name: String,
    },
    BindBufferSlot {
        slot: BindSlot,
        index: u32,
        buffer: RawHandle,
    },
    DrawArrays {
        mode: DrawMode,
        first_vertex: u32,
        vertex_count: u32,
        instance_count: u32,
        base_instance: u32,
    },
    DrawElements {
        mode: DrawMode,
        index_type: IndexType,
        vertex_count: u32,
        first_index: u32,
        base_vertex: i32,
        instance_count: u32,
        base_instance: u32,
    },
    BindIndirectBuffer {
        buffer: RawHandle,
    },
    MultiDrawArraysIndirect {
        mode: DrawMode,
        offset: usize,
        draw_count: u32,
        stride: u32,
    },
    MultiDrawElementsIndirect {
        mode: DrawMode,
        index_type: IndexType,
        offset: usize,
        draw_count: u32,
        stride: u32,
    },
    ImageStorage {
        handle: RawHandle,
        width: u32,
        height: u32,
        format: PixelFormat,
    },
    ImageSubImage {
        handle: RawHandle,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    ClientWait {
        fence: RawHandle,
        flags: WaitFlags,
        timeout_ns: u64,
    },
    ServerWait {
        fence: RawHandle,
    },
    BeginQuery {
        handle: RawHandle,
        target: QueryTarget,
    },
    EndQuery {
        target: QueryTarget,
    },
}

#[derive(Debug, Default)]
struct BufferState {
    bytes: Vec<u8>,
    usage: UsageHint,
    flags: StorageFlags,
    immutable: bool,
}

/// Headless [`Driver`] that interprets every call without real GPU work,
/// retaining buffer contents byte-for-byte and an ordered log of submissions.
///
/// This is the crate's reference backend for tests and tooling: assertions can
/// replay the call log, count submissions, and inspect what an upload actually
/// serialized. Fences and query results are host-controlled via
/// [`RecordingDriver::signal_fence`] and [`RecordingDriver::set_query_result`].
#[derive(Debug, Default)]
pub struct RecordingDriver {
    next_handle: RawHandle,
    objects: HashMap<RawHandle, ObjectKind>,
    labels: HashMap<(ObjectKind, RawHandle), String>,
    buffers: HashMap<RawHandle, BufferState>,
    images: HashMap<RawHandle, (u32, u32, PixelFormat)>,
    block_indices: HashMap<(RawHandle, BindSlot, String), u32>,
    signaled: HashSet<RawHandle>,
    signal_on_wait: HashSet<RawHandle>,
    query_results: HashMap<RawHandle, u64>,
    calls: Vec<DriverCall>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DriverCall] {
        &self.calls
    }

    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    /// Drop the recorded log, keeping object state.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of objects currently alive in the driver.
    pub fn live_objects(&self) -> usize {
        self.objects.len()
    }

    /// Current contents of a buffer, if it is alive.
    pub fn buffer_bytes(&self, handle: RawHandle) -> Option<&[u8]> {
        self.buffers.get(&handle).map(|b| b.bytes.as_slice())
    }

    /// Mark a fence signaled; subsequent waits return `AlreadySignaled`.
    pub fn signal_fence(&mut self, fence: RawHandle) {
        self.signaled.insert(fence);
    }

    /// Arrange for the next `client_wait` on `fence` to block "successfully":
    /// it returns `ConditionSatisfied` and leaves the fence signaled.
    pub fn signal_fence_on_wait(&mut self, fence: RawHandle) {
        self.signal_on_wait.insert(fence);
    }

    /// Publish a finished query result, making it poll as available.
    pub fn set_query_result(&mut self, query: RawHandle, value: u64) {
        self.query_results.insert(query, value);
    }

    /// Declare a named uniform/storage block on a program, as a linked shader
    /// would.
    pub fn define_resource_block(
        &mut self,
        program: RawHandle,
        slot: BindSlot,
        name: &str,
        index: u32,
    ) {
        self.block_indices
            .insert((program, slot, name.to_string()), index);
    }

    fn alloc(&mut self, kind: ObjectKind) -> RawHandle {
        self.next_handle += 1;
        let handle = self.next_handle;
        self.objects.insert(handle, kind);
        self.calls.push(DriverCall::CreateObject { kind, handle });
        handle
    }
}

impl Driver for RecordingDriver {
    fn create_buffer(&mut self) -> Result<RawHandle> {
        let handle = self.alloc(ObjectKind::Buffer);
        self.buffers.insert(handle, BufferState::default());
        Ok(handle)
    }

    fn create_vertex_binding(&mut self) -> Result<RawHandle> {
        Ok(self.alloc(ObjectKind::VertexBinding))
    }

    fn create_image(&mut self) -> Result<RawHandle> {
        Ok(self.alloc(ObjectKind::Image))
    }

    fn create_query(&mut self, _target: QueryTarget) -> Result<RawHandle> {
        Ok(self.alloc(ObjectKind::Query))
    }

    fn create_fence(&mut self) -> Result<RawHandle> {
        Ok(self.alloc(ObjectKind::Fence))
    }

    fn create_program(&mut self) -> Result<RawHandle> {
        Ok(self.alloc(ObjectKind::Program))
    }

    fn delete_object(&mut self, kind: ObjectKind, handle: RawHandle) {
        if self.objects.remove(&handle).is_none() {
            return;
        }
        self.labels.remove(&(kind, handle));
        self.buffers.remove(&handle);
        self.images.remove(&handle);
        self.signaled.remove(&handle);
        self.signal_on_wait.remove(&handle);
        self.query_results.remove(&handle);
        self.calls.push(DriverCall::DeleteObject { kind, handle });
    }

    fn is_kind(&self, kind: ObjectKind, handle: RawHandle) -> bool {
        self.objects.get(&handle) == Some(&kind)
    }

    fn set_debug_name(&mut self, kind: ObjectKind, handle: RawHandle, name: &str) {
        self.labels.insert((kind, handle), name.to_string());
        self.calls.push(DriverCall::SetDebugName {
            kind,
            handle,
            name: name.to_string(),
        });
    }

    fn debug_name(&self, kind: ObjectKind, handle: RawHandle) -> String {
        self.labels
            .get(&(kind, handle))
            .cloned()
            .unwrap_or_default()
    }

    fn buffer_data(
        &mut self,
        handle: RawHandle,
        data: Option<&[u8]>,
        size: usize,
        usage: UsageHint,
    ) -> Result<()> {
        let state = self
            .buffers
            .get_mut(&handle)
            .ok_or(GlazeError::InvalidHandle {
                kind: ObjectKind::Buffer,
                handle,
            })?;
        if state.immutable {
            return Err(GlazeError::ImmutableReinit);
        }
        state.bytes = match data {
            Some(d) => d[..size.min(d.len())].to_vec(),
            None => vec![0; size],
        };
        state.bytes.resize(size, 0);
        state.usage = usage;
        self.calls.push(DriverCall::BufferData {
            handle,
            size,
            usage,
        });
        Ok(())
    }

    fn buffer_storage(
        &mut self,
        handle: RawHandle,
        data: Option<&[u8]>,
        size: usize,
        flags: StorageFlags,
    ) -> Result<()> {
        let state = self
            .buffers
            .get_mut(&handle)
            .ok_or(GlazeError::InvalidHandle {
                kind: ObjectKind::Buffer,
                handle,
            })?;
        if state.immutable {
            return Err(GlazeError::ImmutableReinit);
        }
        state.bytes = match data {
            Some(d) => d[..size.min(d.len())].to_vec(),
            None => vec![0; size],
        };
        state.bytes.resize(size, 0);
        state.flags = flags;
        state.immutable = true;
        self.calls.push(DriverCall::BufferStorage {
            handle,
            size,
            flags,
        });
        Ok(())
    }

    fn buffer_sub_data(&mut self, handle: RawHandle, offset: usize, data: &[u8]) -> Result<()> {
        let state = self
            .buffers
            .get_mut(&handle)
            .ok_or(GlazeError::InvalidHandle {
                kind: ObjectKind::Buffer,
                handle,
            })?;
        let end = offset + data.len();
        if end > state.bytes.len() {
            return Err(GlazeError::StagingOverflow {
                capacity: state.bytes.len(),
                requested: end,
            });
        }
        state.bytes[offset..end].copy_from_slice(data);
        self.calls.push(DriverCall::BufferSubData {
            handle,
            offset,
            len: data.len(),
        });
        Ok(())
    }

    fn buffer_parameter(&self, handle: RawHandle, param: BufferParameter) -> i64 {
        let Some(state) = self.buffers.get(&handle) else {
            return 0;
        };
        match param {
            BufferParameter::Size => state.bytes.len() as i64,
            BufferParameter::Usage => state.usage.to_raw(),
            BufferParameter::StorageFlags => state.flags.bits() as i64,
            BufferParameter::Immutable => state.immutable as i64,
        }
    }

    fn bind_vertex_binding(&mut self, handle: RawHandle) {
        self.calls.push(DriverCall::BindVertexBinding { handle });
    }

    fn attach_vertex_buffer(
        &mut self,
        binding: RawHandle,
        buffer: RawHandle,
        slot: u32,
        offset: usize,
        stride: usize,
    ) {
        self.calls.push(DriverCall::AttachVertexBuffer {
            binding,
            buffer,
            slot,
            offset,
            stride,
        });
    }

    fn attach_index_buffer(&mut self, binding: RawHandle, buffer: RawHandle) {
        self.calls
            .push(DriverCall::AttachIndexBuffer { binding, buffer });
    }

    fn bind_program(&mut self, handle: RawHandle) {
        self.calls.push(DriverCall::BindProgram { handle });
    }

    fn unbind_program(&mut self) {
        self.calls.push(DriverCall::UnbindProgram);
    }

    fn resource_block_index(&self, program: RawHandle, slot: BindSlot, name: &str) -> Option<u32> {
        self.block_indices
            .get(&(program, slot, name.to_string()))
            .copied()
    }

    fn set_uniform_matrix(&mut self, program: RawHandle, name: &str, _matrix: &[f32; 16]) {
        self.calls.push(DriverCall::SetUniformMatrix {
            program,
            name: name.to_string(),
        });
    }

    fn bind_buffer_slot(&mut self, slot: BindSlot, index: u32, buffer: RawHandle) {
        self.calls.push(DriverCall::BindBufferSlot {
            slot,
            index,
            buffer,
        });
    }

    fn draw_arrays(
        &mut self,
        mode: DrawMode,
        first_vertex: u32,
        vertex_count: u32,
        instance_count: u32,
        base_instance: u32,
    ) {
        self.calls.push(DriverCall::DrawArrays {
            mode,
            first_vertex,
            vertex_count,
            instance_count,
            base_instance,
        });
    }

    fn draw_elements(
        &mut self,
        mode: DrawMode,
        index_type: IndexType,
        vertex_count: u32,
        first_index: u32,
        base_vertex: i32,
        instance_count: u32,
        base_instance: u32,
    ) {
        self.calls.push(DriverCall::DrawElements {
            mode,
            index_type,
            vertex_count,
            first_index,
            base_vertex,
            instance_count,
            base_instance,
        });
    }

    fn bind_indirect_buffer(&mut self, buffer: RawHandle) {
        self.calls.push(DriverCall::BindIndirectBuffer { buffer });
    }

    fn multi_draw_arrays_indirect(
        &mut self,
        mode: DrawMode,
        offset: usize,
        draw_count: u32,
        stride: u32,
    ) {
        self.calls.push(DriverCall::MultiDrawArraysIndirect {
            mode,
            offset,
            draw_count,
            stride,
        });
    }

    fn multi_draw_elements_indirect(
        &mut self,
        mode: DrawMode,
        index_type: IndexType,
        offset: usize,
        draw_count: u32,
        stride: u32,
    ) {
        self.calls.push(DriverCall::MultiDrawElementsIndirect {
            mode,
            index_type,
            offset,
            draw_count,
            stride,
        });
    }

    fn image_storage(
        &mut self,
        handle: RawHandle,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<()> {
        if !self.is_kind(ObjectKind::Image, handle) {
            return Err(GlazeError::InvalidHandle {
                kind: ObjectKind::Image,
                handle,
            });
        }
        self.images.insert(handle, (width, height, format));
        self.calls.push(DriverCall::ImageStorage {
            handle,
            width,
            height,
            format,
        });
        Ok(())
    }

    fn image_sub_image(
        &mut self,
        handle: RawHandle,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        format: PixelFormat,
        data: &[u8],
    ) -> Result<()> {
        let (img_w, img_h, img_format) =
            *self.images.get(&handle).ok_or(GlazeError::InvalidHandle {
                kind: ObjectKind::Image,
                handle,
            })?;
        if format != img_format {
            return Err(GlazeError::UnsupportedFormat(format));
        }
        let needed = (width as usize) * (height as usize) * format.bytes_per_pixel();
        let in_bounds =
            (x as u64 + width as u64) <= img_w as u64 && (y as u64 + height as u64) <= img_h as u64;
        if !in_bounds || data.len() < needed {
            return Err(GlazeError::StagingOverflow {
                capacity: data.len(),
                requested: needed,
            });
        }
        self.calls.push(DriverCall::ImageSubImage {
            handle,
            x,
            y,
            width,
            height,
        });
        Ok(())
    }

    fn client_wait(
        &mut self,
        fence: RawHandle,
        flags: WaitFlags,
        timeout_ns: u64,
    ) -> Result<WaitStatus> {
        self.calls.push(DriverCall::ClientWait {
            fence,
            flags,
            timeout_ns,
        });
        if self.signaled.contains(&fence) {
            return Ok(WaitStatus::AlreadySignaled);
        }
        if self.signal_on_wait.remove(&fence) {
            self.signaled.insert(fence);
            return Ok(WaitStatus::ConditionSatisfied);
        }
        Ok(WaitStatus::TimedOut)
    }

    fn server_wait(&mut self, fence: RawHandle) {
        self.calls.push(DriverCall::ServerWait { fence });
    }

    fn begin_query(&mut self, handle: RawHandle, target: QueryTarget) {
        self.calls.push(DriverCall::BeginQuery { handle, target });
    }

    fn end_query(&mut self, target: QueryTarget) {
        self.calls.push(DriverCall::EndQuery { target });
    }

    fn query_result_available(&self, handle: RawHandle) -> bool {
        self.query_results.contains_key(&handle)
    }

    fn query_result(&self, handle: RawHandle) -> u64 {
        self.query_results.get(&handle).copied().unwrap_or(0)
    }
}
