pub mod recording;
pub mod types;

pub use recording::{DriverCall, RecordingDriver};
pub use types::*;

use crate::Result;

/// The opaque driver call surface this crate sits on top of.
///
/// Any driver exposing handle-based object lifecycles plus direct/indirect
/// draw submission can implement this trait; the rest of the crate never
/// assumes more than what is named here. All calls target the context owned
/// by the implementor, on the single thread driving it.
pub trait Driver {
    // -- object lifecycle --------------------------------------------------

    fn create_buffer(&mut self) -> Result<RawHandle>;
    fn create_vertex_binding(&mut self) -> Result<RawHandle>;
    fn create_image(&mut self) -> Result<RawHandle>;
    fn create_query(&mut self, target: QueryTarget) -> Result<RawHandle>;
    /// Insert a fence into the command stream; it signals when all prior work
    /// completes.
    fn create_fence(&mut self) -> Result<RawHandle>;
    fn create_program(&mut self) -> Result<RawHandle>;
    /// Delete the object behind `handle`. Deleting an already-deleted or
    /// unknown handle is a no-op.
    fn delete_object(&mut self, kind: ObjectKind, handle: RawHandle);
    /// Whether `handle` currently names a live object of `kind`.
    fn is_kind(&self, kind: ObjectKind, handle: RawHandle) -> bool;

    // -- debug labels ------------------------------------------------------

    fn set_debug_name(&mut self, kind: ObjectKind, handle: RawHandle, name: &str);
    fn debug_name(&self, kind: ObjectKind, handle: RawHandle) -> String;

    // -- buffers -----------------------------------------------------------

    /// Replace the buffer's backing store with `size` bytes, optionally
    /// filled from `data`.
    fn buffer_data(
        &mut self,
        handle: RawHandle,
        data: Option<&[u8]>,
        size: usize,
        usage: UsageHint,
    ) -> Result<()>;
    /// Allocate fixed storage; size and flags cannot change afterwards.
    fn buffer_storage(
        &mut self,
        handle: RawHandle,
        data: Option<&[u8]>,
        size: usize,
        flags: StorageFlags,
    ) -> Result<()>;
    fn buffer_sub_data(&mut self, handle: RawHandle, offset: usize, data: &[u8]) -> Result<()>;
    fn buffer_parameter(&self, handle: RawHandle, param: BufferParameter) -> i64;

    // -- vertex bindings ---------------------------------------------------

    fn bind_vertex_binding(&mut self, handle: RawHandle);
    fn attach_vertex_buffer(
        &mut self,
        binding: RawHandle,
        buffer: RawHandle,
        slot: u32,
        offset: usize,
        stride: usize,
    );
    fn attach_index_buffer(&mut self, binding: RawHandle, buffer: RawHandle);

    // -- programs ----------------------------------------------------------

    fn bind_program(&mut self, handle: RawHandle);
    fn unbind_program(&mut self);
    /// Resolve a named uniform/storage block to its binding index, if the
    /// program declares it.
    fn resource_block_index(&self, program: RawHandle, slot: BindSlot, name: &str) -> Option<u32>;
    fn set_uniform_matrix(&mut self, program: RawHandle, name: &str, matrix: &[f32; 16]);
    fn bind_buffer_slot(&mut self, slot: BindSlot, index: u32, buffer: RawHandle);

    // -- draws -------------------------------------------------------------

    fn draw_arrays(
        &mut self,
        mode: DrawMode,
        first_vertex: u32,
        vertex_count: u32,
        instance_count: u32,
        base_instance: u32,
    );
    fn draw_elements(
        &mut self,
        mode: DrawMode,
        index_type: IndexType,
        vertex_count: u32,
        first_index: u32,
        base_vertex: i32,
        instance_count: u32,
        base_instance: u32,
    );
    fn bind_indirect_buffer(&mut self, buffer: RawHandle);
    /// One submission covering `draw_count` array records starting at byte
    /// `offset` of the bound indirect buffer, `stride` bytes apart.
    fn multi_draw_arrays_indirect(
        &mut self,
        mode: DrawMode,
        offset: usize,
        draw_count: u32,
        stride: u32,
    );
    fn multi_draw_elements_indirect(
        &mut self,
        mode: DrawMode,
        index_type: IndexType,
        offset: usize,
        draw_count: u32,
        stride: u32,
    );

    // -- images ------------------------------------------------------------

    fn image_storage(
        &mut self,
        handle: RawHandle,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<()>;
    fn image_sub_image(
        &mut self,
        handle: RawHandle,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        format: PixelFormat,
        data: &[u8],
    ) -> Result<()>;

    // -- synchronization ---------------------------------------------------

    /// Block the calling thread until the fence signals or `timeout_ns`
    /// elapses. The only host-blocking call on the surface.
    fn client_wait(
        &mut self,
        fence: RawHandle,
        flags: WaitFlags,
        timeout_ns: u64,
    ) -> Result<WaitStatus>;
    /// Enqueue a GPU-side wait; does not block the host.
    fn server_wait(&mut self, fence: RawHandle);
    fn begin_query(&mut self, handle: RawHandle, target: QueryTarget);
    fn end_query(&mut self, target: QueryTarget);
    fn query_result_available(&self, handle: RawHandle) -> bool;
    /// Fetch the query result; the driver may block until it is available.
    fn query_result(&self, handle: RawHandle) -> u64;
}
