use super::batch::{submit_batch, upload_batch, DrawBatch, UploadedBatch};
use super::buffer::{Buffer, BufferInfo, ImmutableBufferInfo, VertexBinding, VertexBindingInfo};
use super::driver::types::QueryTarget;
use super::driver::Driver;
use super::image::{Image, ImageInfo};
use super::staging::QuadIndexBuffer;
use super::sync::{Fence, Query};
use crate::Result;

pub struct ContextInfo {
    /// Quads the shared quad index buffer starts out able to address.
    pub quad_capacity: u32,
}

impl Default for ContextInfo {
    fn default() -> Self {
        Self {
            quad_capacity: super::staging::DEFAULT_QUAD_CAPACITY,
        }
    }
}

/// Facade owning a driver instance plus the per-context shared resources.
///
/// All creation, mutation, release, and submission goes through the single
/// thread owning this context; the crate performs no internal locking.
pub struct Context<D: Driver> {
    driver: D,
    quad_indices: QuadIndexBuffer,
}

impl<D: Driver> Context<D> {
    pub fn new(mut driver: D, info: &ContextInfo) -> Result<Self> {
        let quad_indices = QuadIndexBuffer::with_capacity(&mut driver, info.quad_capacity)?;
        Ok(Self {
            driver,
            quad_indices,
        })
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn make_buffer(&mut self, info: &BufferInfo) -> Result<Buffer> {
        Buffer::new(&mut self.driver, info)
    }

    pub fn make_immutable_buffer(&mut self, info: &ImmutableBufferInfo) -> Result<Buffer> {
        Buffer::immutable(&mut self.driver, info)
    }

    pub fn make_vertex_binding(&mut self, info: &VertexBindingInfo) -> Result<VertexBinding> {
        VertexBinding::new(&mut self.driver, info)
    }

    pub fn make_image(&mut self, info: &ImageInfo) -> Result<Image> {
        Image::new(&mut self.driver, info)
    }

    pub fn make_fence(&mut self) -> Result<Fence> {
        Fence::new(&mut self.driver)
    }

    pub fn make_query(&mut self, target: QueryTarget) -> Result<Query> {
        Query::new(&mut self.driver, target)
    }

    /// The shared quad index buffer, grown (never shrunk) to address at least
    /// `quads` quads.
    pub fn quad_indices(&mut self, quads: u32) -> Result<&QuadIndexBuffer> {
        self.quad_indices.ensure_quads(&mut self.driver, quads)?;
        Ok(&self.quad_indices)
    }

    /// Compile a batch for submission against `binding`.
    pub fn upload_batch<'a>(
        &mut self,
        batch: &'a DrawBatch,
        binding: &VertexBinding,
    ) -> Result<UploadedBatch<'a>> {
        upload_batch(&mut self.driver, batch, binding)
    }

    /// Submit one compiled batch.
    pub fn submit_batch(&mut self, uploaded: &UploadedBatch) -> Result<()> {
        submit_batch(&mut self.driver, uploaded)
    }

    /// Release context-owned shared resources and hand the driver back.
    pub fn destroy(mut self) -> D {
        self.quad_indices.release(&mut self.driver);
        self.driver
    }
}
