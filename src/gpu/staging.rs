use super::buffer::{Buffer, BufferInfo};
use super::driver::types::{IndexType, UsageHint};
use super::driver::Driver;
use super::object::GpuObject;
use crate::utils::memory::MemoryBlock;
use crate::{GlazeError, Result};

/// Indices per quad: two triangles over four corners.
pub const INDICES_PER_QUAD: u32 = 6;
pub const VERTICES_PER_QUAD: u32 = 4;

/// Quads the shared index buffer starts out able to address.
pub const DEFAULT_QUAD_CAPACITY: u32 = 4096;

const MIN_GROWABLE_CAPACITY: usize = 64;

/// Append-only cursor over a host memory block, serializing typed fields in a
/// fixed binary layout (native endian) for upload.
///
/// Growable builders double their backing block when a write runs past the
/// end; fixed builders reject the write with
/// [`GlazeError::StagingOverflow`] instead. The `put_*` family returns the
/// builder so writes chain with `?` between calls.
#[derive(Debug)]
pub struct BufferBuilder {
    block: MemoryBlock,
    cursor: usize,
    growable: bool,
}

impl BufferBuilder {
    /// A growable builder starting with `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self {
            block: MemoryBlock::allocate(capacity)?,
            cursor: 0,
            growable: true,
        })
    }

    /// A fixed-capacity builder over an existing block. Writing past the end
    /// of `block` is an error.
    pub fn fixed(block: MemoryBlock) -> Self {
        Self {
            block,
            cursor: 0,
            growable: false,
        }
    }

    pub fn put_u8(&mut self, v: u8) -> Result<&mut Self> {
        self.put_bytes(&[v])
    }

    pub fn put_u16(&mut self, v: u16) -> Result<&mut Self> {
        self.put_bytes(&v.to_ne_bytes())
    }

    pub fn put_u32(&mut self, v: u32) -> Result<&mut Self> {
        self.put_bytes(&v.to_ne_bytes())
    }

    pub fn put_i32(&mut self, v: i32) -> Result<&mut Self> {
        self.put_bytes(&v.to_ne_bytes())
    }

    pub fn put_f32(&mut self, v: f32) -> Result<&mut Self> {
        self.put_bytes(&v.to_ne_bytes())
    }

    pub fn put_vec2(&mut self, v: [f32; 2]) -> Result<&mut Self> {
        self.put_f32(v[0])?.put_f32(v[1])
    }

    pub fn put_vec3(&mut self, v: [f32; 3]) -> Result<&mut Self> {
        self.put_f32(v[0])?.put_f32(v[1])?.put_f32(v[2])
    }

    pub fn put_vec4(&mut self, v: [f32; 4]) -> Result<&mut Self> {
        self.put_f32(v[0])?.put_f32(v[1])?.put_f32(v[2])?.put_f32(v[3])
    }

    /// Column-major 4x4 matrix.
    pub fn put_mat4(&mut self, m: &[f32; 16]) -> Result<&mut Self> {
        for v in m {
            self.put_f32(*v)?;
        }
        Ok(self)
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        self.ensure(bytes.len())?;
        self.block.write_bytes(self.cursor, bytes)?;
        self.cursor += bytes.len();
        Ok(self)
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// View of everything written so far.
    pub fn written(&self) -> &[u8] {
        &self.block.as_slice()[..self.cursor]
    }

    /// Owned snapshot of the written contents, decoupled from further
    /// mutation of this builder.
    pub fn finish(&self) -> Result<MemoryBlock> {
        let mut snapshot = MemoryBlock::allocate(self.cursor)?;
        if self.cursor > 0 {
            snapshot.write_bytes(0, self.written())?;
        }
        Ok(snapshot)
    }

    fn ensure(&mut self, extra: usize) -> Result<()> {
        let needed = self.cursor + extra;
        if needed <= self.block.len() {
            return Ok(());
        }
        if !self.growable {
            return Err(GlazeError::StagingOverflow {
                capacity: self.block.len(),
                requested: needed,
            });
        }
        let mut capacity = self.block.len().max(MIN_GROWABLE_CAPACITY);
        while capacity < needed {
            capacity *= 2;
        }
        self.block.reallocate(capacity)
    }
}

/// [`BufferBuilder`] specialization emitting 32-bit indices, with quad
/// generation in the canonical `{0, 1, 2, 2, 3, 0}` winding.
#[derive(Debug)]
pub struct IndexBufferBuilder {
    inner: BufferBuilder,
    index_count: u32,
    quad_count: u32,
}

impl IndexBufferBuilder {
    pub fn with_quad_capacity(quads: u32) -> Result<Self> {
        let bytes = quads as usize * INDICES_PER_QUAD as usize * IndexType::U32.byte_width();
        Ok(Self {
            inner: BufferBuilder::with_capacity(bytes)?,
            index_count: 0,
            quad_count: 0,
        })
    }

    pub fn put_index(&mut self, index: u32) -> Result<&mut Self> {
        self.inner.put_u32(index)?;
        self.index_count += 1;
        Ok(self)
    }

    /// Emit the six indices of the next quad, offset by four vertices per
    /// quad already written through this builder.
    pub fn put_quad(&mut self) -> Result<&mut Self> {
        const WINDING: [u32; 6] = [0, 1, 2, 2, 3, 0];
        let base = self.quad_count * VERTICES_PER_QUAD;
        for corner in WINDING {
            self.inner.put_u32(base + corner)?;
        }
        self.index_count += INDICES_PER_QUAD;
        self.quad_count += 1;
        Ok(self)
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn quad_count(&self) -> u32 {
        self.quad_count
    }

    pub fn written(&self) -> &[u8] {
        self.inner.written()
    }

    pub fn finish(&self) -> Result<MemoryBlock> {
        self.inner.finish()
    }
}

/// Shared, per-context index buffer serving quad geometry of any count.
///
/// Growth policy: ensure-size, append-only growth, never shrink. A request
/// within capacity reuses the existing GPU-resident indices with no driver
/// calls; a larger request grows to the next power of two and re-uploads.
/// Already-issued draws referencing earlier counts stay valid because the
/// prefix never changes.
#[derive(Debug)]
pub struct QuadIndexBuffer {
    buffer: Buffer,
    capacity_quads: u32,
}

impl QuadIndexBuffer {
    pub fn new(driver: &mut dyn Driver) -> Result<Self> {
        Self::with_capacity(driver, DEFAULT_QUAD_CAPACITY)
    }

    pub fn with_capacity(driver: &mut dyn Driver, quads: u32) -> Result<Self> {
        let quads = quads.max(1).next_power_of_two();
        let staged = Self::generate(quads)?;
        let buffer = Buffer::new(
            driver,
            &BufferInfo {
                debug_name: "quad indices",
                byte_size: staged.len(),
                usage: UsageHint::StaticDraw,
                initial_data: Some(staged.as_slice()),
            },
        )?;
        staged.free();
        Ok(Self {
            buffer,
            capacity_quads: quads,
        })
    }

    /// Make sure at least `quads` quads are addressable. No-op within
    /// capacity; otherwise grows (never shrinks) and re-uploads.
    pub fn ensure_quads(&mut self, driver: &mut dyn Driver, quads: u32) -> Result<()> {
        if quads <= self.capacity_quads {
            return Ok(());
        }
        let new_capacity = quads.next_power_of_two();
        let staged = Self::generate(new_capacity)?;
        self.buffer
            .reinitialize(driver, Some(staged.as_slice()), staged.len())?;
        staged.free();
        log::debug!(
            "quad index buffer grown {} -> {} quads",
            self.capacity_quads,
            new_capacity
        );
        self.capacity_quads = new_capacity;
        Ok(())
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn capacity_quads(&self) -> u32 {
        self.capacity_quads
    }

    pub fn index_type(&self) -> IndexType {
        IndexType::U32
    }

    pub fn release(&mut self, driver: &mut dyn Driver) {
        self.buffer.release(driver);
    }

    fn generate(quads: u32) -> Result<MemoryBlock> {
        let mut builder = IndexBufferBuilder::with_quad_capacity(quads)?;
        for _ in 0..quads {
            builder.put_quad()?;
        }
        builder.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32s(bytes: &[u8]) -> Vec<u32> {
        bytes
            .chunks_exact(4)
            .map(|c| u32::from_ne_bytes(c.try_into().unwrap()))
            .collect()
    }

    #[test]
    fn put_calls_concatenate_fixed_width_fields() {
        let mut b = BufferBuilder::with_capacity(16).unwrap();
        b.put_u8(0xAB)
            .unwrap()
            .put_u16(0x1234)
            .unwrap()
            .put_u32(0xDEADBEEF)
            .unwrap()
            .put_i32(-7)
            .unwrap()
            .put_f32(1.5)
            .unwrap();

        let mut expect = Vec::new();
        expect.push(0xAB);
        expect.extend_from_slice(&0x1234u16.to_ne_bytes());
        expect.extend_from_slice(&0xDEADBEEFu32.to_ne_bytes());
        expect.extend_from_slice(&(-7i32).to_ne_bytes());
        expect.extend_from_slice(&1.5f32.to_ne_bytes());

        assert_eq!(b.written(), &expect[..]);
        assert_eq!(b.len(), 1 + 2 + 4 + 4 + 4);
    }

    #[test]
    fn vector_and_matrix_fields_use_component_order() {
        let m = glam::Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
        let mut b = BufferBuilder::with_capacity(128).unwrap();
        b.put_vec2([1.0, 2.0])
            .unwrap()
            .put_vec3([3.0, 4.0, 5.0])
            .unwrap()
            .put_vec4([6.0, 7.0, 8.0, 9.0])
            .unwrap()
            .put_mat4(&m.to_cols_array())
            .unwrap();

        assert_eq!(b.len(), (2 + 3 + 4 + 16) * 4);
        let floats: Vec<f32> = b
            .written()
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes(c.try_into().unwrap()))
            .collect();
        assert_eq!(&floats[..9], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(&floats[9..], &m.to_cols_array()[..]);
    }

    #[test]
    fn growable_builder_doubles_past_capacity() {
        let mut b = BufferBuilder::with_capacity(4).unwrap();
        for i in 0..64u32 {
            b.put_u32(i).unwrap();
        }
        assert_eq!(b.len(), 256);
        assert_eq!(u32s(b.written()), (0..64).collect::<Vec<_>>());
    }

    #[test]
    fn fixed_builder_rejects_overflow() {
        let block = MemoryBlock::allocate(8).unwrap();
        let mut b = BufferBuilder::fixed(block);
        b.put_u32(1).unwrap().put_u32(2).unwrap();
        let err = b.put_u32(3).unwrap_err();
        assert!(matches!(err, GlazeError::StagingOverflow { .. }));
        // earlier writes are intact
        assert_eq!(u32s(b.written()), vec![1, 2]);
    }

    #[test]
    fn finish_snapshots_independently() {
        let mut b = BufferBuilder::with_capacity(8).unwrap();
        b.put_u32(11).unwrap();
        let snap = b.finish().unwrap();
        b.put_u32(22).unwrap();

        assert_eq!(u32s(snap.as_slice()), vec![11]);
        assert_eq!(u32s(b.written()), vec![11, 22]);
    }

    #[test]
    fn quads_follow_canonical_winding() {
        let mut b = IndexBufferBuilder::with_quad_capacity(3).unwrap();
        b.put_quad().unwrap().put_quad().unwrap().put_quad().unwrap();

        let indices = u32s(b.written());
        for n in 0..3u32 {
            let base = 4 * n;
            let at = (n * 6) as usize;
            assert_eq!(
                &indices[at..at + 6],
                &[base, base + 1, base + 2, base + 2, base + 3, base]
            );
        }
        assert_eq!(b.quad_count(), 3);
        assert_eq!(b.index_count(), 18);
    }
}
