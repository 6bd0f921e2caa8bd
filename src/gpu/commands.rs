use bytemuck::{Pod, Zeroable};

#[cfg(feature = "glaze-serde")]
use serde::{Deserialize, Serialize};

use super::staging::BufferBuilder;
use crate::Result;

/// Byte width of one serialized indirect draw record. Both command variants
/// occupy five 32-bit words; the array form zero-pads the fifth so a packed
/// command buffer has a uniform stride.
pub const INDIRECT_STRIDE: usize = 20;

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct ArrayIndirectRecord {
    pub vertex_count: u32,
    pub instance_count: u32,
    pub first_vertex: u32,
    pub base_instance: u32,
    pub _reserved: u32,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct IndexedIndirectRecord {
    pub vertex_count: u32,
    pub instance_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
    pub base_instance: u32,
}

/// One draw invocation, array-based or indexed.
///
/// Commands are plain values: the rebase transforms return shifted copies and
/// never touch the original, so batches can share and cache them freely. A
/// command has no effect until handed to the batch renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "glaze-serde", derive(Serialize, Deserialize))]
pub enum DrawCommand {
    Array {
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        base_instance: u32,
    },
    Indexed {
        vertex_count: u32,
        instance_count: u32,
        first_index: u32,
        base_vertex: i32,
        base_instance: u32,
    },
}

impl DrawCommand {
    /// Single-instance array draw of `vertex_count` vertices from the start
    /// of the buffer.
    pub fn array(vertex_count: u32) -> Self {
        DrawCommand::Array {
            vertex_count,
            instance_count: 1,
            first_vertex: 0,
            base_instance: 0,
        }
    }

    /// Single-instance indexed draw of `vertex_count` indices from the start
    /// of the index buffer.
    pub fn indexed(vertex_count: u32) -> Self {
        DrawCommand::Indexed {
            vertex_count,
            instance_count: 1,
            first_index: 0,
            base_vertex: 0,
            base_instance: 0,
        }
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self, DrawCommand::Indexed { .. })
    }

    pub fn vertex_count(&self) -> u32 {
        match *self {
            DrawCommand::Array { vertex_count, .. } => vertex_count,
            DrawCommand::Indexed { vertex_count, .. } => vertex_count,
        }
    }

    pub fn instance_count(&self) -> u32 {
        match *self {
            DrawCommand::Array { instance_count, .. } => instance_count,
            DrawCommand::Indexed { instance_count, .. } => instance_count,
        }
    }

    pub fn with_instances(self, instance_count: u32, base_instance: u32) -> Self {
        match self {
            DrawCommand::Array {
                vertex_count,
                first_vertex,
                ..
            } => DrawCommand::Array {
                vertex_count,
                instance_count,
                first_vertex,
                base_instance,
            },
            DrawCommand::Indexed {
                vertex_count,
                first_index,
                base_vertex,
                ..
            } => DrawCommand::Indexed {
                vertex_count,
                instance_count,
                first_index,
                base_vertex,
                base_instance,
            },
        }
    }

    /// Copy of this command with its vertex origin shifted by `delta`, for
    /// draws packed into a shared vertex buffer. Offsets compose additively.
    pub fn with_vertex_offset(self, delta: i32) -> Self {
        match self {
            DrawCommand::Array {
                vertex_count,
                instance_count,
                first_vertex,
                base_instance,
            } => DrawCommand::Array {
                vertex_count,
                instance_count,
                first_vertex: (first_vertex as i32 + delta) as u32,
                base_instance,
            },
            DrawCommand::Indexed {
                vertex_count,
                instance_count,
                first_index,
                base_vertex,
                base_instance,
            } => DrawCommand::Indexed {
                vertex_count,
                instance_count,
                first_index,
                base_vertex: base_vertex + delta,
                base_instance,
            },
        }
    }

    /// Copy of this command with its index origin shifted by `delta`, for
    /// draws packed into a shared index buffer. Array commands read no index
    /// buffer and pass through unchanged.
    pub fn with_index_offset(self, delta: u32) -> Self {
        match self {
            array @ DrawCommand::Array { .. } => array,
            DrawCommand::Indexed {
                vertex_count,
                instance_count,
                first_index,
                base_vertex,
                base_instance,
            } => DrawCommand::Indexed {
                vertex_count,
                instance_count,
                first_index: first_index + delta,
                base_vertex,
                base_instance,
            },
        }
    }

    /// Append this command's indirect record to a staging builder.
    pub fn encode(&self, out: &mut BufferBuilder) -> Result<()> {
        match *self {
            DrawCommand::Array {
                vertex_count,
                instance_count,
                first_vertex,
                base_instance,
            } => {
                out.put_u32(vertex_count)?
                    .put_u32(instance_count)?
                    .put_u32(first_vertex)?
                    .put_u32(base_instance)?
                    .put_u32(0)?;
            }
            DrawCommand::Indexed {
                vertex_count,
                instance_count,
                first_index,
                base_vertex,
                base_instance,
            } => {
                out.put_u32(vertex_count)?
                    .put_u32(instance_count)?
                    .put_u32(first_index)?
                    .put_i32(base_vertex)?
                    .put_u32(base_instance)?;
            }
        }
        Ok(())
    }

    /// This command's indirect record as raw bytes.
    pub fn record_bytes(&self) -> [u8; INDIRECT_STRIDE] {
        let mut bytes = [0u8; INDIRECT_STRIDE];
        match *self {
            DrawCommand::Array {
                vertex_count,
                instance_count,
                first_vertex,
                base_instance,
            } => {
                let record = ArrayIndirectRecord {
                    vertex_count,
                    instance_count,
                    first_vertex,
                    base_instance,
                    _reserved: 0,
                };
                bytes.copy_from_slice(bytemuck::bytes_of(&record));
            }
            DrawCommand::Indexed {
                vertex_count,
                instance_count,
                first_index,
                base_vertex,
                base_instance,
            } => {
                let record = IndexedIndirectRecord {
                    vertex_count,
                    instance_count,
                    first_index,
                    base_vertex,
                    base_instance,
                };
                bytes.copy_from_slice(bytemuck::bytes_of(&record));
            }
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebase_composes_additively() {
        let cmd = DrawCommand::Indexed {
            vertex_count: 12,
            instance_count: 1,
            first_index: 6,
            base_vertex: 4,
            base_instance: 0,
        };

        assert_eq!(
            cmd.with_vertex_offset(3).with_vertex_offset(5),
            cmd.with_vertex_offset(8)
        );
        assert_eq!(
            cmd.with_index_offset(6).with_index_offset(12),
            cmd.with_index_offset(18)
        );

        let arr = DrawCommand::array(4).with_vertex_offset(10);
        assert_eq!(arr.with_vertex_offset(-4), DrawCommand::array(4).with_vertex_offset(6));
    }

    #[test]
    fn rebase_leaves_the_original_untouched() {
        let original = DrawCommand::array(4);
        let shifted = original.with_vertex_offset(100);
        assert_eq!(original, DrawCommand::array(4));
        assert_ne!(original, shifted);

        // index offsets don't apply to array draws
        assert_eq!(original.with_index_offset(9), original);
    }

    #[test]
    fn records_are_five_words() {
        assert_eq!(std::mem::size_of::<ArrayIndirectRecord>(), INDIRECT_STRIDE);
        assert_eq!(std::mem::size_of::<IndexedIndirectRecord>(), INDIRECT_STRIDE);
    }

    #[test]
    fn encode_matches_record_bytes() {
        let commands = [
            DrawCommand::array(4).with_instances(8, 2).with_vertex_offset(16),
            DrawCommand::indexed(36).with_index_offset(12).with_vertex_offset(-3),
        ];
        for cmd in commands {
            let mut b = BufferBuilder::with_capacity(INDIRECT_STRIDE).unwrap();
            cmd.encode(&mut b).unwrap();
            assert_eq!(b.written(), cmd.record_bytes());
        }
    }
}
