use super::buffer::{Buffer, BufferInfo, VertexBinding};
use super::commands::{DrawCommand, INDIRECT_STRIDE};
use super::driver::types::{BindSlot, DrawMode, IndexType, RawHandle, UsageHint};
use super::driver::Driver;
use super::object::GpuObject;
use super::staging::BufferBuilder;
use crate::{GlazeError, Result};

/// A named buffer attachment resolved against the batch's program at submit
/// time.
#[derive(Debug, Clone)]
pub struct BufferBinding {
    pub name: String,
    pub slot: BindSlot,
    pub buffer: RawHandle,
}

/// Side-effect hook run around a batch submission (blend mode, depth test,
/// scissor - opaque to the renderer).
pub type BatchHook = Box<dyn Fn(&mut dyn Driver)>;

/// An ordered set of draw commands sharing one pipeline configuration,
/// awaiting submission.
///
/// A batch is a request: nothing is materialized on the GPU until
/// [`upload_batch`] compiles it. The transform and named buffer bindings are
/// pushed only for program-driven batches (ones carrying a `program`).
#[derive(Default)]
pub struct DrawBatch {
    pub mode: DrawMode,
    pub program: Option<RawHandle>,
    /// Column-major model transform, pushed to the program before drawing.
    pub transform: Option<[f32; 16]>,
    pub commands: Vec<DrawCommand>,
    pub buffer_bindings: Vec<BufferBinding>,
    pub setup: Option<BatchHook>,
    pub cleanup: Option<BatchHook>,
}

impl DrawBatch {
    pub fn new(mode: DrawMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn push(&mut self, command: DrawCommand) -> &mut Self {
        self.commands.push(command);
        self
    }

    pub fn bind_buffer(&mut self, name: &str, slot: BindSlot, buffer: &Buffer) -> Result<&mut Self> {
        self.buffer_bindings.push(BufferBinding {
            name: name.to_string(),
            slot,
            buffer: buffer.handle()?,
        });
        Ok(self)
    }
}

impl std::fmt::Debug for DrawBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawBatch")
            .field("mode", &self.mode)
            .field("program", &self.program)
            .field("commands", &self.commands.len())
            .field("buffer_bindings", &self.buffer_bindings)
            .finish_non_exhaustive()
    }
}

/// A batch compiled for submission: the resolved command list plus, for
/// multi-command batches, the GPU-resident indirect command buffer.
///
/// Produced fresh per submission by [`upload_batch`] and never mutated
/// afterwards. Submitting does not consume it, so static geometry can be
/// retained and re-submitted; the owner releases the indirect buffer via
/// [`UploadedBatch::release`] when done.
pub struct UploadedBatch<'a> {
    batch: &'a DrawBatch,
    vertex_binding: RawHandle,
    index_type: Option<IndexType>,
    indirect: Option<Buffer>,
    commands: Vec<DrawCommand>,
}

impl<'a> UploadedBatch<'a> {
    /// Assemble compiled batch data by hand.
    ///
    /// [`upload_batch`] is the usual path; this one serves callers that keep
    /// their own indirect buffers alive across frames (static geometry). A
    /// multi-command batch assembled without an indirect buffer will be
    /// rejected at submission.
    pub fn from_parts(
        batch: &'a DrawBatch,
        binding: &VertexBinding,
        indirect: Option<Buffer>,
    ) -> Result<Self> {
        Ok(Self {
            batch,
            vertex_binding: binding.handle()?,
            index_type: binding.index_type(),
            indirect,
            commands: batch.commands.clone(),
        })
    }

    pub fn batch(&self) -> &DrawBatch {
        self.batch
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn indirect_buffer(&self) -> Option<&Buffer> {
        self.indirect.as_ref()
    }

    /// Release the backing indirect buffer, if any. Idempotent.
    pub fn release(&mut self, driver: &mut dyn Driver) {
        if let Some(indirect) = &mut self.indirect {
            indirect.release(driver);
        }
    }
}

/// Compile a batch against a vertex binding, serializing indirect commands
/// when more than one draw must be submitted.
pub fn upload_batch<'a>(
    driver: &mut dyn Driver,
    batch: &'a DrawBatch,
    binding: &VertexBinding,
) -> Result<UploadedBatch<'a>> {
    let indirect = if batch.commands.len() > 1 {
        let mut staging = BufferBuilder::with_capacity(batch.commands.len() * INDIRECT_STRIDE)?;
        for command in &batch.commands {
            command.encode(&mut staging)?;
        }
        let staged = staging.finish()?;
        let buffer = Buffer::new(
            driver,
            &BufferInfo {
                debug_name: "batch indirect commands",
                byte_size: staged.len(),
                usage: UsageHint::StreamDraw,
                initial_data: Some(staged.as_slice()),
            },
        )?;
        staged.free();
        log::trace!("batch compiled to {} indirect records", batch.commands.len());
        Some(buffer)
    } else {
        None
    };

    UploadedBatch::from_parts(batch, binding, indirect)
}

/// Issue the driver call(s) for one compiled batch.
///
/// Zero commands exit before any driver call. One command is submitted as a
/// direct draw with the command's fields as parameters. More than one command
/// is submitted as a single indirect multi-draw over the compiled command
/// buffer; reaching this path without one is a caller bug and fails with
/// [`GlazeError::MissingIndirectBuffer`] before any driver state is touched.
pub fn submit_batch(driver: &mut dyn Driver, uploaded: &UploadedBatch) -> Result<()> {
    if uploaded.commands.is_empty() {
        return Ok(());
    }
    if uploaded.commands.len() > 1 && uploaded.indirect.is_none() {
        return Err(GlazeError::MissingIndirectBuffer);
    }
    if uploaded.index_type.is_none() && uploaded.commands.iter().any(|c| c.is_indexed()) {
        return Err(GlazeError::MissingIndexBuffer);
    }

    let batch = uploaded.batch;
    if let Some(setup) = &batch.setup {
        setup(driver);
    }

    if let Some(program) = batch.program {
        driver.bind_program(program);
        if let Some(transform) = &batch.transform {
            driver.set_uniform_matrix(program, MODEL_TRANSFORM_UNIFORM, transform);
            for binding in &batch.buffer_bindings {
                match driver.resource_block_index(program, binding.slot, &binding.name) {
                    Some(index) => driver.bind_buffer_slot(binding.slot, index, binding.buffer),
                    None => log::warn!(
                        "program {} has no {:?} block named {:?}",
                        program,
                        binding.slot,
                        binding.name
                    ),
                }
            }
        }
    }

    driver.bind_vertex_binding(uploaded.vertex_binding);

    match uploaded.commands.as_slice() {
        [command] => submit_direct(driver, uploaded, *command)?,
        commands => {
            // validated non-empty and indirect-backed above
            let indirect = uploaded.indirect.as_ref().unwrap();
            driver.bind_indirect_buffer(indirect.handle()?);
            let draw_count = commands.len() as u32;
            match uploaded.index_type {
                Some(index_type) => driver.multi_draw_elements_indirect(
                    batch.mode,
                    index_type,
                    0,
                    draw_count,
                    INDIRECT_STRIDE as u32,
                ),
                None => driver.multi_draw_arrays_indirect(
                    batch.mode,
                    0,
                    draw_count,
                    INDIRECT_STRIDE as u32,
                ),
            }
            log::trace!("submitted {} draws in one indirect call", draw_count);
        }
    }

    if batch.program.is_some() {
        driver.unbind_program();
    }
    if let Some(cleanup) = &batch.cleanup {
        cleanup(driver);
    }
    Ok(())
}

const MODEL_TRANSFORM_UNIFORM: &str = "u_model";

fn submit_direct(
    driver: &mut dyn Driver,
    uploaded: &UploadedBatch,
    command: DrawCommand,
) -> Result<()> {
    let mode = uploaded.batch.mode;
    match command {
        DrawCommand::Array {
            vertex_count,
            instance_count,
            first_vertex,
            base_instance,
        } => {
            driver.draw_arrays(mode, first_vertex, vertex_count, instance_count, base_instance);
        }
        DrawCommand::Indexed {
            vertex_count,
            instance_count,
            first_index,
            base_vertex,
            base_instance,
        } => {
            // presence validated before any driver call
            let index_type = uploaded.index_type.ok_or(GlazeError::MissingIndexBuffer)?;
            driver.draw_elements(
                mode,
                index_type,
                vertex_count,
                first_index,
                base_vertex,
                instance_count,
                base_instance,
            );
        }
    }
    Ok(())
}
