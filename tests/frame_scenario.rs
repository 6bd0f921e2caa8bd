//! Full path of a quad-heavy frame: stage vertices, share the quad index
//! buffer, compile the batch, submit once.

use glaze::*;

#[test]
fn quad_batch_flows_from_staging_to_one_indirect_submission() {
    let mut ctx = Context::new(RecordingDriver::new(), &ContextInfo { quad_capacity: 16 })
        .unwrap();

    // stage three quads of interleaved position/uv
    let mut staging = BufferBuilder::with_capacity(256).unwrap();
    for quad in 0..3u32 {
        let x = quad as f32 * 10.0;
        for (dx, dy, u, v) in [
            (0.0, 0.0, 0.0, 0.0),
            (10.0, 0.0, 1.0, 0.0),
            (10.0, 10.0, 1.0, 1.0),
            (0.0, 10.0, 0.0, 1.0),
        ] {
            staging
                .put_vec2([x + dx, dy])
                .unwrap()
                .put_vec2([u, v])
                .unwrap();
        }
    }
    assert_eq!(staging.len(), 3 * 4 * 4 * 4);

    let staged = staging.finish().unwrap();
    let mut vertices = ctx
        .make_buffer(&BufferInfo {
            debug_name: "quad vertices",
            byte_size: staged.len(),
            usage: UsageHint::StreamDraw,
            initial_data: Some(staged.as_slice()),
        })
        .unwrap();

    let mut binding = ctx.make_vertex_binding(&Default::default()).unwrap();
    binding
        .attach_vertex_buffer(ctx.driver_mut(), &vertices, 0, 0, 16)
        .unwrap();
    let (quad_handle, quad_index_type) = {
        let quads = ctx.quad_indices(3).unwrap();
        (quads.buffer().handle().unwrap(), quads.index_type())
    };
    binding
        .attach_index_buffer_raw(ctx.driver_mut(), quad_handle, quad_index_type)
        .unwrap();

    // one indexed command per quad, rebased onto the packed vertex buffer
    let mut batch = DrawBatch::new(DrawMode::Triangles);
    for quad in 0..3 {
        batch.push(DrawCommand::indexed(6).with_vertex_offset(quad * 4));
    }

    let mut uploaded = ctx.upload_batch(&batch, &binding).unwrap();

    // the staged vertex bytes arrived untouched
    let vertex_handle = vertices.handle().unwrap();
    assert_eq!(
        ctx.driver().buffer_bytes(vertex_handle).unwrap(),
        staged.as_slice()
    );
    staged.free();

    // three packed 20-byte records, in submission order
    let indirect_handle = uploaded.indirect_buffer().unwrap().handle().unwrap();
    let record_bytes = ctx.driver().buffer_bytes(indirect_handle).unwrap().to_vec();
    assert_eq!(record_bytes.len(), 3 * INDIRECT_STRIDE);
    let mut expected = Vec::new();
    for command in &batch.commands {
        expected.extend_from_slice(&command.record_bytes());
    }
    assert_eq!(record_bytes, expected);

    ctx.driver_mut().clear_calls();
    ctx.submit_batch(&uploaded).unwrap();

    let draw_calls: Vec<_> = ctx
        .driver()
        .calls()
        .iter()
        .filter(|c| {
            matches!(
                c,
                DriverCall::DrawElements { .. } | DriverCall::MultiDrawElementsIndirect { .. }
            )
        })
        .collect();
    assert_eq!(draw_calls.len(), 1);
    assert_eq!(
        draw_calls[0],
        &DriverCall::MultiDrawElementsIndirect {
            mode: DrawMode::Triangles,
            index_type: IndexType::U32,
            offset: 0,
            draw_count: 3,
            stride: INDIRECT_STRIDE as u32,
        }
    );

    // a fence covers the submission before the staging buffers are reused
    let mut fence = ctx.make_fence().unwrap();
    let fence_handle = fence.handle().unwrap();
    ctx.driver_mut().signal_fence_on_wait(fence_handle);
    assert_eq!(
        fence
            .client_wait(ctx.driver_mut(), WaitFlags::FLUSH_COMMANDS, 16_000_000)
            .unwrap(),
        WaitStatus::ConditionSatisfied
    );

    fence.release(ctx.driver_mut());
    uploaded.release(ctx.driver_mut());
    vertices.release(ctx.driver_mut());
    binding.release(ctx.driver_mut());

    let driver = ctx.destroy();
    assert_eq!(driver.live_objects(), 0, "frame must not leak driver objects");
}
