use glaze::*;

fn draw_call_count(driver: &RecordingDriver) -> usize {
    driver
        .calls()
        .iter()
        .filter(|c| {
            matches!(
                c,
                DriverCall::DrawArrays { .. }
                    | DriverCall::DrawElements { .. }
                    | DriverCall::MultiDrawArraysIndirect { .. }
                    | DriverCall::MultiDrawElementsIndirect { .. }
            )
        })
        .count()
}

#[test]
fn empty_batch_issues_no_driver_calls() {
    let mut driver = RecordingDriver::new();
    let binding = VertexBinding::new(&mut driver, &Default::default()).unwrap();
    let batch = DrawBatch::new(DrawMode::Triangles);

    let uploaded = upload_batch(&mut driver, &batch, &binding).unwrap();
    assert!(uploaded.indirect_buffer().is_none());

    driver.clear_calls();
    submit_batch(&mut driver, &uploaded).unwrap();
    assert_eq!(driver.call_count(), 0, "empty batch must not touch the driver");
}

#[test]
fn single_command_batch_issues_one_direct_array_draw() {
    let mut driver = RecordingDriver::new();
    let binding = VertexBinding::new(&mut driver, &Default::default()).unwrap();

    let mut batch = DrawBatch::new(DrawMode::TriangleStrip);
    batch.push(
        DrawCommand::array(7)
            .with_instances(3, 11)
            .with_vertex_offset(20),
    );

    let uploaded = upload_batch(&mut driver, &batch, &binding).unwrap();
    assert!(uploaded.indirect_buffer().is_none());

    driver.clear_calls();
    submit_batch(&mut driver, &uploaded).unwrap();

    assert_eq!(draw_call_count(&driver), 1);
    assert!(driver.calls().contains(&DriverCall::DrawArrays {
        mode: DrawMode::TriangleStrip,
        first_vertex: 20,
        vertex_count: 7,
        instance_count: 3,
        base_instance: 11,
    }));
}

#[test]
fn single_indexed_command_uses_the_bound_index_type() {
    let mut driver = RecordingDriver::new();
    let indices = Buffer::new(&mut driver, &BufferInfo::default()).unwrap();
    let mut binding = VertexBinding::new(&mut driver, &Default::default()).unwrap();
    binding
        .attach_index_buffer(&mut driver, &indices, IndexType::U16)
        .unwrap();

    let mut batch = DrawBatch::new(DrawMode::Triangles);
    batch.push(
        DrawCommand::indexed(36)
            .with_index_offset(6)
            .with_vertex_offset(-2),
    );

    let uploaded = upload_batch(&mut driver, &batch, &binding).unwrap();
    driver.clear_calls();
    submit_batch(&mut driver, &uploaded).unwrap();

    assert_eq!(draw_call_count(&driver), 1);
    assert!(driver.calls().contains(&DriverCall::DrawElements {
        mode: DrawMode::Triangles,
        index_type: IndexType::U16,
        vertex_count: 36,
        first_index: 6,
        base_vertex: -2,
        instance_count: 1,
        base_instance: 0,
    }));
}

#[test]
fn indexed_command_without_index_buffer_is_rejected_before_any_call() {
    let mut driver = RecordingDriver::new();
    let binding = VertexBinding::new(&mut driver, &Default::default()).unwrap();

    let mut batch = DrawBatch::new(DrawMode::Triangles);
    batch.push(DrawCommand::indexed(3));

    let uploaded = upload_batch(&mut driver, &batch, &binding).unwrap();
    driver.clear_calls();
    assert_eq!(
        submit_batch(&mut driver, &uploaded),
        Err(GlazeError::MissingIndexBuffer)
    );
    assert_eq!(driver.call_count(), 0);
}

#[test]
fn multi_command_batch_without_indirect_buffer_is_invalid() {
    let mut driver = RecordingDriver::new();
    let binding = VertexBinding::new(&mut driver, &Default::default()).unwrap();

    let mut batch = DrawBatch::new(DrawMode::Triangles);
    batch.push(DrawCommand::array(4)).push(DrawCommand::array(4));

    let uploaded = UploadedBatch::from_parts(&batch, &binding, None).unwrap();
    driver.clear_calls();
    assert_eq!(
        submit_batch(&mut driver, &uploaded),
        Err(GlazeError::MissingIndirectBuffer)
    );
    assert_eq!(driver.call_count(), 0, "contract violations must not reach the driver");
}

#[test]
fn multi_command_batch_collapses_to_one_indirect_call() {
    let mut driver = RecordingDriver::new();
    let binding = VertexBinding::new(&mut driver, &Default::default()).unwrap();

    let mut batch = DrawBatch::new(DrawMode::Triangles);
    for i in 0..5u32 {
        batch.push(DrawCommand::array(6).with_vertex_offset((i * 6) as i32));
    }

    let uploaded = upload_batch(&mut driver, &batch, &binding).unwrap();
    assert!(uploaded.indirect_buffer().is_some());

    driver.clear_calls();
    submit_batch(&mut driver, &uploaded).unwrap();

    assert_eq!(draw_call_count(&driver), 1);
    assert!(driver.calls().contains(&DriverCall::MultiDrawArraysIndirect {
        mode: DrawMode::Triangles,
        offset: 0,
        draw_count: 5,
        stride: INDIRECT_STRIDE as u32,
    }));
}

#[test]
fn indexed_multi_command_batch_uses_the_elements_entry_point() {
    let mut driver = RecordingDriver::new();
    let indices = Buffer::new(&mut driver, &BufferInfo::default()).unwrap();
    let mut binding = VertexBinding::new(&mut driver, &Default::default()).unwrap();
    binding
        .attach_index_buffer(&mut driver, &indices, IndexType::U32)
        .unwrap();

    let mut batch = DrawBatch::new(DrawMode::Triangles);
    batch
        .push(DrawCommand::indexed(6))
        .push(DrawCommand::indexed(6).with_index_offset(6))
        .push(DrawCommand::indexed(6).with_index_offset(12));

    let uploaded = upload_batch(&mut driver, &batch, &binding).unwrap();
    driver.clear_calls();
    submit_batch(&mut driver, &uploaded).unwrap();

    assert_eq!(draw_call_count(&driver), 1);
    assert!(driver.calls().contains(&DriverCall::MultiDrawElementsIndirect {
        mode: DrawMode::Triangles,
        index_type: IndexType::U32,
        offset: 0,
        draw_count: 3,
        stride: INDIRECT_STRIDE as u32,
    }));
}

#[test]
fn indirect_buffer_holds_the_packed_records_in_submission_order() {
    let mut driver = RecordingDriver::new();
    let binding = VertexBinding::new(&mut driver, &Default::default()).unwrap();

    let commands = [
        DrawCommand::array(4),
        DrawCommand::array(4).with_vertex_offset(4),
        DrawCommand::array(4).with_vertex_offset(8),
    ];
    let mut batch = DrawBatch::new(DrawMode::TriangleFan);
    for command in commands {
        batch.push(command);
    }

    let uploaded = upload_batch(&mut driver, &batch, &binding).unwrap();

    let indirect = uploaded.indirect_buffer().unwrap();
    let bytes = driver.buffer_bytes(indirect.handle().unwrap()).unwrap();
    assert_eq!(bytes.len(), 3 * INDIRECT_STRIDE);
    let mut expected = Vec::new();
    for command in commands {
        expected.extend_from_slice(&command.record_bytes());
    }
    assert_eq!(bytes, &expected[..]);

    driver.clear_calls();
    submit_batch(&mut driver, &uploaded).unwrap();
    assert!(driver.calls().contains(&DriverCall::MultiDrawArraysIndirect {
        mode: DrawMode::TriangleFan,
        offset: 0,
        draw_count: 3,
        stride: INDIRECT_STRIDE as u32,
    }));
}

#[test]
fn program_batches_push_transform_and_named_bindings() {
    let mut driver = RecordingDriver::new();
    let program = Program::new(&mut driver).unwrap();
    let program_handle = program.handle().unwrap();
    driver.define_resource_block(program_handle, BindSlot::Uniform, "Camera", 0);
    driver.define_resource_block(program_handle, BindSlot::ShaderStorage, "Particles", 3);

    let camera = Buffer::new(&mut driver, &BufferInfo::default()).unwrap();
    let particles = Buffer::new(&mut driver, &BufferInfo::default()).unwrap();
    let binding = VertexBinding::new(&mut driver, &Default::default()).unwrap();

    let mut batch = DrawBatch::new(DrawMode::Triangles);
    batch.program = Some(program_handle);
    batch.transform = Some(glam::Mat4::IDENTITY.to_cols_array());
    batch.bind_buffer("Camera", BindSlot::Uniform, &camera).unwrap();
    batch
        .bind_buffer("Particles", BindSlot::ShaderStorage, &particles)
        .unwrap();
    batch.push(DrawCommand::array(3));

    let uploaded = upload_batch(&mut driver, &batch, &binding).unwrap();
    driver.clear_calls();
    submit_batch(&mut driver, &uploaded).unwrap();

    let calls = driver.calls();
    let bind_at = calls
        .iter()
        .position(|c| matches!(c, DriverCall::BindProgram { .. }))
        .unwrap();
    let draw_at = calls
        .iter()
        .position(|c| matches!(c, DriverCall::DrawArrays { .. }))
        .unwrap();
    let unbind_at = calls
        .iter()
        .position(|c| matches!(c, DriverCall::UnbindProgram))
        .unwrap();
    assert!(bind_at < draw_at && draw_at < unbind_at);

    assert!(calls.contains(&DriverCall::BindBufferSlot {
        slot: BindSlot::Uniform,
        index: 0,
        buffer: camera.handle().unwrap(),
    }));
    assert!(calls.contains(&DriverCall::BindBufferSlot {
        slot: BindSlot::ShaderStorage,
        index: 3,
        buffer: particles.handle().unwrap(),
    }));
    let transform_at = calls
        .iter()
        .position(|c| matches!(c, DriverCall::SetUniformMatrix { .. }))
        .unwrap();
    assert!(bind_at < transform_at && transform_at < draw_at);
}

#[test]
fn setup_and_cleanup_hooks_bracket_the_submission() {
    let mut driver = RecordingDriver::new();
    let binding = VertexBinding::new(&mut driver, &Default::default()).unwrap();

    let mut batch = DrawBatch::new(DrawMode::Lines);
    batch.push(DrawCommand::array(2));
    batch.setup = Some(Box::new(|d: &mut dyn Driver| {
        d.set_debug_name(ObjectKind::Program, 0, "blend on");
    }));
    batch.cleanup = Some(Box::new(|d: &mut dyn Driver| {
        d.set_debug_name(ObjectKind::Program, 0, "blend off");
    }));

    let uploaded = upload_batch(&mut driver, &batch, &binding).unwrap();
    driver.clear_calls();
    submit_batch(&mut driver, &uploaded).unwrap();

    let calls = driver.calls();
    assert!(matches!(
        calls.first(),
        Some(DriverCall::SetDebugName { name, .. }) if name == "blend on"
    ));
    assert!(matches!(
        calls.last(),
        Some(DriverCall::SetDebugName { name, .. }) if name == "blend off"
    ));
    assert_eq!(draw_call_count(&driver), 1);
}

#[test]
fn uploaded_batches_can_be_resubmitted_until_released() {
    let mut driver = RecordingDriver::new();
    let binding = VertexBinding::new(&mut driver, &Default::default()).unwrap();

    let mut batch = DrawBatch::new(DrawMode::Triangles);
    batch.push(DrawCommand::array(4)).push(DrawCommand::array(4));

    let mut uploaded = upload_batch(&mut driver, &batch, &binding).unwrap();

    driver.clear_calls();
    submit_batch(&mut driver, &uploaded).unwrap();
    submit_batch(&mut driver, &uploaded).unwrap();
    assert_eq!(draw_call_count(&driver), 2);

    uploaded.release(&mut driver);
    uploaded.release(&mut driver);
    let deletes = driver
        .calls()
        .iter()
        .filter(|c| matches!(c, DriverCall::DeleteObject { .. }))
        .count();
    assert_eq!(deletes, 1);
}
