use crate::*;

fn test_device() -> GPUDevice {
  GPUDevice::new(Default::default())
}

fn material_type() -> ReflectionTypeRc {
  let params = StructTypeBuilder::new("MaterialParams")
    .member("exposure", ReflectionType::scalar(ScalarKind::Float))
    .build();

  StructTypeBuilder::new("Material")
    .member("albedo", ReflectionType::texture(ShaderAccess::Read))
    .member("albedo_sampler", ReflectionType::sampler())
    .member("params", ReflectionType::constant_buffer(params))
    .build()
}

fn material_block(device: &GPUDevice) -> ParameterBlock {
  ParameterBlock::with_element_type(device, Some(material_type())).unwrap()
}

fn compute_io_type() -> ReflectionTypeRc {
  StructTypeBuilder::new("ComputeIO")
    .member(
      "input",
      ReflectionType::buffer(ResourceKind::StructuredBuffer, ShaderAccess::Read),
    )
    .member(
      "output",
      ReflectionType::buffer(ResourceKind::StructuredBuffer, ShaderAccess::ReadWrite),
    )
    .build()
}

fn host_mirror(block: &ParameterBlock) -> &HostShaderObject {
  block.native_object().as_any().downcast_ref().unwrap()
}

fn read_i32(raw: &[u8], offset: usize) -> i32 {
  i32::from_le_bytes(raw[offset..offset + 4].try_into().unwrap())
}

fn read_f32(raw: &[u8], offset: usize) -> f32 {
  f32::from_le_bytes(raw[offset..offset + 4].try_into().unwrap())
}

#[test]
fn construction_requires_type_information() {
  let device = test_device();
  let program = ProgramReflection::new();
  assert!(matches!(
    ParameterBlock::create(&device, &program, "Unknown"),
    Err(ParameterBlockCreateFailure::MissingTypeInformation)
  ));
  assert!(matches!(
    ParameterBlock::with_element_type(&device, None),
    Err(ParameterBlockCreateFailure::MissingTypeInformation)
  ));
}

#[test]
fn named_construction_resolves_through_the_program() {
  let device = test_device();
  let mut program = ProgramReflection::new();
  program.register_type("Material", material_type());

  let block = ParameterBlock::create(&device, &program, "Material").unwrap();
  assert_eq!(block.reflection().resource_range_count(), 3);
}

#[test]
fn constant_buffer_sub_objects_exist_before_any_bind() {
  let device = test_device();
  let inner_a = StructTypeBuilder::new("A")
    .member("scale", ReflectionType::scalar(ScalarKind::Float))
    .build();
  let inner_b = StructTypeBuilder::new("B")
    .member("bias", ReflectionType::scalar(ScalarKind::Float))
    .build();
  let ty = StructTypeBuilder::new("TwoBuffers")
    .member("a", ReflectionType::constant_buffer(inner_a))
    .member("b", ReflectionType::constant_buffer(inner_b))
    .build();

  let block = ParameterBlock::with_element_type(&device, Some(ty)).unwrap();
  assert!(block.parameter_block_slot(0, 0).is_some());
  assert!(block.parameter_block_slot(1, 0).is_some());
  assert!(block.parameter_block("a").is_some());
  assert!(block.parameter_block("b").is_some());
}

#[test]
fn texture_round_trip_and_clear() {
  let device = test_device();
  let mut block = material_block(&device);
  let texture = GPUTexture::create(
    &device,
    TextureDescriptor::shader_resource(4, 4, TextureFormat::Rgba8Unorm),
  );

  assert_eq!(block.get_texture("albedo"), None);

  block.set_texture("albedo", Some(texture.clone())).unwrap();
  assert_eq!(block.get_texture("albedo"), Some(texture));
  assert!(host_mirror(&block).binding_at(0, 0).is_some());

  block.set_texture("albedo", None).unwrap();
  assert_eq!(block.get_texture("albedo"), None);
  assert!(host_mirror(&block).binding_at(0, 0).is_none());
}

#[test]
fn sampler_round_trip_and_clear_rebinds_the_default() {
  let device = test_device();
  let mut block = material_block(&device);
  let sampler = GPUSampler::create(
    &device,
    SamplerDescriptor {
      mag_filter: FilterMode::Nearest,
      ..Default::default()
    },
  );

  // never bound reads back as unbound while the mirror samples the default
  assert_eq!(block.get_sampler("albedo_sampler"), None);
  let default_handle = NativeHandle::Sampler(device.default_sampler().guid());
  assert_eq!(host_mirror(&block).binding_at(1, 0), Some(default_handle));

  block
    .set_sampler("albedo_sampler", Some(sampler.clone()))
    .unwrap();
  assert_eq!(block.get_sampler("albedo_sampler"), Some(sampler.clone()));
  assert_eq!(
    host_mirror(&block).binding_at(1, 0),
    Some(NativeHandle::Sampler(sampler.guid()))
  );

  block.set_sampler("albedo_sampler", None).unwrap();
  assert_eq!(block.get_sampler("albedo_sampler"), None);
  assert_eq!(host_mirror(&block).binding_at(1, 0), Some(default_handle));
}

#[test]
fn buffer_routes_through_the_slot_declared_access() {
  let device = test_device();
  let mut block = ParameterBlock::with_element_type(&device, Some(compute_io_type())).unwrap();
  let input = GPUBuffer::create(&device, BufferDescriptor::shader_resource(256));
  let output = GPUBuffer::create(&device, BufferDescriptor::unordered_access(256));

  block.set_buffer("input", Some(input.clone())).unwrap();
  block.set_buffer("output", Some(output.clone())).unwrap();

  let input_loc = BindLocation::new(0, 0);
  let output_loc = BindLocation::new(1, 0);
  assert!(block.get_srv_at(&input_loc).is_some());
  assert!(block.get_uav_at(&input_loc).is_none());
  assert!(block.get_uav_at(&output_loc).is_some());

  assert_eq!(block.get_buffer("input"), Some(input));
  assert_eq!(block.get_buffer("output"), Some(output));

  block.set_buffer("output", None).unwrap();
  assert_eq!(block.get_buffer("output"), None);
  assert!(block.get_uav_at(&output_loc).is_none());
}

#[test]
fn kind_mismatch_is_rejected_and_prior_binding_survives() {
  let device = test_device();
  let mut block = material_block(&device);
  let texture = GPUTexture::create(
    &device,
    TextureDescriptor::shader_resource(4, 4, TextureFormat::Rgba8Unorm),
  );
  let sampler = GPUSampler::create(&device, Default::default());
  let buffer = GPUBuffer::create(&device, BufferDescriptor::shader_resource(64));

  block.set_texture("albedo", Some(texture.clone())).unwrap();
  block
    .set_sampler("albedo_sampler", Some(sampler.clone()))
    .unwrap();

  // buffer into a sampler slot
  let sampler_loc = BindLocation::new(1, 0);
  assert!(matches!(
    block.set_buffer_at(&sampler_loc, Some(buffer.clone())),
    Err(BindingError::NotAResourceSlot)
  ));
  assert_eq!(block.get_sampler("albedo_sampler"), Some(sampler.clone()));

  // sampler into a texture slot
  assert!(matches!(
    block.set_sampler("albedo", Some(sampler.clone())),
    Err(BindingError::NotASamplerSlot)
  ));
  assert_eq!(block.get_texture("albedo"), Some(texture.clone()));

  // texture into a constant buffer slot
  let params_loc = BindLocation::new(2, 0);
  assert!(matches!(
    block.set_texture_at(&params_loc, Some(texture.clone())),
    Err(BindingError::NotAResourceSlot)
  ));
  assert!(block.parameter_block("params").is_some());

  // the mirror never saw any of the rejected binds
  assert_eq!(
    host_mirror(&block).binding_at(1, 0),
    Some(NativeHandle::Sampler(sampler.guid()))
  );

  // a location outside the layout
  assert!(matches!(
    block.set_texture_at(&BindLocation::new(9, 0), Some(texture)),
    Err(BindingError::RangeOutOfBounds)
  ));

  // an unknown member name
  assert!(matches!(
    block.set_buffer("missing", Some(buffer)),
    Err(BindingError::UnknownMember(_))
  ));
}

#[test]
fn raw_view_binds_respect_slot_capability() {
  let device = test_device();
  let mut block = ParameterBlock::with_element_type(&device, Some(compute_io_type())).unwrap();
  let buffer = GPUBuffer::create(&device, BufferDescriptor::unordered_access(128));

  let input_loc = BindLocation::new(0, 0);
  let output_loc = BindLocation::new(1, 0);

  block.set_srv_at(&input_loc, Some(buffer.srv())).unwrap();
  block.set_uav_at(&output_loc, Some(buffer.uav())).unwrap();

  assert!(matches!(
    block.set_uav_at(&input_loc, Some(buffer.uav())),
    Err(BindingError::NotAUavSlot)
  ));
  assert!(matches!(
    block.set_srv_at(&output_loc, Some(buffer.srv())),
    Err(BindingError::NotASrvSlot)
  ));

  let srv = block.get_srv_at(&input_loc).unwrap();
  block.set_srv_at(&input_loc, Some(srv.clone())).unwrap();
  assert_eq!(block.get_srv_at(&input_loc), Some(srv));

  block.set_srv_at(&input_loc, None).unwrap();
  assert!(block.get_srv_at(&input_loc).is_none());
}

#[test]
fn tlas_round_trip_clear_and_mismatch() {
  let device = test_device();
  let ty = StructTypeBuilder::new("RtScene")
    .member("scene_bvh", ReflectionType::acceleration_structure())
    .member("out_color", ReflectionType::texture(ShaderAccess::ReadWrite))
    .build();
  let mut block = ParameterBlock::with_element_type(&device, Some(ty)).unwrap();
  let tlas = GPUTlas::create(&device, TlasDescriptor { max_instances: 16 });

  assert_eq!(block.get_tlas("scene_bvh"), None);
  block.set_tlas("scene_bvh", Some(tlas.clone())).unwrap();
  assert_eq!(block.get_tlas("scene_bvh"), Some(tlas.clone()));

  block.set_tlas("scene_bvh", None).unwrap();
  assert_eq!(block.get_tlas("scene_bvh"), None);

  assert!(matches!(
    block.set_tlas("out_color", Some(tlas)),
    Err(BindingError::NotAnAccelerationStructureSlot)
  ));
}

#[test]
fn boolean_uniforms_widen_to_four_byte_integers() {
  let device = test_device();
  let ty = StructTypeBuilder::new("Flags")
    .member("flag", ReflectionType::scalar(ScalarKind::Bool))
    .member("mask", ReflectionType::vector(ScalarKind::Bool, 3))
    .build();
  let mut block = ParameterBlock::with_element_type(&device, Some(ty)).unwrap();

  let flag = block.variable_offset("flag").unwrap();
  let mask = block.variable_offset("mask").unwrap();
  assert_eq!(mask, UniformShaderVarOffset(16));

  block.set_variable(flag, true).unwrap();
  block
    .set_variable(mask, glam::BVec3::new(true, false, true))
    .unwrap();

  let raw = block.raw_data();
  assert_eq!(read_i32(raw, 0), 1);
  assert_eq!(read_i32(raw, 16), 1);
  assert_eq!(read_i32(raw, 20), 0);
  assert_eq!(read_i32(raw, 24), 1);

  block.set_variable(flag, false).unwrap();
  assert_eq!(read_i32(block.raw_data(), 0), 0);
}

#[test]
fn uniform_writes_are_bounds_checked() {
  let device = test_device();
  let ty = StructTypeBuilder::new("Tiny")
    .member("value", ReflectionType::scalar(ScalarKind::Float))
    .build();
  let mut block = ParameterBlock::with_element_type(&device, Some(ty)).unwrap();

  assert!(block
    .set_variable(UniformShaderVarOffset(64), 1.0f32)
    .is_err());
  assert!(block.set_blob(UniformShaderVarOffset(0), &[0; 128]).is_err());
}

#[test]
fn blob_writes_land_in_the_raw_image() {
  let device = test_device();
  let ty = StructTypeBuilder::new("Params")
    .member("a", ReflectionType::vector(ScalarKind::Float, 4))
    .build();
  let mut block = ParameterBlock::with_element_type(&device, Some(ty)).unwrap();

  let payload = [7u8, 11, 13, 17];
  block.set_blob(UniformShaderVarOffset(4), &payload).unwrap();
  assert_eq!(&block.raw_data()[4..8], &payload);
  assert_eq!(block.element_size(), 16);
  assert_eq!(block.byte_size(), 16);
}

#[test]
fn prepare_transitions_srvs_and_uavs_to_their_required_states() {
  let device = test_device();
  let mut block = ParameterBlock::with_element_type(&device, Some(compute_io_type())).unwrap();
  let input = GPUBuffer::create(&device, BufferDescriptor::shader_resource(64));
  let output = GPUBuffer::create(&device, BufferDescriptor::unordered_access(64));

  block.set_buffer("input", Some(input.clone())).unwrap();
  block.set_buffer("output", Some(output.clone())).unwrap();

  let mut ctx = GPUContext::new();
  block.prepare_for_dispatch(&mut ctx).unwrap();

  assert_eq!(input.state(), ResourceState::ShaderResource);
  assert_eq!(output.state(), ResourceState::UnorderedAccess);
  assert!(ctx.commands().contains(&BarrierCommand::Transition {
    resource: input.guid(),
    from: ResourceState::Undefined,
    to: ResourceState::ShaderResource,
  }));
}

#[test]
fn back_to_back_uav_dispatches_get_explicit_hazard_barriers() {
  let device = test_device();
  let output = GPUBuffer::create(&device, BufferDescriptor::unordered_access(64));

  let mut block_a = ParameterBlock::with_element_type(&device, Some(compute_io_type())).unwrap();
  let mut block_b = ParameterBlock::with_element_type(&device, Some(compute_io_type())).unwrap();
  block_a.set_buffer("output", Some(output.clone())).unwrap();
  block_b.set_buffer("output", Some(output.clone())).unwrap();

  let mut ctx = GPUContext::new();
  // the resource is already in unordered access state before either dispatch
  ctx.resource_barrier(&output.clone().into(), ResourceState::UnorderedAccess);
  ctx.take_commands();

  block_a.prepare_for_dispatch(&mut ctx).unwrap();
  block_b.prepare_for_dispatch(&mut ctx).unwrap();

  // no state change to carry an implicit barrier, so each prepare inserts an
  // explicit hazard of its own
  let hazards = ctx
    .commands()
    .iter()
    .filter(|c| {
      matches!(
        c,
        BarrierCommand::UavHazard { resource } if *resource == output.guid()
      )
    })
    .count();
  assert_eq!(hazards, 2);
  assert!(!ctx
    .commands()
    .iter()
    .any(|c| matches!(c, BarrierCommand::Transition { .. })));
}

#[test]
fn uav_counter_is_transitioned_and_hazard_protected_first() {
  let device = test_device();
  let output = GPUBuffer::create(
    &device,
    BufferDescriptor::unordered_access(64).with_uav_counter(),
  );
  let counter = output.uav_counter().unwrap().clone();

  let mut block = ParameterBlock::with_element_type(&device, Some(compute_io_type())).unwrap();
  block.set_buffer("output", Some(output.clone())).unwrap();

  let mut ctx = GPUContext::new();
  block.prepare_for_dispatch(&mut ctx).unwrap();

  assert_eq!(
    ctx.commands(),
    &[
      BarrierCommand::Transition {
        resource: counter.guid(),
        from: ResourceState::Undefined,
        to: ResourceState::UnorderedAccess,
      },
      BarrierCommand::UavHazard {
        resource: counter.guid(),
      },
      BarrierCommand::Transition {
        resource: output.guid(),
        from: ResourceState::Undefined,
        to: ResourceState::UnorderedAccess,
      },
    ]
  );
}

#[test]
fn acceleration_structure_backed_resources_skip_generic_transitions() {
  let device = test_device();
  let backing = GPUBuffer::create(&device, BufferDescriptor::acceleration_structure_backing(256));

  let ty = StructTypeBuilder::new("T")
    .member(
      "bvh_data",
      ReflectionType::buffer(ResourceKind::RawBuffer, ShaderAccess::Read),
    )
    .build();
  let mut block = ParameterBlock::with_element_type(&device, Some(ty)).unwrap();
  block.set_buffer("bvh_data", Some(backing.clone())).unwrap();

  let mut ctx = GPUContext::new();
  block.prepare_for_dispatch(&mut ctx).unwrap();

  assert!(ctx.commands().is_empty());
  assert_eq!(backing.state(), ResourceState::Undefined);
}

#[test]
fn prepare_walks_every_level_of_the_block_tree() {
  let device = test_device();

  let mut element = StructTypeBuilder::new("Leaf")
    .member("tex", ReflectionType::texture(ShaderAccess::Read))
    .build();
  for _ in 0..2 {
    element = StructTypeBuilder::new("Level")
      .member("tex", ReflectionType::texture(ShaderAccess::Read))
      .member("inner", ReflectionType::constant_buffer(element))
      .build();
  }

  let mut block = ParameterBlock::with_element_type(&device, Some(element)).unwrap();

  let textures: Vec<_> = (0..3)
    .map(|_| {
      GPUTexture::create(
        &device,
        TextureDescriptor::shader_resource(4, 4, TextureFormat::Rgba8Unorm),
      )
    })
    .collect();

  block.set_texture("tex", Some(textures[0].clone())).unwrap();
  let level1 = block.parameter_block_mut("inner").unwrap();
  level1.set_texture("tex", Some(textures[1].clone())).unwrap();
  let level2 = level1.parameter_block_mut("inner").unwrap();
  level2.set_texture("tex", Some(textures[2].clone())).unwrap();

  let mut ctx = GPUContext::new();
  block.prepare_for_dispatch(&mut ctx).unwrap();

  // one transition per bound resource across the whole tree
  assert_eq!(ctx.commands().len(), 3);
  for texture in &textures {
    assert_eq!(texture.state(), ResourceState::ShaderResource);
  }
}

#[test]
fn example_scenario_albedo_sampler_params() {
  let device = test_device();
  let mut block = material_block(&device);

  // range 2 is the params constant buffer, present before any bind
  assert!(block
    .parameter_block_at(&BindLocation::new(2, 0))
    .is_some());
  assert_eq!(block.get_texture("albedo"), None);

  let sampler = GPUSampler::create(&device, Default::default());
  block
    .set_sampler("albedo_sampler", Some(sampler.clone()))
    .unwrap();
  assert_eq!(block.get_sampler("albedo_sampler"), Some(sampler));

  let nested = block.parameter_block_mut("params").unwrap();
  let exposure = nested.variable_offset("exposure").unwrap();
  nested.set_variable(exposure, 2.5f32).unwrap();
  assert_eq!(read_f32(nested.raw_data(), 0), 2.5);
}

#[test]
fn shader_var_navigates_nested_members() {
  let device = test_device();
  let block = material_block(&device);

  let albedo = block.find_member("albedo").unwrap();
  assert_eq!(albedo.location(), BindLocation::new(0, 0));

  // crossing into the constant buffer retargets at the sub object
  let exposure = block
    .root_var()
    .field("params")
    .unwrap()
    .field("exposure")
    .unwrap();
  assert_eq!(exposure.location().uniform, UniformShaderVarOffset(0));
  assert!(exposure.ty().as_value().is_some());

  assert!(block.root_var().field("missing").is_none());
}

#[test]
fn shader_var_indexes_binding_arrays() {
  let device = test_device();
  let ty = StructTypeBuilder::new("T")
    .member(
      "textures",
      ReflectionType::binding_array(ReflectionType::texture(ShaderAccess::Read), 4),
    )
    .build();
  let mut block = ParameterBlock::with_element_type(&device, Some(ty)).unwrap();

  let slot = block.find_member("textures").unwrap().index(2).unwrap();
  let location = slot.location();
  assert_eq!(location.range_index, 0);
  assert_eq!(location.array_index, 2);

  let texture = GPUTexture::create(
    &device,
    TextureDescriptor::shader_resource(4, 4, TextureFormat::Rgba8Unorm),
  );
  block.set_texture_at(&location, Some(texture.clone())).unwrap();
  assert_eq!(block.get_texture_at(&location), Some(texture));
  assert_eq!(block.get_texture_at(&BindLocation::new(0, 0)), None);

  assert!(block.find_member("textures").unwrap().index(4).is_none());
}
