use crate::*;

fn material_like_type() -> ReflectionTypeRc {
  let params = StructTypeBuilder::new("MaterialParams")
    .member("exposure", ReflectionType::scalar(ScalarKind::Float))
    .member("tint", ReflectionType::vector(ScalarKind::Float, 3))
    .build();

  StructTypeBuilder::new("Material")
    .member("albedo", ReflectionType::texture(ShaderAccess::Read))
    .member("albedo_sampler", ReflectionType::sampler())
    .member("params", ReflectionType::constant_buffer(params))
    .member("scale", ReflectionType::scalar(ScalarKind::Float))
    .build()
}

#[test]
fn struct_layout_follows_member_alignment() {
  let ty = StructTypeBuilder::new("T")
    .member("a", ReflectionType::scalar(ScalarKind::Float))
    .member("b", ReflectionType::vector(ScalarKind::Float, 3))
    .member("c", ReflectionType::scalar(ScalarKind::Uint))
    .member("d", ReflectionType::vector(ScalarKind::Float, 2))
    .build();

  let s = ty.as_struct().unwrap();
  assert_eq!(s.member_by_name("a").unwrap().uniform_offset, 0);
  // vec3 aligns to 16
  assert_eq!(s.member_by_name("b").unwrap().uniform_offset, 16);
  // scalar packs right after the vec3
  assert_eq!(s.member_by_name("c").unwrap().uniform_offset, 28);
  assert_eq!(s.member_by_name("d").unwrap().uniform_offset, 32);
  assert_eq!(ty.byte_size(), 48);
}

#[test]
fn matrix_rows_are_sixteen_bytes() {
  assert_eq!(ReflectionType::matrix(4).byte_size(), 64);
  assert_eq!(ReflectionType::matrix(3).byte_size(), 48);
}

#[test]
fn resource_ranges_collected_depth_first() {
  let inner = StructTypeBuilder::new("Inner")
    .member("lut", ReflectionType::texture(ShaderAccess::Read))
    .member("out", ReflectionType::texture(ShaderAccess::ReadWrite))
    .build();

  let ty = StructTypeBuilder::new("Outer")
    .member("first", ReflectionType::sampler())
    .member("nested", inner)
    .member(
      "last",
      ReflectionType::buffer(ResourceKind::StructuredBuffer, ShaderAccess::ReadWrite),
    )
    .build();

  let reflection = ParameterBlockReflection::new(ty);
  let descriptors: Vec<_> = reflection.ranges().iter().map(|r| r.descriptor).collect();
  assert_eq!(
    descriptors,
    vec![
      DescriptorKind::Sampler,
      DescriptorKind::TextureSrv,
      DescriptorKind::TextureUav,
      DescriptorKind::StructuredBufferUav,
    ]
  );
}

#[test]
fn binding_arrays_widen_slot_count_not_range_count() {
  let ty = StructTypeBuilder::new("T")
    .member(
      "textures",
      ReflectionType::binding_array(ReflectionType::texture(ShaderAccess::Read), 8),
    )
    .build();

  let reflection = ParameterBlockReflection::new(ty);
  assert_eq!(reflection.resource_range_count(), 1);
  let range = reflection.resource_range(0).unwrap();
  assert_eq!(range.descriptor, DescriptorKind::TextureSrv);
  assert_eq!(range.count, 8);
}

#[test]
fn member_lookup_yields_range_and_uniform_address() {
  let reflection = ParameterBlockReflection::new(material_like_type());

  let albedo = reflection.find_member("albedo").unwrap();
  assert_eq!(albedo.location.range_index, 0);
  assert!(albedo.ty.as_resource().is_some());

  let params = reflection.find_member("params").unwrap();
  assert_eq!(params.location.range_index, 2);

  // the scalar after three resource members carries a pure uniform address
  let scale = reflection.find_member("scale").unwrap();
  assert_eq!(scale.location.uniform, UniformShaderVarOffset(0));
  assert_eq!(
    reflection.variable_offset("scale"),
    Some(UniformShaderVarOffset(0))
  );

  // resource members have no uniform byte address
  assert_eq!(reflection.variable_offset("albedo"), None);
  assert_eq!(reflection.find_member("missing").map(|_| ()), None);
}

#[test]
fn constant_buffer_carries_its_element_reflection() {
  let reflection = ParameterBlockReflection::new(material_like_type());
  let params = reflection.find_member("params").unwrap();
  let block = params
    .ty
    .as_resource()
    .unwrap()
    .element_block
    .as_ref()
    .unwrap();
  assert_eq!(
    block.variable_offset("exposure"),
    Some(UniformShaderVarOffset(0))
  );
  assert_eq!(
    block.variable_offset("tint"),
    Some(UniformShaderVarOffset(16))
  );
  assert_eq!(block.element_byte_size(), 32);
}

#[test]
fn program_registry_resolves_named_types() {
  let mut program = ProgramReflection::new();
  program.register_type("Material", material_like_type());

  let ty = program.find_type("Material").unwrap();
  assert!(ty.as_struct().is_some());
  assert!(program.find_type("Unknown").is_none());
}
