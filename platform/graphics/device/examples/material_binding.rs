use peregrine_device::*;

pub fn main() {
  env_logger::init();

  let device = GPUDevice::new(Default::default());

  // the layout the shader compiler would reflect for a simple material pass
  let params = StructTypeBuilder::new("MaterialParams")
    .member("exposure", ReflectionType::scalar(ScalarKind::Float))
    .member("tint", ReflectionType::vector(ScalarKind::Float, 3))
    .member("use_alpha_test", ReflectionType::scalar(ScalarKind::Bool))
    .build();

  let material = StructTypeBuilder::new("Material")
    .member("albedo", ReflectionType::texture(ShaderAccess::Read))
    .member("albedo_sampler", ReflectionType::sampler())
    .member("params", ReflectionType::constant_buffer(params))
    .member(
      "luminance",
      ReflectionType::buffer(ResourceKind::StructuredBuffer, ShaderAccess::ReadWrite),
    )
    .build();

  let mut block = ParameterBlock::with_element_type(&device, Some(material)).unwrap();

  let albedo = GPUTexture::create(
    &device,
    TextureDescriptor::shader_resource(1024, 1024, TextureFormat::Rgba8Unorm),
  );
  let luminance = GPUBuffer::create(&device, BufferDescriptor::unordered_access(1024 * 4));

  block.set_texture("albedo", Some(albedo)).unwrap();
  block.set_buffer("luminance", Some(luminance.clone())).unwrap();

  let params = block.parameter_block_mut("params").unwrap();
  let exposure = params.variable_offset("exposure").unwrap();
  let tint = params.variable_offset("tint").unwrap();
  let use_alpha_test = params.variable_offset("use_alpha_test").unwrap();
  params.set_variable(exposure, 1.8f32).unwrap();
  params
    .set_variable(tint, glam::Vec3::new(1.0, 0.95, 0.9))
    .unwrap();
  params.set_variable(use_alpha_test, true).unwrap();

  // two dispatches in a row reading and writing the same uav: the second
  // prepare carries an explicit hazard barrier even without a transition
  let mut ctx = GPUContext::new();
  block.prepare_for_dispatch(&mut ctx).unwrap();
  block.prepare_for_dispatch(&mut ctx).unwrap();

  println!("backend: {}", device.backend_name());
  println!("luminance state: {:?}", luminance.state());
  for command in ctx.commands() {
    println!("{command:?}");
  }
}
