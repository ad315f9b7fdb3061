use crate::*;

mod host;
pub use host::*;

/// The single offset triple the native layer understands. A pure uniform
/// offset addresses range zero, element zero by definition; a bind location
/// carries all three components.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct NativeShaderOffset {
  pub range_index: u32,
  pub array_index: u32,
  pub uniform_offset: u32,
}

impl From<UniformShaderVarOffset> for NativeShaderOffset {
  fn from(offset: UniformShaderVarOffset) -> Self {
    Self {
      range_index: 0,
      array_index: 0,
      uniform_offset: offset.byte_offset(),
    }
  }
}

impl From<&BindLocation> for NativeShaderOffset {
  fn from(location: &BindLocation) -> Self {
    Self {
      range_index: location.range_index,
      array_index: location.array_index,
      uniform_offset: location.uniform.byte_offset(),
    }
  }
}

/// Opaque token a mirror stores for one bound device object. The wire
/// representation behind the token differs per backend.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NativeHandle {
  ResourceView(usize),
  Sampler(usize),
  AccelerationStructure(usize),
  Object(usize),
}

#[derive(thiserror::Error, Debug)]
pub enum NativeObjectError {
  #[error("offset {0:?} addresses outside the object's layout")]
  OffsetOutOfRange(NativeShaderOffset),
  #[error("uniform write of {size} bytes at {offset} exceeds the {total} byte element data")]
  UniformWriteOutOfBounds { offset: u32, size: u32, total: u32 },
}

/// The backend specific mirror a draw or dispatch call consumes. Every bind
/// on a parameter block updates its mirror synchronously; a failed mirror
/// write is reported back so the block can leave its own maps untouched.
pub trait NativeShaderObject {
  fn guid(&self) -> usize;

  /// total uniform bytes the object's element data occupies
  fn byte_size(&self) -> usize;

  fn write_uniform(&mut self, offset: NativeShaderOffset, bytes: &[u8])
    -> Result<(), NativeObjectError>;

  fn set_resource(
    &mut self,
    offset: NativeShaderOffset,
    view: Option<NativeHandle>,
  ) -> Result<(), NativeObjectError>;

  fn set_sampler(
    &mut self,
    offset: NativeShaderOffset,
    sampler: NativeHandle,
  ) -> Result<(), NativeObjectError>;

  fn set_object(
    &mut self,
    offset: NativeShaderOffset,
    object: Option<NativeHandle>,
  ) -> Result<(), NativeObjectError>;

  fn raw_uniform_data(&self) -> &[u8];

  fn as_any(&self) -> &dyn Any;
}

/// One graphics api the device can drive. The binding layer stays wire
/// agnostic: everything backend specific lives behind this seam.
pub trait GraphicsBackend: 'static {
  fn name(&self) -> &str;

  fn create_shader_object(
    &self,
    layout: &ParameterBlockReflection,
  ) -> Result<Box<dyn NativeShaderObject>, NativeObjectError>;
}
