use crate::*;

/// CPU staging backend. The mirror keeps the uniform data image and per
/// range binding tables host side; a hardware backend would flush them into
/// api descriptors at submit time. Also the backend the test suite drives.
#[derive(Default)]
pub struct HostBackend {
  guid: AtomicUsize,
}

impl HostBackend {
  pub fn new() -> Self {
    Default::default()
  }
}

impl GraphicsBackend for HostBackend {
  fn name(&self) -> &str {
    "host"
  }

  fn create_shader_object(
    &self,
    layout: &ParameterBlockReflection,
  ) -> Result<Box<dyn NativeShaderObject>, NativeObjectError> {
    let slots = layout
      .ranges()
      .iter()
      .map(|r| vec![None; r.count as usize])
      .collect();

    Ok(Box::new(HostShaderObject {
      guid: self.guid.fetch_add(1, Ordering::Relaxed),
      uniform_data: vec![0; layout.element_byte_size() as usize],
      slots,
    }))
  }
}

pub struct HostShaderObject {
  guid: usize,
  uniform_data: Vec<u8>,
  slots: Vec<Vec<Option<NativeHandle>>>,
}

impl HostShaderObject {
  pub fn binding_at(&self, range_index: u32, array_index: u32) -> Option<NativeHandle> {
    *self
      .slots
      .get(range_index as usize)?
      .get(array_index as usize)?
  }

  fn slot_mut(
    &mut self,
    offset: NativeShaderOffset,
  ) -> Result<&mut Option<NativeHandle>, NativeObjectError> {
    self
      .slots
      .get_mut(offset.range_index as usize)
      .and_then(|range| range.get_mut(offset.array_index as usize))
      .ok_or(NativeObjectError::OffsetOutOfRange(offset))
  }
}

impl NativeShaderObject for HostShaderObject {
  fn guid(&self) -> usize {
    self.guid
  }

  fn byte_size(&self) -> usize {
    self.uniform_data.len()
  }

  fn write_uniform(
    &mut self,
    offset: NativeShaderOffset,
    bytes: &[u8],
  ) -> Result<(), NativeObjectError> {
    // uniform data lives in the element image, not in a resource range
    if offset.range_index != 0 || offset.array_index != 0 {
      return Err(NativeObjectError::OffsetOutOfRange(offset));
    }
    let start = offset.uniform_offset as usize;
    let end = start + bytes.len();
    if end > self.uniform_data.len() {
      return Err(NativeObjectError::UniformWriteOutOfBounds {
        offset: offset.uniform_offset,
        size: bytes.len() as u32,
        total: self.uniform_data.len() as u32,
      });
    }
    self.uniform_data[start..end].copy_from_slice(bytes);
    Ok(())
  }

  fn set_resource(
    &mut self,
    offset: NativeShaderOffset,
    view: Option<NativeHandle>,
  ) -> Result<(), NativeObjectError> {
    *self.slot_mut(offset)? = view;
    Ok(())
  }

  fn set_sampler(
    &mut self,
    offset: NativeShaderOffset,
    sampler: NativeHandle,
  ) -> Result<(), NativeObjectError> {
    *self.slot_mut(offset)? = Some(sampler);
    Ok(())
  }

  fn set_object(
    &mut self,
    offset: NativeShaderOffset,
    object: Option<NativeHandle>,
  ) -> Result<(), NativeObjectError> {
    *self.slot_mut(offset)? = object;
    Ok(())
  }

  fn raw_uniform_data(&self) -> &[u8] {
    &self.uniform_data
  }

  fn as_any(&self) -> &dyn Any {
    self
  }
}
