use crate::*;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TextureFormat {
  Rgba8Unorm,
  Rgba16Float,
  Rgba32Float,
  R32Uint,
  Depth32Float,
}

#[derive(Clone, Debug)]
pub struct TextureDescriptor {
  pub width: u32,
  pub height: u32,
  pub format: TextureFormat,
  pub bind_flags: BindFlags,
}

impl TextureDescriptor {
  pub fn shader_resource(width: u32, height: u32, format: TextureFormat) -> Self {
    Self {
      width,
      height,
      format,
      bind_flags: BindFlags::SHADER_RESOURCE,
    }
  }

  pub fn unordered_access(width: u32, height: u32, format: TextureFormat) -> Self {
    Self {
      width,
      height,
      format,
      bind_flags: BindFlags::SHADER_RESOURCE | BindFlags::UNORDERED_ACCESS,
    }
  }
}

#[derive(Clone)]
pub struct GPUTexture {
  inner: Arc<TextureInner>,
}

pub(crate) struct TextureInner {
  desc: TextureDescriptor,
  guid: usize,
  device: GPUDevice,
  state: Mutex<ResourceState>,
}

impl GPUTexture {
  pub fn create(device: &GPUDevice, desc: TextureDescriptor) -> Self {
    Self {
      inner: Arc::new(TextureInner {
        desc,
        guid: device.alloc_guid(),
        device: device.clone(),
        state: Default::default(),
      }),
    }
  }

  pub fn guid(&self) -> usize {
    self.inner.guid
  }

  pub fn desc(&self) -> &TextureDescriptor {
    &self.inner.desc
  }

  pub fn bind_flags(&self) -> BindFlags {
    self.inner.desc.bind_flags
  }

  pub fn state(&self) -> ResourceState {
    *self.inner.state.lock()
  }

  pub fn srv(&self) -> GPUSrv {
    GPUSrv::new(&self.inner.device, self.clone().into())
  }

  pub fn uav(&self) -> GPUUav {
    GPUUav::new(&self.inner.device, self.clone().into())
  }

  pub(crate) fn state_cell(&self) -> &Mutex<ResourceState> {
    &self.inner.state
  }
}

impl PartialEq for GPUTexture {
  fn eq(&self, other: &Self) -> bool {
    self.guid() == other.guid()
  }
}

impl std::fmt::Debug for GPUTexture {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GPUTexture")
      .field("guid", &self.guid())
      .field("desc", self.desc())
      .finish()
  }
}
