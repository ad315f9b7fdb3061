use crate::*;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum AddressMode {
  #[default]
  ClampToEdge,
  Repeat,
  MirrorRepeat,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum FilterMode {
  #[default]
  Linear,
  Nearest,
}

/// hashable sampler descriptor
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct SamplerDescriptor {
  pub address_mode_u: AddressMode,
  pub address_mode_v: AddressMode,
  pub address_mode_w: AddressMode,
  pub mag_filter: FilterMode,
  pub min_filter: FilterMode,
  pub mipmap_filter: FilterMode,
  pub anisotropy_clamp: u16,
}

#[derive(Clone)]
pub struct GPUSampler {
  inner: Arc<SamplerInner>,
}

struct SamplerInner {
  desc: SamplerDescriptor,
  guid: usize,
}

impl GPUSampler {
  pub fn create(device: &GPUDevice, desc: SamplerDescriptor) -> Self {
    Self::from_parts(desc, device.alloc_guid())
  }

  pub(crate) fn from_parts(desc: SamplerDescriptor, guid: usize) -> Self {
    Self {
      inner: Arc::new(SamplerInner { desc, guid }),
    }
  }

  pub fn guid(&self) -> usize {
    self.inner.guid
  }

  pub fn desc(&self) -> &SamplerDescriptor {
    &self.inner.desc
  }

  pub(crate) fn native_handle(&self) -> NativeHandle {
    NativeHandle::Sampler(self.inner.guid)
  }
}

impl PartialEq for GPUSampler {
  fn eq(&self, other: &Self) -> bool {
    self.guid() == other.guid()
  }
}

impl std::fmt::Debug for GPUSampler {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GPUSampler")
      .field("guid", &self.guid())
      .field("desc", self.desc())
      .finish()
  }
}
