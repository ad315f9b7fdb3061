use crate::*;

#[derive(Clone, Debug, Default)]
pub struct TlasDescriptor {
  pub max_instances: u32,
}

/// Top level acceleration structure handle. Bindable like any other slot
/// kind, but the binding layer never issues transitions for it; the ray
/// tracing subsystem owns acceleration structure synchronization.
#[derive(Clone)]
pub struct GPUTlas {
  inner: Arc<TlasInner>,
}

struct TlasInner {
  desc: TlasDescriptor,
  guid: usize,
}

impl GPUTlas {
  pub fn create(device: &GPUDevice, desc: TlasDescriptor) -> Self {
    Self {
      inner: Arc::new(TlasInner {
        desc,
        guid: device.alloc_guid(),
      }),
    }
  }

  pub fn guid(&self) -> usize {
    self.inner.guid
  }

  pub fn desc(&self) -> &TlasDescriptor {
    &self.inner.desc
  }

  pub(crate) fn native_handle(&self) -> NativeHandle {
    NativeHandle::AccelerationStructure(self.inner.guid)
  }
}

impl PartialEq for GPUTlas {
  fn eq(&self, other: &Self) -> bool {
    self.guid() == other.guid()
  }
}

impl std::fmt::Debug for GPUTlas {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GPUTlas")
      .field("guid", &self.guid())
      .finish()
  }
}
