use crate::*;

struct ViewInner {
  resource: GPUResource,
  guid: usize,
}

/// Read only view over a shared resource. The view keeps the resource alive;
/// it never owns the resource's usage state.
#[derive(Clone)]
pub struct GPUSrv {
  inner: Arc<ViewInner>,
}

impl GPUSrv {
  pub(crate) fn new(device: &GPUDevice, resource: GPUResource) -> Self {
    Self {
      inner: Arc::new(ViewInner {
        resource,
        guid: device.alloc_guid(),
      }),
    }
  }

  pub fn guid(&self) -> usize {
    self.inner.guid
  }

  pub fn resource(&self) -> &GPUResource {
    &self.inner.resource
  }

  pub(crate) fn native_handle(&self) -> NativeHandle {
    NativeHandle::ResourceView(self.inner.guid)
  }
}

impl PartialEq for GPUSrv {
  fn eq(&self, other: &Self) -> bool {
    self.guid() == other.guid()
  }
}

impl std::fmt::Debug for GPUSrv {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GPUSrv").field("guid", &self.guid()).finish()
  }
}

/// Read write view over a shared resource.
#[derive(Clone)]
pub struct GPUUav {
  inner: Arc<ViewInner>,
}

impl GPUUav {
  pub(crate) fn new(device: &GPUDevice, resource: GPUResource) -> Self {
    Self {
      inner: Arc::new(ViewInner {
        resource,
        guid: device.alloc_guid(),
      }),
    }
  }

  pub fn guid(&self) -> usize {
    self.inner.guid
  }

  pub fn resource(&self) -> &GPUResource {
    &self.inner.resource
  }

  pub(crate) fn native_handle(&self) -> NativeHandle {
    NativeHandle::ResourceView(self.inner.guid)
  }
}

impl PartialEq for GPUUav {
  fn eq(&self, other: &Self) -> bool {
    self.guid() == other.guid()
  }
}

impl std::fmt::Debug for GPUUav {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GPUUav").field("guid", &self.guid()).finish()
  }
}
