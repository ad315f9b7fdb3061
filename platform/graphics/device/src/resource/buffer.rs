use crate::*;

#[derive(Clone, Debug)]
pub struct BufferDescriptor {
  pub size: u64,
  pub bind_flags: BindFlags,
  /// structured buffers may carry a hidden append/consume counter that needs
  /// its own hazard protection before every dispatch
  pub has_uav_counter: bool,
}

impl BufferDescriptor {
  pub fn shader_resource(size: u64) -> Self {
    Self {
      size,
      bind_flags: BindFlags::SHADER_RESOURCE,
      has_uav_counter: false,
    }
  }

  pub fn unordered_access(size: u64) -> Self {
    Self {
      size,
      bind_flags: BindFlags::SHADER_RESOURCE | BindFlags::UNORDERED_ACCESS,
      has_uav_counter: false,
    }
  }

  pub fn with_uav_counter(mut self) -> Self {
    self.has_uav_counter = true;
    self
  }

  pub fn acceleration_structure_backing(size: u64) -> Self {
    Self {
      size,
      bind_flags: BindFlags::SHADER_RESOURCE | BindFlags::ACCELERATION_STRUCTURE,
      has_uav_counter: false,
    }
  }
}

#[derive(Clone)]
pub struct GPUBuffer {
  inner: Arc<BufferInner>,
}

pub(crate) struct BufferInner {
  desc: BufferDescriptor,
  guid: usize,
  device: GPUDevice,
  state: Mutex<ResourceState>,
  uav_counter: Option<GPUBuffer>,
}

impl GPUBuffer {
  pub fn create(device: &GPUDevice, desc: BufferDescriptor) -> Self {
    let uav_counter = desc.has_uav_counter.then(|| {
      GPUBuffer::create(
        device,
        BufferDescriptor {
          size: 4,
          bind_flags: BindFlags::UNORDERED_ACCESS,
          has_uav_counter: false,
        },
      )
    });

    Self {
      inner: Arc::new(BufferInner {
        desc,
        guid: device.alloc_guid(),
        device: device.clone(),
        state: Default::default(),
        uav_counter,
      }),
    }
  }

  pub fn guid(&self) -> usize {
    self.inner.guid
  }

  pub fn size(&self) -> u64 {
    self.inner.desc.size
  }

  pub fn bind_flags(&self) -> BindFlags {
    self.inner.desc.bind_flags
  }

  pub fn uav_counter(&self) -> Option<&GPUBuffer> {
    self.inner.uav_counter.as_ref()
  }

  pub fn state(&self) -> ResourceState {
    *self.inner.state.lock()
  }

  /// read only view over the whole buffer
  pub fn srv(&self) -> GPUSrv {
    GPUSrv::new(&self.inner.device, self.clone().into())
  }

  /// read write view over the whole buffer
  pub fn uav(&self) -> GPUUav {
    GPUUav::new(&self.inner.device, self.clone().into())
  }

  pub(crate) fn state_cell(&self) -> &Mutex<ResourceState> {
    &self.inner.state
  }
}

impl PartialEq for GPUBuffer {
  fn eq(&self, other: &Self) -> bool {
    self.guid() == other.guid()
  }
}

impl std::fmt::Debug for GPUBuffer {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GPUBuffer")
      .field("guid", &self.guid())
      .field("size", &self.size())
      .finish()
  }
}
