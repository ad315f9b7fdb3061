use crate::*;

pub struct GPUDeviceCreateConfig {
  pub backend: Box<dyn GraphicsBackend>,
  pub default_sampler: SamplerDescriptor,
}

impl Default for GPUDeviceCreateConfig {
  fn default() -> Self {
    Self {
      backend: Box::new(HostBackend::new()),
      default_sampler: Default::default(),
    }
  }
}

#[derive(Clone)]
pub struct GPUDevice {
  inner: Arc<GPUDeviceInner>,
}

struct GPUDeviceInner {
  backend: Box<dyn GraphicsBackend>,
  default_sampler: GPUSampler,
  guid: AtomicUsize,
}

impl GPUDevice {
  pub fn new(config: GPUDeviceCreateConfig) -> Self {
    let guid = AtomicUsize::new(0);
    let default_sampler =
      GPUSampler::from_parts(config.default_sampler, guid.fetch_add(1, Ordering::Relaxed));

    Self {
      inner: Arc::new(GPUDeviceInner {
        backend: config.backend,
        default_sampler,
        guid,
      }),
    }
  }

  pub fn backend_name(&self) -> &str {
    self.inner.backend.name()
  }

  /// every sampler slot of a freshly constructed block samples through this
  pub fn default_sampler(&self) -> &GPUSampler {
    &self.inner.default_sampler
  }

  pub(crate) fn alloc_guid(&self) -> usize {
    self.inner.guid.fetch_add(1, Ordering::Relaxed)
  }

  pub(crate) fn create_shader_object(
    &self,
    layout: &ParameterBlockReflection,
  ) -> Result<Box<dyn NativeShaderObject>, NativeObjectError> {
    self.inner.backend.create_shader_object(layout)
  }
}

impl Default for GPUDevice {
  fn default() -> Self {
    Self::new(Default::default())
  }
}
