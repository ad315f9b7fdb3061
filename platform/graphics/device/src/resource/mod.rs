use crate::*;

mod acceleration;
mod buffer;
mod sampler;
mod texture;
mod view;

pub use acceleration::*;
pub use buffer::*;
pub use sampler::*;
pub use texture::*;
pub use view::*;

bitflags::bitflags! {
  /// How a resource may be bound. Declared at creation, immutable afterwards.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
  pub struct BindFlags: u32 {
    const SHADER_RESOURCE = 1 << 0;
    const UNORDERED_ACCESS = 1 << 1;
    const CONSTANT = 1 << 2;
    const ACCELERATION_STRUCTURE = 1 << 3;
  }
}

/// Current usage state of a shared resource. This is global mutable state:
/// many blocks may reference the same resource, so transitions are serialized
/// through the context's barrier api and never cached per block.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum ResourceState {
  #[default]
  Undefined,
  ShaderResource,
  UnorderedAccess,
  CopySource,
  CopyDest,
  AccelerationStructure,
}

/// A shared resource entity the barrier walk operates on. Cheap to clone,
/// identity is the guid.
#[derive(Clone)]
pub enum GPUResource {
  Buffer(GPUBuffer),
  Texture(GPUTexture),
}

impl GPUResource {
  pub fn guid(&self) -> usize {
    match self {
      GPUResource::Buffer(b) => b.guid(),
      GPUResource::Texture(t) => t.guid(),
    }
  }

  pub fn bind_flags(&self) -> BindFlags {
    match self {
      GPUResource::Buffer(b) => b.bind_flags(),
      GPUResource::Texture(t) => t.bind_flags(),
    }
  }

  pub fn state(&self) -> ResourceState {
    *self.state_cell().lock()
  }

  pub fn as_buffer(&self) -> Option<&GPUBuffer> {
    match self {
      GPUResource::Buffer(b) => Some(b),
      _ => None,
    }
  }

  pub fn as_texture(&self) -> Option<&GPUTexture> {
    match self {
      GPUResource::Texture(t) => Some(t),
      _ => None,
    }
  }

  pub(crate) fn state_cell(&self) -> &Mutex<ResourceState> {
    match self {
      GPUResource::Buffer(b) => b.state_cell(),
      GPUResource::Texture(t) => t.state_cell(),
    }
  }
}

impl PartialEq for GPUResource {
  fn eq(&self, other: &Self) -> bool {
    self.guid() == other.guid()
  }
}

impl From<GPUBuffer> for GPUResource {
  fn from(buffer: GPUBuffer) -> Self {
    GPUResource::Buffer(buffer)
  }
}

impl From<GPUTexture> for GPUResource {
  fn from(texture: GPUTexture) -> Self {
    GPUResource::Texture(texture)
  }
}
