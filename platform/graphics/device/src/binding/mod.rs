use crate::*;

mod shader_var;
pub use shader_var::*;
mod uniform;
pub use uniform::*;

#[cfg(test)]
mod test;

/// Capability classification of one resource range, computed once when the
/// block is constructed instead of re-deriving it from the reflected type on
/// every bind call.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum SlotKind {
  Srv,
  Uav,
  Sampler,
  ConstantBuffer,
  AccelerationStructure,
}

impl SlotKind {
  fn of(descriptor: DescriptorKind) -> Self {
    match descriptor {
      DescriptorKind::ConstantBuffer => SlotKind::ConstantBuffer,
      DescriptorKind::Sampler => SlotKind::Sampler,
      DescriptorKind::AccelerationStructure => SlotKind::AccelerationStructure,
      DescriptorKind::TextureSrv
      | DescriptorKind::RawBufferSrv
      | DescriptorKind::TypedBufferSrv
      | DescriptorKind::StructuredBufferSrv => SlotKind::Srv,
      DescriptorKind::TextureUav
      | DescriptorKind::RawBufferUav
      | DescriptorKind::TypedBufferUav
      | DescriptorKind::StructuredBufferUav => SlotKind::Uav,
    }
  }
}

/// Construction failures abort the block being constructed and propagate.
#[derive(thiserror::Error, Debug)]
pub enum ParameterBlockCreateFailure {
  #[error("can't create a parameter block without type information")]
  MissingTypeInformation,
  #[error("backend failed to create the native shader object")]
  NativeObjectCreation(#[from] NativeObjectError),
}

/// Caller misuse on the binding surface. Reported, never thrown: the call
/// fails, the slot's prior binding stays intact, the process continues.
#[derive(thiserror::Error, Debug)]
pub enum BindingError {
  #[error("no member named `{0}` in the block's layout")]
  UnknownMember(String),
  #[error("bind location addresses a resource range outside the layout")]
  RangeOutOfBounds,
  #[error("trying to bind a resource to a non srv/uav slot")]
  NotAResourceSlot,
  #[error("trying to bind an srv to a non srv slot")]
  NotASrvSlot,
  #[error("trying to bind a uav to a non uav slot")]
  NotAUavSlot,
  #[error("trying to bind a sampler to a non sampler slot")]
  NotASamplerSlot,
  #[error("trying to bind a parameter block to a non constant buffer slot")]
  NotAConstantBufferSlot,
  #[error("trying to bind an acceleration structure to a non acceleration structure slot")]
  NotAnAccelerationStructureSlot,
  #[error(transparent)]
  Native(#[from] NativeObjectError),
}

/// The barrier walk has no failure path today; the type documents where
/// backend barrier errors would surface if they ever become observable.
#[derive(thiserror::Error, Debug)]
pub enum BarrierFailure {}

/// Host side mirror of a shader declared parameter layout: a mapping from
/// bind locations to bound resources, kept in sync with the backend native
/// shader object on every mutation.
///
/// Blocks compose into a strict ownership tree: constant buffer sub objects
/// are owned by value by their parent, while the resources they reference
/// stay shared. All mutation goes through `&mut self`; serializing access is
/// the caller's job, matching the single threaded per context model.
pub struct ParameterBlock {
  device: GPUDevice,
  reflection: Arc<ParameterBlockReflection>,
  shader_object: Box<dyn NativeShaderObject>,
  range_kinds: Vec<SlotKind>,
  srvs: FxHashMap<NativeShaderOffset, GPUSrv>,
  uavs: FxHashMap<NativeShaderOffset, GPUUav>,
  samplers: FxHashMap<NativeShaderOffset, GPUSampler>,
  sub_blocks: FxHashMap<NativeShaderOffset, ParameterBlock>,
  acceleration_structures: FxHashMap<NativeShaderOffset, GPUTlas>,
}

impl ParameterBlock {
  /// construct against a type the program version exposes by name
  pub fn create(
    device: &GPUDevice,
    program: &ProgramReflection,
    type_name: &str,
  ) -> Result<Self, ParameterBlockCreateFailure> {
    Self::with_element_type(device, program.find_type(type_name))
  }

  pub fn with_element_type(
    device: &GPUDevice,
    element: Option<ReflectionTypeRc>,
  ) -> Result<Self, ParameterBlockCreateFailure> {
    let element = element.ok_or(ParameterBlockCreateFailure::MissingTypeInformation)?;
    Self::from_reflection(device, ParameterBlockReflection::new(element))
  }

  /// construct from a precomputed block reflection, the sub object path
  pub fn from_reflection(
    device: &GPUDevice,
    reflection: Arc<ParameterBlockReflection>,
  ) -> Result<Self, ParameterBlockCreateFailure> {
    let shader_object = device.create_shader_object(&reflection)?;
    let range_kinds = reflection
      .ranges()
      .iter()
      .map(|r| SlotKind::of(r.descriptor))
      .collect();

    let mut block = Self {
      device: device.clone(),
      reflection,
      shader_object,
      range_kinds,
      srvs: Default::default(),
      uavs: Default::default(),
      samplers: Default::default(),
      sub_blocks: Default::default(),
      acceleration_structures: Default::default(),
    };

    block.initialize_resource_bindings()?;
    let element = block.reflection.element_type().clone();
    block.create_constant_buffers(&element, 0)?;
    Ok(block)
  }

  /// every slot starts from a defined empty default: samplers sample through
  /// the device default, resource slots are unbound
  fn initialize_resource_bindings(&mut self) -> Result<(), ParameterBlockCreateFailure> {
    let default_sampler = self.device.default_sampler().native_handle();
    for (range_index, range) in self.reflection.ranges().iter().enumerate() {
      for array_index in 0..range.count {
        let offset = NativeShaderOffset {
          range_index: range_index as u32,
          array_index,
          uniform_offset: 0,
        };
        match SlotKind::of(range.descriptor) {
          SlotKind::Sampler => self.shader_object.set_sampler(offset, default_sampler)?,
          // filled right after, by the eager sub object walk
          SlotKind::ConstantBuffer => {}
          _ => self.shader_object.set_resource(offset, None)?,
        }
      }
    }
    Ok(())
  }

  /// Depth first walk instantiating a sub block for every constant buffer
  /// range. Struct members are recursed into, any other nested aggregate is
  /// left alone; a constant buffer's own nested buffers are handled by its
  /// constructor.
  fn create_constant_buffers(
    &mut self,
    ty: &ReflectionTypeRc,
    range_base: u32,
  ) -> Result<(), ParameterBlockCreateFailure> {
    match ty.as_ref() {
      ReflectionType::Struct(s) => {
        if s.range_count == 0 {
          return Ok(());
        }
        for member in &s.members {
          self.create_constant_buffers(&member.ty, range_base + member.range_base)?;
        }
        Ok(())
      }
      ReflectionType::Resource(r) if r.kind == ResourceKind::ConstantBuffer => {
        let sub_reflection = r
          .element_block
          .clone()
          .ok_or(ParameterBlockCreateFailure::MissingTypeInformation)?;
        let sub = ParameterBlock::from_reflection(&self.device, sub_reflection)?;
        let offset = NativeShaderOffset {
          range_index: range_base,
          array_index: 0,
          uniform_offset: 0,
        };
        self.bind_sub_block(offset, Some(sub))?;
        Ok(())
      }
      _ => Ok(()),
    }
  }

  pub fn device(&self) -> &GPUDevice {
    &self.device
  }

  pub fn reflection(&self) -> &Arc<ParameterBlockReflection> {
    &self.reflection
  }

  /// access for attaching the block to a draw or dispatch call
  pub fn native_object(&self) -> &dyn NativeShaderObject {
    self.shader_object.as_ref()
  }

  /// uniform byte size of the element data, from reflection
  pub fn element_size(&self) -> u32 {
    self.reflection.element_byte_size()
  }

  /// uniform byte size of the native mirror
  pub fn byte_size(&self) -> usize {
    self.shader_object.byte_size()
  }

  /// the mirror's current uniform data image
  pub fn raw_data(&self) -> &[u8] {
    self.shader_object.raw_uniform_data()
  }

  pub fn root_var(&self) -> ShaderVar<'_> {
    ShaderVar::root(self)
  }

  pub fn find_member(&self, name: &str) -> Option<ShaderVar<'_>> {
    self.root_var().field(name)
  }

  pub fn variable_offset(&self, name: &str) -> Option<UniformShaderVarOffset> {
    self.reflection.variable_offset(name)
  }

  fn slot_kind(&self, location: &BindLocation) -> Result<SlotKind, BindingError> {
    self
      .range_kinds
      .get(location.range_index as usize)
      .copied()
      .ok_or_else(|| {
        log::error!("bind location addresses a resource range outside the layout, ignoring the call");
        BindingError::RangeOutOfBounds
      })
  }

  fn resolve_resource_member(&self, name: &str) -> Result<BindLocation, BindingError> {
    let member = self.reflection.find_member(name).ok_or_else(|| {
      log::error!("no member named `{name}` in the block's layout, ignoring the call");
      BindingError::UnknownMember(name.to_string())
    })?;
    if member.ty.unwrap_array().as_resource().is_none() {
      log::error!("member `{name}` is not a resource slot, ignoring the call");
      return Err(BindingError::NotAResourceSlot);
    }
    Ok(member.location)
  }

  // -- buffers ---------------------------------------------------------------

  pub fn set_buffer(&mut self, name: &str, buffer: Option<GPUBuffer>) -> Result<(), BindingError> {
    let location = self.resolve_resource_member(name)?;
    self.set_buffer_at(&location, buffer)
  }

  /// The slot's reflected access decides the routing: read only slots take
  /// the buffer's srv, read write slots its uav. A slot of any other
  /// capability rejects the call and keeps its prior binding.
  pub fn set_buffer_at(
    &mut self,
    location: &BindLocation,
    buffer: Option<GPUBuffer>,
  ) -> Result<(), BindingError> {
    let offset = NativeShaderOffset::from(location);
    match self.slot_kind(location)? {
      SlotKind::Srv => {
        let view = buffer.map(|b| b.srv());
        self.bind_srv(offset, view)
      }
      SlotKind::Uav => {
        let view = buffer.map(|b| b.uav());
        self.bind_uav(offset, view)
      }
      _ => {
        log::error!("trying to bind a buffer to a non srv/uav slot, ignoring the call");
        Err(BindingError::NotAResourceSlot)
      }
    }
  }

  pub fn get_buffer(&self, name: &str) -> Option<GPUBuffer> {
    let location = self.reflection.find_member(name)?.location;
    self.get_buffer_at(&location)
  }

  pub fn get_buffer_at(&self, location: &BindLocation) -> Option<GPUBuffer> {
    let offset = NativeShaderOffset::from(location);
    match self.range_kinds.get(location.range_index as usize)? {
      SlotKind::Srv => self.srvs.get(&offset)?.resource().as_buffer().cloned(),
      SlotKind::Uav => self.uavs.get(&offset)?.resource().as_buffer().cloned(),
      _ => {
        log::error!("trying to read a buffer from a non srv/uav slot");
        None
      }
    }
  }

  // -- textures --------------------------------------------------------------

  pub fn set_texture(
    &mut self,
    name: &str,
    texture: Option<GPUTexture>,
  ) -> Result<(), BindingError> {
    let location = self.resolve_resource_member(name)?;
    self.set_texture_at(&location, texture)
  }

  pub fn set_texture_at(
    &mut self,
    location: &BindLocation,
    texture: Option<GPUTexture>,
  ) -> Result<(), BindingError> {
    let offset = NativeShaderOffset::from(location);
    match self.slot_kind(location)? {
      SlotKind::Srv => {
        let view = texture.map(|t| t.srv());
        self.bind_srv(offset, view)
      }
      SlotKind::Uav => {
        let view = texture.map(|t| t.uav());
        self.bind_uav(offset, view)
      }
      _ => {
        log::error!("trying to bind a texture to a non srv/uav slot, ignoring the call");
        Err(BindingError::NotAResourceSlot)
      }
    }
  }

  pub fn get_texture(&self, name: &str) -> Option<GPUTexture> {
    let location = self.reflection.find_member(name)?.location;
    self.get_texture_at(&location)
  }

  pub fn get_texture_at(&self, location: &BindLocation) -> Option<GPUTexture> {
    let offset = NativeShaderOffset::from(location);
    match self.range_kinds.get(location.range_index as usize)? {
      SlotKind::Srv => self.srvs.get(&offset)?.resource().as_texture().cloned(),
      SlotKind::Uav => self.uavs.get(&offset)?.resource().as_texture().cloned(),
      _ => {
        log::error!("trying to read a texture from a non srv/uav slot");
        None
      }
    }
  }

  // -- raw views -------------------------------------------------------------

  pub fn set_srv(&mut self, name: &str, srv: Option<GPUSrv>) -> Result<(), BindingError> {
    let location = self.resolve_resource_member(name)?;
    self.set_srv_at(&location, srv)
  }

  pub fn set_srv_at(
    &mut self,
    location: &BindLocation,
    srv: Option<GPUSrv>,
  ) -> Result<(), BindingError> {
    let offset = NativeShaderOffset::from(location);
    match self.slot_kind(location)? {
      SlotKind::Srv => self.bind_srv(offset, srv),
      _ => {
        log::error!("trying to bind an srv to a non srv slot, ignoring the call");
        Err(BindingError::NotASrvSlot)
      }
    }
  }

  pub fn set_uav(&mut self, name: &str, uav: Option<GPUUav>) -> Result<(), BindingError> {
    let location = self.resolve_resource_member(name)?;
    self.set_uav_at(&location, uav)
  }

  pub fn set_uav_at(
    &mut self,
    location: &BindLocation,
    uav: Option<GPUUav>,
  ) -> Result<(), BindingError> {
    let offset = NativeShaderOffset::from(location);
    match self.slot_kind(location)? {
      SlotKind::Uav => self.bind_uav(offset, uav),
      _ => {
        log::error!("trying to bind a uav to a non uav slot, ignoring the call");
        Err(BindingError::NotAUavSlot)
      }
    }
  }

  pub fn get_srv(&self, name: &str) -> Option<GPUSrv> {
    let location = self.reflection.find_member(name)?.location;
    self.get_srv_at(&location)
  }

  pub fn get_srv_at(&self, location: &BindLocation) -> Option<GPUSrv> {
    self.srvs.get(&NativeShaderOffset::from(location)).cloned()
  }

  pub fn get_uav(&self, name: &str) -> Option<GPUUav> {
    let location = self.reflection.find_member(name)?.location;
    self.get_uav_at(&location)
  }

  pub fn get_uav_at(&self, location: &BindLocation) -> Option<GPUUav> {
    self.uavs.get(&NativeShaderOffset::from(location)).cloned()
  }

  fn bind_srv(
    &mut self,
    offset: NativeShaderOffset,
    srv: Option<GPUSrv>,
  ) -> Result<(), BindingError> {
    self
      .shader_object
      .set_resource(offset, srv.as_ref().map(|v| v.native_handle()))?;
    match srv {
      Some(view) => self.srvs.insert(offset, view),
      None => self.srvs.remove(&offset),
    };
    Ok(())
  }

  fn bind_uav(
    &mut self,
    offset: NativeShaderOffset,
    uav: Option<GPUUav>,
  ) -> Result<(), BindingError> {
    self
      .shader_object
      .set_resource(offset, uav.as_ref().map(|v| v.native_handle()))?;
    match uav {
      Some(view) => self.uavs.insert(offset, view),
      None => self.uavs.remove(&offset),
    };
    Ok(())
  }

  // -- samplers --------------------------------------------------------------

  pub fn set_sampler(
    &mut self,
    name: &str,
    sampler: Option<GPUSampler>,
  ) -> Result<(), BindingError> {
    let location = self.resolve_resource_member(name)?;
    self.set_sampler_at(&location, sampler)
  }

  /// Clearing a sampler slot rebinds the device default in the mirror so the
  /// device always samples through something defined, while the slot reads
  /// back as unbound.
  pub fn set_sampler_at(
    &mut self,
    location: &BindLocation,
    sampler: Option<GPUSampler>,
  ) -> Result<(), BindingError> {
    let offset = NativeShaderOffset::from(location);
    match self.slot_kind(location)? {
      SlotKind::Sampler => {
        let bound = sampler
          .clone()
          .unwrap_or_else(|| self.device.default_sampler().clone());
        self.shader_object.set_sampler(offset, bound.native_handle())?;
        match sampler {
          Some(s) => self.samplers.insert(offset, s),
          None => self.samplers.remove(&offset),
        };
        Ok(())
      }
      _ => {
        log::error!("trying to bind a sampler to a non sampler slot, ignoring the call");
        Err(BindingError::NotASamplerSlot)
      }
    }
  }

  pub fn get_sampler(&self, name: &str) -> Option<GPUSampler> {
    let location = self.reflection.find_member(name)?.location;
    self.get_sampler_at(&location)
  }

  pub fn get_sampler_at(&self, location: &BindLocation) -> Option<GPUSampler> {
    self
      .samplers
      .get(&NativeShaderOffset::from(location))
      .cloned()
  }

  // -- nested blocks ---------------------------------------------------------

  pub fn set_parameter_block(
    &mut self,
    name: &str,
    block: Option<ParameterBlock>,
  ) -> Result<(), BindingError> {
    let location = self.resolve_resource_member(name)?;
    self.set_parameter_block_at(&location, block)
  }

  pub fn set_parameter_block_at(
    &mut self,
    location: &BindLocation,
    block: Option<ParameterBlock>,
  ) -> Result<(), BindingError> {
    let offset = NativeShaderOffset::from(location);
    match self.slot_kind(location)? {
      SlotKind::ConstantBuffer => {
        self.bind_sub_block(offset, block)?;
        Ok(())
      }
      _ => {
        log::error!("trying to bind a parameter block to a non constant buffer slot, ignoring the call");
        Err(BindingError::NotAConstantBufferSlot)
      }
    }
  }

  pub fn parameter_block(&self, name: &str) -> Option<&ParameterBlock> {
    let location = self.reflection.find_member(name)?.location;
    self.parameter_block_at(&location)
  }

  pub fn parameter_block_mut(&mut self, name: &str) -> Option<&mut ParameterBlock> {
    let location = self.reflection.find_member(name)?.location;
    self.parameter_block_at_mut(&location)
  }

  pub fn parameter_block_at(&self, location: &BindLocation) -> Option<&ParameterBlock> {
    self.sub_blocks.get(&NativeShaderOffset::from(location))
  }

  pub fn parameter_block_at_mut(&mut self, location: &BindLocation) -> Option<&mut ParameterBlock> {
    self.sub_blocks.get_mut(&NativeShaderOffset::from(location))
  }

  /// direct slot access without a reflected name, for callers iterating the
  /// layout's ranges
  pub fn parameter_block_slot(&self, range_index: u32, array_index: u32) -> Option<&ParameterBlock> {
    self.sub_blocks.get(&NativeShaderOffset {
      range_index,
      array_index,
      uniform_offset: 0,
    })
  }

  fn bind_sub_block(
    &mut self,
    offset: NativeShaderOffset,
    block: Option<ParameterBlock>,
  ) -> Result<(), NativeObjectError> {
    self.shader_object.set_object(
      offset,
      block
        .as_ref()
        .map(|b| NativeHandle::Object(b.shader_object.guid())),
    )?;
    match block {
      Some(b) => self.sub_blocks.insert(offset, b),
      None => self.sub_blocks.remove(&offset),
    };
    Ok(())
  }

  // -- acceleration structures -----------------------------------------------

  pub fn set_tlas(&mut self, name: &str, tlas: Option<GPUTlas>) -> Result<(), BindingError> {
    let location = self.resolve_resource_member(name)?;
    self.set_tlas_at(&location, tlas)
  }

  pub fn set_tlas_at(
    &mut self,
    location: &BindLocation,
    tlas: Option<GPUTlas>,
  ) -> Result<(), BindingError> {
    let offset = NativeShaderOffset::from(location);
    match self.slot_kind(location)? {
      SlotKind::AccelerationStructure => {
        self
          .shader_object
          .set_resource(offset, tlas.as_ref().map(|t| t.native_handle()))?;
        match tlas {
          Some(t) => self.acceleration_structures.insert(offset, t),
          None => self.acceleration_structures.remove(&offset),
        };
        Ok(())
      }
      _ => {
        log::error!(
          "trying to bind an acceleration structure to a non acceleration structure slot, ignoring the call"
        );
        Err(BindingError::NotAnAccelerationStructureSlot)
      }
    }
  }

  pub fn get_tlas(&self, name: &str) -> Option<GPUTlas> {
    let location = self.reflection.find_member(name)?.location;
    self.get_tlas_at(&location)
  }

  pub fn get_tlas_at(&self, location: &BindLocation) -> Option<GPUTlas> {
    self
      .acceleration_structures
      .get(&NativeShaderOffset::from(location))
      .cloned()
  }

  // -- uniform data ----------------------------------------------------------

  /// write one scalar/vector/matrix value at a byte offset into the element
  /// data. boolean shapes widen to 4 byte signed integers before the write.
  pub fn set_variable(
    &mut self,
    offset: UniformShaderVarOffset,
    value: impl UniformValue,
  ) -> Result<(), BindingError> {
    let bytes = value.device_bytes();
    self
      .shader_object
      .write_uniform(offset.into(), bytes.as_slice())?;
    Ok(())
  }

  /// raw byte image write at a uniform offset
  pub fn set_blob(
    &mut self,
    offset: UniformShaderVarOffset,
    bytes: &[u8],
  ) -> Result<(), BindingError> {
    self.shader_object.write_uniform(offset.into(), bytes)?;
    Ok(())
  }

  // -- pre dispatch synchronization -------------------------------------------

  /// Insert the state transitions every bound view requires, then recurse
  /// into every owned sub block. Callers invoke this once per block tree per
  /// dispatch; it is the only ordering guarantee this layer provides.
  ///
  /// Never fails in the current design; the result type is the extension
  /// point for propagating backend barrier failures.
  pub fn prepare_for_dispatch(&self, ctx: &mut GPUContext) -> Result<(), BarrierFailure> {
    for srv in self.srvs.values() {
      prepare_resource(ctx, srv.resource(), false);
    }
    for uav in self.uavs.values() {
      prepare_resource(ctx, uav.resource(), true);
    }
    for sub in self.sub_blocks.values() {
      sub.prepare_for_dispatch(ctx)?;
    }
    Ok(())
  }
}

fn prepare_resource(ctx: &mut GPUContext, resource: &GPUResource, is_uav: bool) {
  // a buffer's hidden uav counter transitions and hazard protects ahead of
  // the main resource
  if is_uav {
    if let Some(counter) = resource.as_buffer().and_then(|b| b.uav_counter()) {
      let counter: GPUResource = counter.clone().into();
      ctx.resource_barrier(&counter, ResourceState::UnorderedAccess);
      ctx.uav_barrier(&counter);
    }
  }

  // acceleration structure backed resources are synchronized by the ray
  // tracing subsystem, never transitioned from here
  let mut insert_barrier = !resource
    .bind_flags()
    .contains(BindFlags::ACCELERATION_STRUCTURE);
  if insert_barrier {
    let target = if is_uav {
      ResourceState::UnorderedAccess
    } else {
      ResourceState::ShaderResource
    };
    insert_barrier = !ctx.resource_barrier(resource, target);
  }

  // a uav already in unordered access state reports no transition, but two
  // back to back dispatches writing it still need an explicit hazard barrier
  if insert_barrier && is_uav {
    ctx.uav_barrier(resource);
  }
}
