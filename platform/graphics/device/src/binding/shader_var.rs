use crate::*;

/// Read only navigation over a block's reflected layout, accumulating range
/// and uniform offsets member by member. Crossing into a constant buffer
/// member retargets the var at the owned sub block, so a path like
/// `root.field("params").field("exposure")` addresses the sub object's data.
///
/// Mutation stays on the block itself: a var resolves where to bind, the
/// block's `&mut` surface performs the bind.
#[derive(Clone)]
pub struct ShaderVar<'a> {
  block: &'a ParameterBlock,
  ty: ReflectionTypeRc,
  location: BindLocation,
}

impl<'a> ShaderVar<'a> {
  pub(crate) fn root(block: &'a ParameterBlock) -> Self {
    Self {
      block,
      ty: block.reflection().element_type().clone(),
      location: Default::default(),
    }
  }

  pub fn ty(&self) -> &ReflectionTypeRc {
    &self.ty
  }

  pub fn location(&self) -> BindLocation {
    self.location
  }

  pub fn block(&self) -> &'a ParameterBlock {
    self.block
  }

  pub fn typed_offset(&self) -> TypedShaderVarOffset {
    TypedShaderVarOffset {
      ty: self.ty.clone(),
      location: self.location,
    }
  }

  pub fn field(&self, name: &str) -> Option<ShaderVar<'a>> {
    match self.ty.as_ref() {
      ReflectionType::Struct(s) => {
        let member = s.member_by_name(name)?;
        Some(ShaderVar {
          block: self.block,
          ty: member.ty.clone(),
          location: BindLocation::with_uniform(
            self.location.range_index + member.range_base,
            self.location.array_index,
            self.location.uniform + member.uniform_offset,
          ),
        })
      }
      ReflectionType::Resource(r) if r.kind == ResourceKind::ConstantBuffer => {
        let sub = self.block.parameter_block_at(&self.location)?;
        sub.root_var().field(name)
      }
      _ => None,
    }
  }

  /// step into one element of an array typed var: binding arrays select the
  /// array slot, value arrays advance the uniform offset by the stride
  pub fn index(&self, i: u32) -> Option<ShaderVar<'a>> {
    let ReflectionType::Array(a) = self.ty.as_ref() else {
      return None;
    };
    if i >= a.count {
      return None;
    }
    let location = if a.element.resource_range_count() > 0 {
      BindLocation::with_uniform(
        self.location.range_index,
        self.location.array_index + i,
        self.location.uniform,
      )
    } else {
      BindLocation::with_uniform(
        self.location.range_index,
        self.location.array_index,
        self.location.uniform + i * a.stride,
      )
    };
    Some(ShaderVar {
      block: self.block,
      ty: a.element.clone(),
      location,
    })
  }

  pub fn texture(&self) -> Option<GPUTexture> {
    self.block.get_texture_at(&self.location)
  }

  pub fn buffer(&self) -> Option<GPUBuffer> {
    self.block.get_buffer_at(&self.location)
  }

  pub fn sampler(&self) -> Option<GPUSampler> {
    self.block.get_sampler_at(&self.location)
  }

  pub fn srv(&self) -> Option<GPUSrv> {
    self.block.get_srv_at(&self.location)
  }

  pub fn uav(&self) -> Option<GPUUav> {
    self.block.get_uav_at(&self.location)
  }

  pub fn parameter_block(&self) -> Option<&'a ParameterBlock> {
    self.block.parameter_block_at(&self.location)
  }

  pub fn tlas(&self) -> Option<GPUTlas> {
    self.block.get_tlas_at(&self.location)
  }
}
