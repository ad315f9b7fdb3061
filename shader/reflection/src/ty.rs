use crate::*;

/// Scalar component categories the device layout understands.
///
/// Booleans occupy 4 bytes per component on the device even though the host
/// representation is 1 byte; the binding layer widens host booleans on write.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ScalarKind {
  Bool,
  Int,
  Uint,
  Uint64,
  Float,
}

impl ScalarKind {
  pub fn byte_size(&self) -> u32 {
    match self {
      ScalarKind::Uint64 => 8,
      _ => 4,
    }
  }
}

/// Scalar, vector or matrix shape. Vectors are `rows = n, cols = 1`.
///
/// Matrices follow the device convention of densely packed 16 byte rows, so
/// only the four-wide row shapes are addressable here.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ReflectionValueType {
  pub scalar: ScalarKind,
  pub rows: u32,
  pub cols: u32,
}

impl ReflectionValueType {
  pub fn scalar(scalar: ScalarKind) -> Self {
    Self {
      scalar,
      rows: 1,
      cols: 1,
    }
  }

  pub fn vector(scalar: ScalarKind, rows: u32) -> Self {
    Self {
      scalar,
      rows,
      cols: 1,
    }
  }

  pub fn matrix(rows: u32) -> Self {
    Self {
      scalar: ScalarKind::Float,
      rows,
      cols: 4,
    }
  }

  pub fn byte_size(&self) -> u32 {
    if self.cols > 1 {
      self.rows * 16
    } else {
      self.scalar.byte_size() * self.rows
    }
  }

  pub fn align(&self) -> u32 {
    if self.cols > 1 {
      16
    } else {
      match self.rows {
        1 => self.scalar.byte_size(),
        2 => self.scalar.byte_size() * 2,
        _ => 16,
      }
    }
  }
}

/// Which way a shader is declared to access a resource slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ShaderAccess {
  Read,
  ReadWrite,
}

/// The opaque resource categories a slot may hold.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ResourceKind {
  Texture,
  RawBuffer,
  TypedBuffer,
  StructuredBuffer,
  ConstantBuffer,
  Sampler,
  AccelerationStructure,
}

/// Per resource range descriptor classification, derived once from the
/// resource type instead of re-deriving kind and access on every bind call.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DescriptorKind {
  ConstantBuffer,
  TextureSrv,
  TextureUav,
  RawBufferSrv,
  RawBufferUav,
  TypedBufferSrv,
  TypedBufferUav,
  StructuredBufferSrv,
  StructuredBufferUav,
  Sampler,
  AccelerationStructure,
}

pub struct ReflectionResourceType {
  pub kind: ResourceKind,
  pub access: ShaderAccess,
  /// constant buffers carry the reflection of their element data so the
  /// binding layer can instantiate the sub object eagerly
  pub element_block: Option<Arc<ParameterBlockReflection>>,
}

impl ReflectionResourceType {
  pub fn descriptor_kind(&self) -> DescriptorKind {
    let read = self.access == ShaderAccess::Read;
    match self.kind {
      ResourceKind::ConstantBuffer => DescriptorKind::ConstantBuffer,
      ResourceKind::Sampler => DescriptorKind::Sampler,
      ResourceKind::AccelerationStructure => DescriptorKind::AccelerationStructure,
      ResourceKind::Texture => {
        if read {
          DescriptorKind::TextureSrv
        } else {
          DescriptorKind::TextureUav
        }
      }
      ResourceKind::RawBuffer => {
        if read {
          DescriptorKind::RawBufferSrv
        } else {
          DescriptorKind::RawBufferUav
        }
      }
      ResourceKind::TypedBuffer => {
        if read {
          DescriptorKind::TypedBufferSrv
        } else {
          DescriptorKind::TypedBufferUav
        }
      }
      ResourceKind::StructuredBuffer => {
        if read {
          DescriptorKind::StructuredBufferSrv
        } else {
          DescriptorKind::StructuredBufferUav
        }
      }
    }
  }
}

pub struct StructMember {
  pub name: String,
  pub ty: ReflectionTypeRc,
  /// byte offset of the member inside the owning struct's uniform data
  pub uniform_offset: u32,
  /// number of resource ranges declared by preceding members
  pub range_base: u32,
}

pub struct ReflectionStructType {
  pub name: String,
  pub members: Vec<StructMember>,
  pub byte_size: u32,
  pub range_count: u32,
}

impl ReflectionStructType {
  pub fn member_by_name(&self, name: &str) -> Option<&StructMember> {
    self.members.iter().find(|m| m.name == name)
  }
}

pub struct ReflectionArrayType {
  pub element: ReflectionTypeRc,
  pub count: u32,
  pub stride: u32,
}

pub type ReflectionTypeRc = Arc<ReflectionType>;

/// Compiler derived description of one shader declared type. The binding
/// layer consumes this read-only; it must stay stable for the lifetime of
/// every parameter block bound to it.
pub enum ReflectionType {
  Value(ReflectionValueType),
  Struct(ReflectionStructType),
  Array(ReflectionArrayType),
  Resource(ReflectionResourceType),
}

impl ReflectionType {
  pub fn scalar(kind: ScalarKind) -> ReflectionTypeRc {
    Arc::new(ReflectionType::Value(ReflectionValueType::scalar(kind)))
  }

  pub fn vector(kind: ScalarKind, rows: u32) -> ReflectionTypeRc {
    Arc::new(ReflectionType::Value(ReflectionValueType::vector(
      kind, rows,
    )))
  }

  pub fn matrix(rows: u32) -> ReflectionTypeRc {
    Arc::new(ReflectionType::Value(ReflectionValueType::matrix(rows)))
  }

  pub fn texture(access: ShaderAccess) -> ReflectionTypeRc {
    Arc::new(ReflectionType::Resource(ReflectionResourceType {
      kind: ResourceKind::Texture,
      access,
      element_block: None,
    }))
  }

  pub fn buffer(kind: ResourceKind, access: ShaderAccess) -> ReflectionTypeRc {
    Arc::new(ReflectionType::Resource(ReflectionResourceType {
      kind,
      access,
      element_block: None,
    }))
  }

  pub fn sampler() -> ReflectionTypeRc {
    Arc::new(ReflectionType::Resource(ReflectionResourceType {
      kind: ResourceKind::Sampler,
      access: ShaderAccess::Read,
      element_block: None,
    }))
  }

  pub fn acceleration_structure() -> ReflectionTypeRc {
    Arc::new(ReflectionType::Resource(ReflectionResourceType {
      kind: ResourceKind::AccelerationStructure,
      access: ShaderAccess::Read,
      element_block: None,
    }))
  }

  pub fn constant_buffer(element: ReflectionTypeRc) -> ReflectionTypeRc {
    Arc::new(ReflectionType::Resource(ReflectionResourceType {
      kind: ResourceKind::ConstantBuffer,
      access: ShaderAccess::Read,
      element_block: Some(ParameterBlockReflection::new(element)),
    }))
  }

  pub fn binding_array(element: ReflectionTypeRc, count: u32) -> ReflectionTypeRc {
    let stride = element.byte_size();
    Arc::new(ReflectionType::Array(ReflectionArrayType {
      element,
      count,
      stride,
    }))
  }

  /// peel all array layers off, yielding the innermost element type
  pub fn unwrap_array(&self) -> &ReflectionType {
    match self {
      ReflectionType::Array(a) => a.element.unwrap_array(),
      other => other,
    }
  }

  pub fn as_struct(&self) -> Option<&ReflectionStructType> {
    match self {
      ReflectionType::Struct(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_resource(&self) -> Option<&ReflectionResourceType> {
    match self {
      ReflectionType::Resource(r) => Some(r),
      _ => None,
    }
  }

  pub fn as_value(&self) -> Option<&ReflectionValueType> {
    match self {
      ReflectionType::Value(v) => Some(v),
      _ => None,
    }
  }

  /// uniform bytes the type occupies inside the owning block's flat data.
  /// opaque resource slots occupy none.
  pub fn byte_size(&self) -> u32 {
    match self {
      ReflectionType::Value(v) => v.byte_size(),
      ReflectionType::Struct(s) => s.byte_size,
      ReflectionType::Array(a) => a.count * a.stride,
      ReflectionType::Resource(_) => 0,
    }
  }

  pub fn align(&self) -> u32 {
    match self {
      ReflectionType::Value(v) => v.align(),
      ReflectionType::Struct(_) => 16,
      ReflectionType::Array(_) => 16,
      ReflectionType::Resource(_) => 1,
    }
  }

  /// number of distinct resource ranges the type declares. arrays multiply a
  /// range's slot count, not the number of ranges.
  pub fn resource_range_count(&self) -> u32 {
    match self {
      ReflectionType::Value(_) => 0,
      ReflectionType::Struct(s) => s.range_count,
      ReflectionType::Array(a) => a.element.resource_range_count(),
      ReflectionType::Resource(_) => 1,
    }
  }
}

fn round_up(v: u32, align: u32) -> u32 {
  v.div_ceil(align) * align
}

/// Builds struct layouts the way the external compiler would report them:
/// members aligned in declaration order, resource members occupying ranges
/// but no uniform bytes.
pub struct StructTypeBuilder {
  name: String,
  members: Vec<StructMember>,
  cursor: u32,
  range_cursor: u32,
}

impl StructTypeBuilder {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      members: Default::default(),
      cursor: 0,
      range_cursor: 0,
    }
  }

  pub fn member(self, name: impl Into<String>, ty: ReflectionTypeRc) -> Self {
    let offset = round_up(self.cursor, ty.align());
    self.member_at(name, ty, offset)
  }

  /// place a member at an explicit byte offset, overriding automatic layout
  pub fn member_at(mut self, name: impl Into<String>, ty: ReflectionTypeRc, offset: u32) -> Self {
    let size = ty.byte_size();
    let ranges = ty.resource_range_count();
    self.members.push(StructMember {
      name: name.into(),
      ty,
      uniform_offset: offset,
      range_base: self.range_cursor,
    });
    self.cursor = self.cursor.max(offset + size);
    self.range_cursor += ranges;
    self
  }

  pub fn build(self) -> ReflectionTypeRc {
    let byte_size = if self.cursor == 0 {
      0
    } else {
      round_up(self.cursor, 16)
    };
    Arc::new(ReflectionType::Struct(ReflectionStructType {
      name: self.name,
      members: self.members,
      byte_size,
      range_count: self.range_cursor,
    }))
  }
}
