use crate::*;

/// One resource range of a block's layout: every resource typed leaf of the
/// element type declares exactly one range, arrays widen the slot count.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ResourceRange {
  pub descriptor: DescriptorKind,
  pub count: u32,
}

/// Layout description of one parameter block: the element type plus its
/// resource ranges in depth first declaration order. Shared read-only with
/// every block instance created against it.
pub struct ParameterBlockReflection {
  element_type: ReflectionTypeRc,
  ranges: Vec<ResourceRange>,
}

impl ParameterBlockReflection {
  pub fn new(element_type: ReflectionTypeRc) -> Arc<Self> {
    let mut ranges = Vec::new();
    collect_resource_ranges(&element_type, 1, &mut ranges);
    Arc::new(Self {
      element_type,
      ranges,
    })
  }

  pub fn element_type(&self) -> &ReflectionTypeRc {
    &self.element_type
  }

  pub fn element_byte_size(&self) -> u32 {
    self.element_type.byte_size()
  }

  pub fn resource_range_count(&self) -> u32 {
    self.ranges.len() as u32
  }

  pub fn resource_range(&self, index: u32) -> Option<ResourceRange> {
    self.ranges.get(index as usize).copied()
  }

  pub fn ranges(&self) -> &[ResourceRange] {
    &self.ranges
  }

  /// resolve a top level member name to its location and declared type
  pub fn find_member(&self, name: &str) -> Option<TypedShaderVarOffset> {
    let s = self.element_type.unwrap_array().as_struct()?;
    let m = s.member_by_name(name)?;
    Some(TypedShaderVarOffset {
      ty: m.ty.clone(),
      location: BindLocation::with_uniform(
        m.range_base,
        0,
        UniformShaderVarOffset(m.uniform_offset),
      ),
    })
  }

  /// byte offset of a top level uniform member, for plain data writes
  pub fn variable_offset(&self, name: &str) -> Option<UniformShaderVarOffset> {
    let member = self.find_member(name)?;
    member.ty.as_value()?;
    Some(member.location.uniform)
  }
}

fn collect_resource_ranges(ty: &ReflectionType, multiplier: u32, out: &mut Vec<ResourceRange>) {
  match ty {
    ReflectionType::Value(_) => {}
    ReflectionType::Struct(s) => {
      for m in &s.members {
        collect_resource_ranges(&m.ty, multiplier, out);
      }
    }
    ReflectionType::Array(a) => {
      collect_resource_ranges(&a.element, multiplier * a.count, out);
    }
    ReflectionType::Resource(r) => {
      out.push(ResourceRange {
        descriptor: r.descriptor_kind(),
        count: multiplier,
      });
    }
  }
}
