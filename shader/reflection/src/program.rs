use crate::*;

/// The named reflected types one compiled program version exposes. The
/// binding layer resolves the named construction path against this registry.
#[derive(Default)]
pub struct ProgramReflection {
  types: FxHashMap<String, ReflectionTypeRc>,
}

impl ProgramReflection {
  pub fn new() -> Self {
    Default::default()
  }

  pub fn register_type(&mut self, name: impl Into<String>, ty: ReflectionTypeRc) -> &mut Self {
    self.types.insert(name.into(), ty);
    self
  }

  pub fn find_type(&self, name: &str) -> Option<ReflectionTypeRc> {
    self.types.get(name).cloned()
  }
}
