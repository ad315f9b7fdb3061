/// Device layout bytes of one uniform value. Sized for the largest writable
/// value, a 4x4 matrix.
pub struct UniformBytes {
  buf: [u8; 64],
  len: usize,
}

impl UniformBytes {
  pub fn from_slice(bytes: &[u8]) -> Self {
    let mut buf = [0; 64];
    buf[..bytes.len()].copy_from_slice(bytes);
    Self {
      buf,
      len: bytes.len(),
    }
  }

  pub fn as_slice(&self) -> &[u8] {
    &self.buf[..self.len]
  }
}

/// Host values writable into a block's uniform data at a byte offset.
///
/// The host representation of a boolean is 1 byte per component, the device
/// layout uses 4 byte signed integers; every boolean shape widens to 0/1
/// integers transparently before the write.
pub trait UniformValue {
  fn device_bytes(&self) -> UniformBytes;
}

macro_rules! pod_uniform_value {
  ($ty: ty) => {
    impl UniformValue for $ty {
      fn device_bytes(&self) -> UniformBytes {
        UniformBytes::from_slice(bytemuck::bytes_of(self))
      }
    }
  };
}

pod_uniform_value!(u32);
pod_uniform_value!(i32);
pod_uniform_value!(f32);
pod_uniform_value!(u64);

pod_uniform_value!(glam::Vec2);
pod_uniform_value!(glam::Vec3);
pod_uniform_value!(glam::Vec4);

pod_uniform_value!(glam::IVec2);
pod_uniform_value!(glam::IVec3);
pod_uniform_value!(glam::IVec4);

pod_uniform_value!(glam::UVec2);
pod_uniform_value!(glam::UVec3);
pod_uniform_value!(glam::UVec4);

pod_uniform_value!(glam::Mat4);

fn widen(v: bool) -> i32 {
  if v {
    1
  } else {
    0
  }
}

impl UniformValue for bool {
  fn device_bytes(&self) -> UniformBytes {
    widen(*self).device_bytes()
  }
}

impl UniformValue for glam::BVec2 {
  fn device_bytes(&self) -> UniformBytes {
    glam::IVec2::new(widen(self.x), widen(self.y)).device_bytes()
  }
}

impl UniformValue for glam::BVec3 {
  fn device_bytes(&self) -> UniformBytes {
    glam::IVec3::new(widen(self.x), widen(self.y), widen(self.z)).device_bytes()
  }
}

impl UniformValue for glam::BVec4 {
  fn device_bytes(&self) -> UniformBytes {
    glam::IVec4::new(widen(self.x), widen(self.y), widen(self.z), widen(self.w)).device_bytes()
  }
}
