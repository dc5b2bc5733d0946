use std::io::{Result as IOResult, Write};

pub trait PrimitiveWrite {
  fn write_u8(&mut self, value: u8) -> IOResult<()>;
  fn write_u16(&mut self, value: u16) -> IOResult<()>;
  fn write_i16(&mut self, value: i16) -> IOResult<()>;
  fn write_i32(&mut self, value: i32) -> IOResult<()>;
  fn write_f32(&mut self, value: f32) -> IOResult<()>;
}

impl<T: Write + ?Sized> PrimitiveWrite for T {
  fn write_u8(&mut self, value: u8) -> IOResult<()> {
    self.write_all(&value.to_le_bytes())
  }

  fn write_u16(&mut self, value: u16) -> IOResult<()> {
    self.write_all(&value.to_le_bytes())
  }

  fn write_i16(&mut self, value: i16) -> IOResult<()> {
    self.write_all(&value.to_le_bytes())
  }

  fn write_i32(&mut self, value: i32) -> IOResult<()> {
    self.write_all(&value.to_le_bytes())
  }

  fn write_f32(&mut self, value: f32) -> IOResult<()> {
    self.write_all(&value.to_le_bytes())
  }
}

/// Copies `value` into a zero padded fixed-size field. The last byte always stays NUL,
/// longer strings are cut off.
pub fn to_fixed_string<const N: usize>(value: &str) -> [u8; N] {
  let mut field = [0u8; N];
  let len = value.len().min(N.saturating_sub(1));
  field[..len].copy_from_slice(&value.as_bytes()[..len]);
  field
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use super::*;
  use crate::PrimitiveRead;

  #[test]
  fn written_values_read_back() {
    let mut data = Vec::new();
    data.write_i32(-7).unwrap();
    data.write_f32(0.25).unwrap();
    data.write_u16(0x0302).unwrap();
    assert_eq!(data.len(), 10);

    let mut cursor = Cursor::new(data);
    assert_eq!(cursor.read_i32().unwrap(), -7);
    assert_eq!(cursor.read_f32().unwrap(), 0.25);
    assert_eq!(cursor.read_u8().unwrap(), 2);
    assert_eq!(cursor.read_u8().unwrap(), 3);
  }

  #[test]
  fn fixed_string_keeps_terminator() {
    let field: [u8; 4] = to_fixed_string("abcdef");
    assert_eq!(&field, b"abc\0");
    let field: [u8; 8] = to_fixed_string("ab");
    assert_eq!(&field, b"ab\0\0\0\0\0\0");
  }
}
