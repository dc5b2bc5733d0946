use std::io::{Read, Result as IOResult, Seek, SeekFrom};

/// Length of a fixed-size, zero padded string field up to (not including) the first NUL.
pub fn fixed_string_len(data: &[u8]) -> usize {
  data.iter().position(|c| *c == 0).unwrap_or(data.len())
}

/// Decodes a zero padded string field. Bytes that are not valid UTF-8 are replaced
/// instead of failing because legacy tools wrote names in arbitrary code pages.
pub fn fixed_string_lossy(data: &[u8]) -> String {
  String::from_utf8_lossy(&data[..fixed_string_len(data)]).into_owned()
}

pub trait RawDataRead {
  fn read_data_exact(&mut self, len: usize) -> IOResult<Box<[u8]>>;
  fn read_fixed<const N: usize>(&mut self) -> IOResult<[u8; N]>;
}

impl<T: Read + ?Sized> RawDataRead for T {
  fn read_data_exact(&mut self, len: usize) -> IOResult<Box<[u8]>> {
    let mut buffer = vec![0u8; len];
    self.read_exact(&mut buffer)?;
    Ok(buffer.into_boxed_slice())
  }

  fn read_fixed<const N: usize>(&mut self) -> IOResult<[u8; N]> {
    let mut buffer = [0u8; N];
    self.read_exact(&mut buffer)?;
    Ok(buffer)
  }
}

pub trait ReadEntireSeekableFile {
  fn read_seekable_to_end(&mut self) -> IOResult<Box<[u8]>>;
}

// The standard library read_to_end function does a lot of small reads because it can't rely on Seek.
impl<T: RawDataRead + Seek + ?Sized + Unpin> ReadEntireSeekableFile for T {
  fn read_seekable_to_end(&mut self) -> IOResult<Box<[u8]>> {
    let len = self.seek(SeekFrom::End(0))? as usize;
    let _ = self.seek(SeekFrom::Start(0))?;
    self.read_data_exact(len)
  }
}

pub trait PrimitiveRead {
  fn read_u8(&mut self) -> IOResult<u8>;
  fn read_u16(&mut self) -> IOResult<u16>;
  fn read_u32(&mut self) -> IOResult<u32>;
  fn read_i8(&mut self) -> IOResult<i8>;
  fn read_i16(&mut self) -> IOResult<i16>;
  fn read_i32(&mut self) -> IOResult<i32>;
  fn read_f32(&mut self) -> IOResult<f32>;
}

impl<T: Read + ?Sized> PrimitiveRead for T {
  fn read_u8(&mut self) -> IOResult<u8> {
    Ok(u8::from_le_bytes(self.read_fixed()?))
  }

  fn read_u16(&mut self) -> IOResult<u16> {
    Ok(u16::from_le_bytes(self.read_fixed()?))
  }

  fn read_u32(&mut self) -> IOResult<u32> {
    Ok(u32::from_le_bytes(self.read_fixed()?))
  }

  fn read_i8(&mut self) -> IOResult<i8> {
    Ok(i8::from_le_bytes(self.read_fixed()?))
  }

  fn read_i16(&mut self) -> IOResult<i16> {
    Ok(i16::from_le_bytes(self.read_fixed()?))
  }

  fn read_i32(&mut self) -> IOResult<i32> {
    Ok(i32::from_le_bytes(self.read_fixed()?))
  }

  fn read_f32(&mut self) -> IOResult<f32> {
    Ok(f32::from_le_bytes(self.read_fixed()?))
  }
}
