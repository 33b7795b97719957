use std::io::{self, Read, Seek, SeekFrom, Write};
use std::time::Duration;

pub trait ReadUtil: Read {
    /// Attempts to read an unsigned 8 bit integer from the reader.
    fn read_u8(&mut self) -> io::Result<u8> {
        let mut buf = [0];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// Attempts to read an unsigned 16 bit big endian integer from the reader.
    fn read_be_u16(&mut self) -> io::Result<u16> {
        let mut buf = [0; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Attempts to read an unsigned 32 bit big endian integer from the reader.
    fn read_be_u32(&mut self) -> io::Result<u32> {
        let mut buf = [0; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Attempts to read an unsigned 64 bit big endian integer from the reader.
    fn read_be_u64(&mut self) -> io::Result<u64> {
        let mut buf = [0; 8];
        self.read_exact(&mut buf)?;
        Ok(u64::from_be_bytes(buf))
    }

    /// Attempts to read 8 bit unsigned integers from the reader to a vector of size length.
    fn read_u8_vec(&mut self, len: u64) -> io::Result<Vec<u8>> {
        let mut buf = vec![0; len as usize];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Attempts to read a utf-8 string from the reader.
    fn read_utf8(&mut self, len: u64) -> crate::Result<String> {
        let data = self.read_u8_vec(len)?;

        Ok(String::from_utf8(data)?)
    }

    /// Attempts to read a latin-1 (ISO 8859-1) string from the reader. Every byte maps directly
    /// to the unicode code point of the same value.
    fn read_latin1(&mut self, len: u64) -> crate::Result<String> {
        let data = self.read_u8_vec(len)?;

        Ok(data.into_iter().map(char::from).collect())
    }

    /// Attempts to read a big endian utf-16 string from the reader.
    fn read_be_utf16(&mut self, len: u64) -> crate::Result<String> {
        let buf = self.read_u8_vec(len)?;

        let data: Vec<u16> =
            buf.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect();

        Ok(String::from_utf16(&data)?)
    }
}

impl<T: Read> ReadUtil for T {}

pub trait SeekUtil: Seek {
    /// Attempts to read the remaining stream length and returns to the starting position.
    #[allow(dead_code)]
    fn remaining_stream_len(&mut self) -> io::Result<u64> {
        let current_pos = self.stream_position()?;
        let complete_len = self.seek(SeekFrom::End(0))?;
        let len = complete_len - current_pos;

        self.seek(SeekFrom::Start(current_pos))?;

        Ok(len)
    }

    fn skip(&mut self, offset: i64) -> io::Result<()> {
        self.seek(SeekFrom::Current(offset))?;
        Ok(())
    }
}

impl<T: Seek> SeekUtil for T {}

pub trait WriteUtil: Write {
    fn write_u8(&mut self, val: u8) -> io::Result<()> {
        self.write_all(&[val])
    }

    fn write_be_u16(&mut self, val: u16) -> io::Result<()> {
        self.write_all(&val.to_be_bytes())
    }

    fn write_be_u32(&mut self, val: u32) -> io::Result<()> {
        self.write_all(&val.to_be_bytes())
    }

    fn write_be_u64(&mut self, val: u64) -> io::Result<()> {
        self.write_all(&val.to_be_bytes())
    }

    fn write_utf8(&mut self, string: &str) -> io::Result<()> {
        self.write_all(string.as_bytes())
    }

    /// Writes a latin-1 (ISO 8859-1) string. Code points above U+00FF are replaced by `?`.
    fn write_latin1(&mut self, string: &str) -> io::Result<()> {
        for c in string.chars() {
            let b = if (c as u32) < 0x100 { c as u8 } else { b'?' };
            self.write_all(&[b])?;
        }
        Ok(())
    }

    fn write_be_utf16(&mut self, string: &str) -> io::Result<()> {
        for c in string.encode_utf16() {
            self.write_be_u16(c)?;
        }
        Ok(())
    }
}

impl<T: Write> WriteUtil for T {}

pub fn scale_duration(timescale: u32, duration: u64) -> Duration {
    let secs = duration / timescale as u64;
    let nanos = (duration % timescale as u64) * 1_000_000_000 / timescale as u64;
    Duration::new(secs, nanos as u32)
}

pub fn unscale_duration(timescale: u32, duration: Duration) -> u64 {
    let secs = duration.as_secs() * timescale as u64;
    let nanos = duration.subsec_nanos() as u64 * timescale as u64 / 1_000_000_000;
    secs + nanos
}

/// Attempts to read a big endian integer at the specified index from a byte slice.
macro_rules! be_int {
    ($bytes:expr, $index:expr, $type:ty) => {{
        const SIZE: usize = std::mem::size_of::<$type>();
        let bytes_start = ($index);
        let bytes_end = ($index) + SIZE;

        if $bytes.len() < bytes_end {
            None
        } else {
            let be_bytes = <[u8; SIZE]>::try_from(&$bytes[bytes_start..bytes_end]);

            match be_bytes {
                Ok(b) => Some(<$type>::from_be_bytes(b)),
                Err(_) => None,
            }
        }
    }};
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn be_int() {
        let bytes = [0x00, 0x00, 0x00, 0x00, 0x2D, 0x34, 0xD0, 0x5E];
        let int = be_int!(bytes, 4, u32);
        assert_eq!(int, Some(758435934u32));
    }

    #[test]
    fn latin1_round_trip() {
        let mut buf = Vec::new();
        buf.write_latin1("café").unwrap();
        assert_eq!(buf, [b'c', b'a', b'f', 0xe9]);

        let read = (&buf[..]).read_latin1(4).unwrap();
        assert_eq!(read, "café");
    }

    #[test]
    fn duration_scaling() {
        let duration = scale_duration(1000, 1139);
        assert_eq!(duration, Duration::from_millis(1139));
        assert_eq!(unscale_duration(1000, duration), 1139);

        let duration = scale_duration(44100, 44100 * 3);
        assert_eq!(duration, Duration::from_secs(3));
    }
}
