//! Byte-level encoding helpers for the binary module format.

use crate::errors::errors::{unsupported, Error};

pub fn encode_unsigned(mut value: u32) -> Vec<u8> {
    let mut bytes = vec![];
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        bytes.push(byte);
        if value == 0 {
            break;
        }
    }
    bytes
}

pub fn encode_signed(value: i32) -> Vec<u8> {
    encode_signed64(i64::from(value))
}

pub fn encode_signed64(mut value: i64) -> Vec<u8> {
    let mut bytes = vec![];
    loop {
        let byte = (value & 0x7F) as u8;
        // Arithmetic shift keeps the sign.
        value >>= 7;
        let done = (value == 0 && byte & 0x40 == 0) || (value == -1 && byte & 0x40 != 0);
        if done {
            bytes.push(byte);
            break;
        }
        bytes.push(byte | 0x80);
    }
    bytes
}

/// Accumulates the bytes of a module or of one of its sections.
#[derive(Debug, Default, Clone)]
pub struct BinaryWriter {
    pub bytes: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        BinaryWriter::default()
    }

    pub fn byte(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    pub fn raw(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    pub fn unsigned(&mut self, value: u32) {
        self.raw(&encode_unsigned(value));
    }

    pub fn signed(&mut self, value: i32) {
        self.raw(&encode_signed(value));
    }

    pub fn signed64(&mut self, value: i64) {
        self.raw(&encode_signed64(value));
    }

    pub fn float32(&mut self, value: f32) {
        self.raw(&value.to_le_bytes());
    }

    pub fn float64(&mut self, value: f64) {
        self.raw(&value.to_le_bytes());
    }

    /// Counts and lengths are written as ULEB128 and must fit in a `u32`.
    pub fn length(&mut self, length: usize) -> Result<(), Error> {
        let length = u32::try_from(length).map_err(|_| {
            unsupported("lengths above 4GiB", format!("length {}", length))
        })?;
        self.unsigned(length);
        Ok(())
    }

    pub fn name(&mut self, name: &str) -> Result<(), Error> {
        self.length(name.len())?;
        self.raw(name.as_bytes());
        Ok(())
    }

    /// A vector: its element count followed by every element.
    pub fn vector<T>(
        &mut self,
        items: &[T],
        mut write: impl FnMut(&mut BinaryWriter, &T) -> Result<(), Error>,
    ) -> Result<(), Error> {
        self.length(items.len())?;
        for item in items {
            write(self, item)?;
        }
        Ok(())
    }

    /// Appends `contents` prefixed by its byte length.
    pub fn sized(&mut self, contents: BinaryWriter) -> Result<(), Error> {
        self.length(contents.bytes.len())?;
        self.raw(&contents.bytes);
        Ok(())
    }

    pub fn section(&mut self, id: u8, contents: BinaryWriter) -> Result<(), Error> {
        self.byte(id);
        self.sized(contents)
    }
}
