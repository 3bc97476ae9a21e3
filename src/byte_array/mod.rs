//! Growable byte buffer with a read/write cursor
//!
//! `ByteArray` is the stream every codec reads from and writes to. All
//! multi-byte primitives are big-endian. Writes land at the current position,
//! overwriting existing bytes and growing the buffer as needed; reads consume
//! from the current position and fail with
//! [`AmfError::TruncatedInput`] instead of reading past the end.
//!
//! `write_object`/`read_object` dispatch to the AMF0 or AMF3 codec according
//! to [`object_encoding`](ByteArray::object_encoding). Reading an AMF0 AVM+
//! marker switches the array to AMF3 for the rest of the stream.
//!
//! ```
//! use amf_rs::{AmfObject, AmfValue, ByteArray};
//!
//! let mut ba = ByteArray::new();
//! ba.write_object(&AmfValue::object(AmfObject::new().with("name", "Daan")))?;
//! ba.set_position(0);
//! let value = ba.read_object()?;
//! assert_eq!(value.get_string("name").as_deref(), Some("Daan"));
//! # Ok::<(), amf_rs::AmfError>(())
//! ```

pub mod config;

pub use config::ByteArrayConfig;

use std::sync::Arc;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::amf::{Amf0Decoder, Amf0Encoder, Amf3Decoder, Amf3Encoder, AmfValue, ObjectEncoding};
use crate::error::{AmfError, Result};
use crate::registry::ClassRegistry;

/// Byte buffer with a cursor and an active object encoding
pub struct ByteArray {
    data: BytesMut,
    position: usize,
    object_encoding: ObjectEncoding,
    max_depth: usize,
    registry: Arc<ClassRegistry>,
}

impl ByteArray {
    /// Create an empty AMF3 byte array using the global class registry
    pub fn new() -> Self {
        Self::with_config(ByteArrayConfig::default())
    }

    /// Create an empty byte array with explicit settings
    pub fn with_config(config: ByteArrayConfig) -> Self {
        Self {
            data: BytesMut::with_capacity(config.initial_capacity),
            position: 0,
            object_encoding: config.object_encoding,
            max_depth: config.max_depth,
            registry: ClassRegistry::global(),
        }
    }

    /// Use `registry` instead of the global class registry
    pub fn with_registry(mut self, registry: Arc<ClassRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &Arc<ClassRegistry> {
        &self.registry
    }

    pub fn set_registry(&mut self, registry: Arc<ClassRegistry>) {
        self.registry = registry;
    }

    pub fn object_encoding(&self) -> ObjectEncoding {
        self.object_encoding
    }

    pub fn set_object_encoding(&mut self, encoding: ObjectEncoding) {
        self.object_encoding = encoding;
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Total length of the buffer
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Move the cursor; positions past the end make the next read fail and
    /// the next write zero-fill the gap
    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    /// Bytes left between the cursor and the end of the buffer
    pub fn bytes_available(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Drop all content and rewind
    pub fn clear(&mut self) {
        self.data.clear();
        self.position = 0;
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Copy of the whole buffer
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.data)
    }

    pub fn into_bytes(self) -> Bytes {
        self.data.freeze()
    }

    // ---- writing ----

    /// Write raw bytes at the cursor
    pub fn write_bytes(&mut self, src: &[u8]) {
        if self.position == self.data.len() {
            self.data.put_slice(src);
        } else {
            let end = self.position + src.len();
            if end > self.data.len() {
                self.data.resize(end, 0);
            }
            self.data[self.position..end].copy_from_slice(src);
        }
        self.position += src.len();
    }

    pub fn write_u8(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.write_bytes(&value.to_be_bytes());
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    pub fn write_u16(&mut self, value: u16) {
        self.write_bytes(&value.to_be_bytes());
    }

    pub fn write_i16(&mut self, value: i16) {
        self.write_bytes(&value.to_be_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_be_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.write_bytes(&value.to_be_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.write_bytes(&value.to_be_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.write_bytes(&value.to_be_bytes());
    }

    /// Write UTF-8 with a 16-bit length prefix
    pub fn write_utf(&mut self, s: &str) -> Result<()> {
        let len = u16::try_from(s.len())
            .map_err(|_| AmfError::UnrepresentableValue("string longer than 65535 bytes"))?;
        self.write_u16(len);
        self.write_bytes(s.as_bytes());
        Ok(())
    }

    /// Write UTF-8 without a length prefix
    pub fn write_utf_bytes(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    // ---- reading ----

    fn take(&mut self, len: usize) -> Result<&[u8]> {
        let available = self.bytes_available();
        if available < len {
            return Err(AmfError::truncated(len, available));
        }
        let start = self.position;
        self.position += len;
        Ok(&self.data[start..start + len])
    }

    /// Read `len` raw bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(self.take(len)?))
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?.get_u8())
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.take(1)?.get_i8())
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(self.take(2)?.get_u16())
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.take(2)?.get_i16())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self.take(4)?.get_u32())
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.take(4)?.get_i32())
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(self.take(4)?.get_f32())
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(self.take(8)?.get_f64())
    }

    /// Read UTF-8 with a 16-bit length prefix
    pub fn read_utf(&mut self) -> Result<String> {
        let len = self.read_u16()? as usize;
        self.read_utf_bytes(len)
    }

    /// Read `len` bytes of UTF-8
    pub fn read_utf_bytes(&mut self, len: usize) -> Result<String> {
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| AmfError::InvalidUtf8)
    }

    // ---- objects ----

    /// Encode one value with the active object encoding
    ///
    /// Each call starts with empty reference tables.
    pub fn write_object(&mut self, value: &AmfValue) -> Result<()> {
        let registry = Arc::clone(&self.registry);
        match self.object_encoding {
            ObjectEncoding::Amf0 => Amf0Encoder::new(self, &registry).encode(value),
            ObjectEncoding::Amf3 => Amf3Encoder::new(self, &registry).encode(value),
        }
    }

    /// Write the AMF0 AVM+ marker followed by `value` in AMF3
    ///
    /// This is how an AMF3 value is embedded in an AMF0 stream. The array's
    /// own object encoding is left untouched.
    pub fn write_avmplus_object(&mut self, value: &AmfValue) -> Result<()> {
        let registry = Arc::clone(&self.registry);
        Amf0Encoder::new(self, &registry).encode_avmplus(value)
    }

    /// Decode one value with the active object encoding
    ///
    /// Each call starts with empty reference tables. On error the position is
    /// left where decoding stopped.
    pub fn read_object(&mut self) -> Result<AmfValue> {
        let registry = Arc::clone(&self.registry);
        match self.object_encoding {
            ObjectEncoding::Amf0 => Amf0Decoder::new(self, &registry).decode(),
            ObjectEncoding::Amf3 => Amf3Decoder::new(self, &registry).decode(),
        }
    }
}

impl Default for ByteArray {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ByteArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteArray")
            .field("len", &self.data.len())
            .field("position", &self.position)
            .field("object_encoding", &self.object_encoding)
            .finish_non_exhaustive()
    }
}

impl From<&[u8]> for ByteArray {
    fn from(data: &[u8]) -> Self {
        let mut ba = ByteArray::with_config(ByteArrayConfig::default().initial_capacity(data.len()));
        ba.data.put_slice(data);
        ba
    }
}

impl From<Vec<u8>> for ByteArray {
    fn from(data: Vec<u8>) -> Self {
        ByteArray::from(data.as_slice())
    }
}

impl From<Bytes> for ByteArray {
    fn from(data: Bytes) -> Self {
        ByteArray::from(data.as_ref())
    }
}
