//! AMF0 encoder and decoder
//!
//! AMF0 is the original Action Message Format used by ActionScript 1.0/2.0.
//! Reference: AMF0 File Format Specification (amf0-file-format-specification.pdf)
//!
//! Type Markers:
//! ```text
//! 0x00 - Number (IEEE 754 double)
//! 0x01 - Boolean
//! 0x02 - String (UTF-8, 16-bit length prefix)
//! 0x03 - Object (key-value pairs until 0x000009)
//! 0x04 - MovieClip (reserved, not supported)
//! 0x05 - Null
//! 0x06 - Undefined
//! 0x07 - Reference (16-bit index)
//! 0x08 - ECMA Array (associative array)
//! 0x09 - Object End (0x000009 sequence)
//! 0x0A - Strict Array (dense array)
//! 0x0B - Date (double + timezone)
//! 0x0C - Long String (UTF-8, 32-bit length prefix)
//! 0x0D - Unsupported
//! 0x0E - RecordSet (reserved, not supported)
//! 0x0F - XML Document
//! 0x10 - Typed Object (class name + properties)
//! 0x11 - AVM+ (switch to AMF3)
//! ```
//!
//! Objects, arrays, typed objects and dates share one reference table.

use std::cell::RefCell;
use std::rc::Rc;

use bytes::Bytes;

use crate::byte_array::{ByteArray, ByteArrayConfig};
use crate::error::{AmfError, RefTable, Result};
use crate::registry::ClassRegistry;

use super::amf3::{Amf3Decoder, Amf3Encoder};
use super::references::{DecodeTable, ObjectTable, Slot};
use super::value::{AmfArray, AmfObject, AmfValue, Properties};
use super::ObjectEncoding;

// AMF0 type markers
const MARKER_NUMBER: u8 = 0x00;
const MARKER_BOOLEAN: u8 = 0x01;
const MARKER_STRING: u8 = 0x02;
const MARKER_OBJECT: u8 = 0x03;
const MARKER_NULL: u8 = 0x05;
const MARKER_UNDEFINED: u8 = 0x06;
const MARKER_REFERENCE: u8 = 0x07;
const MARKER_ECMA_ARRAY: u8 = 0x08;
const MARKER_OBJECT_END: u8 = 0x09;
const MARKER_STRICT_ARRAY: u8 = 0x0A;
const MARKER_DATE: u8 = 0x0B;
const MARKER_LONG_STRING: u8 = 0x0C;
const MARKER_UNSUPPORTED: u8 = 0x0D;
const MARKER_XML_DOCUMENT: u8 = 0x0F;
const MARKER_TYPED_OBJECT: u8 = 0x10;
const MARKER_AVMPLUS: u8 = 0x11;

/// Longest string written with the short string marker
const MAX_SHORT_STRING: usize = 0xFFFF;

/// AMF0 decoder
///
/// Reads one top-level value per [`decode`](Amf0Decoder::decode) call with
/// the reference table it was created with.
pub struct Amf0Decoder<'a> {
    input: &'a mut ByteArray,
    registry: &'a ClassRegistry,
    /// Reference table for objects, arrays and dates
    references: DecodeTable<AmfValue>,
    /// Current nesting depth
    depth: usize,
    max_depth: usize,
}

impl<'a> Amf0Decoder<'a> {
    /// Create a decoder reading from the current position of `input`
    pub fn new(input: &'a mut ByteArray, registry: &'a ClassRegistry) -> Self {
        let max_depth = input.max_depth();
        Self {
            input,
            registry,
            references: DecodeTable::new(RefTable::Object),
            depth: 0,
            max_depth,
        }
    }

    /// Decode a single AMF0 value
    pub fn decode(&mut self) -> Result<AmfValue> {
        self.depth += 1;
        if self.depth > self.max_depth {
            self.depth -= 1;
            return Err(AmfError::NestingTooDeep);
        }

        let result = self
            .input
            .read_u8()
            .and_then(|marker| self.decode_value(marker));
        self.depth -= 1;
        result
    }

    fn decode_value(&mut self, marker: u8) -> Result<AmfValue> {
        match marker {
            MARKER_NUMBER => Ok(AmfValue::Number(self.input.read_f64()?)),
            MARKER_BOOLEAN => Ok(AmfValue::Boolean(self.input.read_bool()?)),
            MARKER_STRING => Ok(AmfValue::String(self.input.read_utf()?)),
            MARKER_OBJECT => self.decode_object(AmfObject::new()),
            MARKER_NULL => Ok(AmfValue::Null),
            MARKER_UNDEFINED => Ok(AmfValue::Undefined),
            MARKER_REFERENCE => self.decode_reference(),
            MARKER_ECMA_ARRAY => self.decode_ecma_array(),
            MARKER_STRICT_ARRAY => self.decode_strict_array(),
            MARKER_DATE => self.decode_date(),
            MARKER_LONG_STRING => Ok(AmfValue::String(self.read_utf8_long()?)),
            MARKER_UNSUPPORTED => Ok(AmfValue::Undefined),
            MARKER_XML_DOCUMENT => Ok(AmfValue::XmlDocument(self.read_utf8_long()?)),
            MARKER_TYPED_OBJECT => self.decode_typed_object(),
            MARKER_AVMPLUS => self.decode_avmplus(),
            _ => Err(AmfError::UnknownMarker(marker)),
        }
    }

    /// Read key/value pairs up to the object end marker
    fn decode_properties(&mut self) -> Result<Properties> {
        let mut properties = Properties::new();
        loop {
            let key = self.input.read_utf()?;
            if key.is_empty() {
                let end_marker = self.input.read_u8()?;
                if end_marker != MARKER_OBJECT_END {
                    return Err(AmfError::InvalidObjectEnd);
                }
                return Ok(properties);
            }

            let value = self.decode()?;
            properties.insert(key, value);
        }
    }

    fn decode_object(&mut self, instance: AmfObject) -> Result<AmfValue> {
        // Register before the body so members can refer back to the object
        let object = Rc::new(RefCell::new(instance));
        self.references.push(AmfValue::Object(Rc::clone(&object)));

        let properties = self.decode_properties()?;
        object.borrow_mut().properties.extend(properties);
        Ok(AmfValue::Object(object))
    }

    fn decode_typed_object(&mut self) -> Result<AmfValue> {
        let alias = self.input.read_utf()?;
        let instance = match self.registry.descriptor(&alias) {
            Some(descriptor) => descriptor.instantiate(),
            None => {
                tracing::debug!(
                    alias = %alias,
                    "No type registered for alias, decoding as anonymous object"
                );
                AmfObject::new()
            }
        };
        self.decode_object(instance)
    }

    fn decode_ecma_array(&mut self) -> Result<AmfValue> {
        // Count hint, not always accurate; the terminator is authoritative
        let _count = self.input.read_u32()?;

        let array = Rc::new(RefCell::new(AmfArray::new()));
        self.references.push(AmfValue::Array(Rc::clone(&array)));

        let (dense, named) = split_dense(self.decode_properties()?);
        {
            let mut array = array.borrow_mut();
            array.dense = dense;
            array.named = named;
        }
        Ok(AmfValue::Array(array))
    }

    fn decode_strict_array(&mut self) -> Result<AmfValue> {
        let count = self.input.read_u32()? as usize;

        let array = Rc::new(RefCell::new(AmfArray::dense(Vec::with_capacity(
            count.min(1024), // Cap initial allocation
        ))));
        self.references.push(AmfValue::Array(Rc::clone(&array)));

        for _ in 0..count {
            let element = self.decode()?;
            array.borrow_mut().dense.push(element);
        }
        Ok(AmfValue::Array(array))
    }

    fn decode_date(&mut self) -> Result<AmfValue> {
        let timestamp = self.input.read_f64()?;
        let _timezone = self.input.read_i16()?; // Timezone offset (deprecated, always 0)

        let date = AmfValue::Date(timestamp);
        self.references.push(date.clone());
        Ok(date)
    }

    fn decode_reference(&mut self) -> Result<AmfValue> {
        let index = self.input.read_u16()? as usize;
        self.references.get(index).cloned()
    }

    fn decode_avmplus(&mut self) -> Result<AmfValue> {
        tracing::trace!(position = self.input.position(), "AVM+ marker, switching to AMF3");
        self.input.set_object_encoding(ObjectEncoding::Amf3);
        Amf3Decoder::new(&mut *self.input, self.registry)
            .with_depth(self.depth)
            .decode()
    }

    /// Read UTF-8 string with 32-bit length prefix
    fn read_utf8_long(&mut self) -> Result<String> {
        let len = self.input.read_u32()? as usize;
        self.input.read_utf_bytes(len)
    }
}

/// Move the keys "0", "1", ... (contiguous from zero) into a dense part
///
/// An ECMA array has one key space, so a named entry keyed by the next dense
/// index cannot be told apart from a dense element. Such entries come back
/// dense, and an `AmfArray` that had them named does not survive an AMF0
/// round trip unchanged.
fn split_dense(mut named: Properties) -> (Vec<AmfValue>, Properties) {
    let dense_len = (0usize..)
        .take_while(|index| named.contains_key(index.to_string().as_str()))
        .count();
    if dense_len == 0 {
        return (Vec::new(), named);
    }

    let dense = (0..dense_len)
        .filter_map(|index| named.get(index.to_string().as_str()).cloned())
        .collect();
    named.retain(|key, _| !is_dense_index(key, dense_len));
    (dense, named)
}

fn is_dense_index(key: &str, dense_len: usize) -> bool {
    match key.parse::<usize>() {
        Ok(index) => index < dense_len && index.to_string() == key,
        Err(_) => false,
    }
}

/// AMF0 encoder
pub struct Amf0Encoder<'a> {
    out: &'a mut ByteArray,
    registry: &'a ClassRegistry,
    references: ObjectTable,
    depth: usize,
    max_depth: usize,
}

impl<'a> Amf0Encoder<'a> {
    /// Create an encoder writing at the current position of `out`
    pub fn new(out: &'a mut ByteArray, registry: &'a ClassRegistry) -> Self {
        let max_depth = out.max_depth();
        Self {
            out,
            registry,
            references: ObjectTable::new(),
            depth: 0,
            max_depth,
        }
    }

    /// Encode a single AMF0 value
    pub fn encode(&mut self, value: &AmfValue) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            self.depth -= 1;
            return Err(AmfError::NestingTooDeep);
        }
        let result = self.encode_value(value);
        self.depth -= 1;
        result
    }

    /// Write the AVM+ marker and `value` in AMF3
    ///
    /// The embedded value gets its own AMF3 reference tables.
    pub fn encode_avmplus(&mut self, value: &AmfValue) -> Result<()> {
        self.out.write_u8(MARKER_AVMPLUS);
        Amf3Encoder::new(&mut *self.out, self.registry)
            .with_depth(self.depth)
            .encode(value)
    }

    fn encode_value(&mut self, value: &AmfValue) -> Result<()> {
        match value {
            AmfValue::Null => {
                self.out.write_u8(MARKER_NULL);
            }
            AmfValue::Undefined => {
                self.out.write_u8(MARKER_UNDEFINED);
            }
            AmfValue::Boolean(b) => {
                self.out.write_u8(MARKER_BOOLEAN);
                self.out.write_bool(*b);
            }
            AmfValue::Number(n) => {
                self.out.write_u8(MARKER_NUMBER);
                self.out.write_f64(*n);
            }
            AmfValue::Integer(i) => {
                // AMF0 doesn't have integer type, encode as number
                self.out.write_u8(MARKER_NUMBER);
                self.out.write_f64(f64::from(*i));
            }
            AmfValue::BigInt(n) => self.encode_string(&n.to_string()),
            AmfValue::String(s) => self.encode_string(s),
            AmfValue::Date(timestamp) => {
                self.references.reserve();
                self.out.write_u8(MARKER_DATE);
                self.out.write_f64(*timestamp);
                self.out.write_i16(0); // Timezone (deprecated)
            }
            AmfValue::Xml(s) | AmfValue::XmlDocument(s) => {
                self.out.write_u8(MARKER_XML_DOCUMENT);
                self.write_utf8_long(s)?;
            }
            AmfValue::Array(array) => {
                if !self.write_reference(value) {
                    self.encode_array(&array.borrow())?;
                }
            }
            AmfValue::Set(set) => {
                if !self.write_reference(value) {
                    let set = set.borrow();
                    self.write_strict_array_header(set.len())?;
                    for item in set.iter() {
                        self.encode(item)?;
                    }
                }
            }
            AmfValue::Object(object) => {
                if !self.write_reference(value) {
                    self.encode_object(&object.borrow())?;
                }
            }
            AmfValue::Vector(_) => {
                return Err(AmfError::UnrepresentableValue("vector has no AMF0 encoding"));
            }
            AmfValue::Dictionary(_) => {
                return Err(AmfError::UnrepresentableValue("dictionary has no AMF0 encoding"));
            }
            AmfValue::ByteArray(_) => {
                return Err(AmfError::UnrepresentableValue("byte array has no AMF0 encoding"));
            }
        }
        Ok(())
    }

    fn encode_string(&mut self, s: &str) {
        if s.len() > MAX_SHORT_STRING {
            self.out.write_u8(MARKER_LONG_STRING);
            self.out.write_u32(s.len() as u32);
        } else {
            self.out.write_u8(MARKER_STRING);
            self.out.write_u16(s.len() as u16);
        }
        self.out.write_utf_bytes(s);
    }

    /// Emit a reference if `value` was already written and its index fits in
    /// 16 bits; otherwise claim a new index and return false
    fn write_reference(&mut self, value: &AmfValue) -> bool {
        match self.references.find_or_insert(value) {
            Slot::Existing(index) => match u16::try_from(index) {
                Ok(index) => {
                    self.out.write_u8(MARKER_REFERENCE);
                    self.out.write_u16(index);
                    true
                }
                Err(_) => {
                    // Written inline again, so the decoder allocates a slot too
                    self.references.reserve();
                    false
                }
            },
            Slot::New(_) => false,
        }
    }

    fn write_strict_array_header(&mut self, len: usize) -> Result<()> {
        let count = u32::try_from(len)
            .map_err(|_| AmfError::UnrepresentableValue("array longer than u32::MAX"))?;
        self.out.write_u8(MARKER_STRICT_ARRAY);
        self.out.write_u32(count);
        Ok(())
    }

    fn encode_array(&mut self, array: &AmfArray) -> Result<()> {
        if array.is_dense() {
            self.write_strict_array_header(array.dense.len())?;
            for element in &array.dense {
                self.encode(element)?;
            }
            return Ok(());
        }

        let count = u32::try_from(array.dense.len() + array.named.len())
            .map_err(|_| AmfError::UnrepresentableValue("array longer than u32::MAX"))?;
        self.out.write_u8(MARKER_ECMA_ARRAY);
        self.out.write_u32(count);
        for (index, element) in array.dense.iter().enumerate() {
            self.write_key(&index.to_string())?;
            self.encode(element)?;
        }
        for (key, val) in &array.named {
            self.write_key(key)?;
            self.encode(val)?;
        }
        self.write_object_end();
        Ok(())
    }

    fn encode_object(&mut self, object: &AmfObject) -> Result<()> {
        let alias = object
            .type_name
            .as_deref()
            .and_then(|type_name| self.registry.lookup_type(type_name))
            .map(|(alias, _)| alias);

        match alias {
            Some(alias) => {
                self.out.write_u8(MARKER_TYPED_OBJECT);
                self.write_key(&alias)?;
            }
            None => self.out.write_u8(MARKER_OBJECT),
        }
        for (key, val) in &object.properties {
            self.write_key(key)?;
            self.encode(val)?;
        }
        self.write_object_end();
        Ok(())
    }

    /// Write a property name: UTF-8 with 16-bit length prefix, no marker
    fn write_key(&mut self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(AmfError::UnrepresentableValue("empty property name"));
        }
        self.out.write_utf(key)
    }

    fn write_object_end(&mut self) {
        self.out.write_u16(0); // Empty key
        self.out.write_u8(MARKER_OBJECT_END);
    }

    fn write_utf8_long(&mut self, s: &str) -> Result<()> {
        let len = u32::try_from(s.len())
            .map_err(|_| AmfError::UnrepresentableValue("string longer than u32::MAX"))?;
        self.out.write_u32(len);
        self.out.write_utf_bytes(s);
        Ok(())
    }
}

fn amf0_array() -> ByteArray {
    ByteArray::with_config(ByteArrayConfig::new().object_encoding(ObjectEncoding::Amf0))
}

/// Convenience function to encode a single value
pub fn encode(value: &AmfValue) -> Result<Bytes> {
    let mut ba = amf0_array();
    ba.write_object(value)?;
    Ok(ba.into_bytes())
}

/// Convenience function to encode multiple values, each with fresh tables
pub fn encode_all(values: &[AmfValue]) -> Result<Bytes> {
    let mut ba = amf0_array();
    for value in values {
        ba.write_object(value)?;
    }
    Ok(ba.into_bytes())
}

/// Convenience function to decode a single value
pub fn decode(data: &[u8]) -> Result<AmfValue> {
    let mut ba = ByteArray::from(data);
    ba.set_object_encoding(ObjectEncoding::Amf0);
    ba.read_object()
}

/// Convenience function to decode all values
///
/// An AVM+ marker switches the remaining values to AMF3.
pub fn decode_all(data: &[u8]) -> Result<Vec<AmfValue>> {
    let mut ba = ByteArray::from(data);
    ba.set_object_encoding(ObjectEncoding::Amf0);

    let mut values = Vec::new();
    while ba.bytes_available() > 0 {
        values.push(ba.read_object()?);
    }
    Ok(values)
}
