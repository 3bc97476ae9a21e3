//! AMF3 encoder and decoder
//!
//! AMF3 is the ActionScript 3.0 serialization format. Compared to AMF0 it
//! adds a 29-bit integer type, string and trait reference tables, typed
//! vectors, dictionaries and byte arrays.
//! Reference: AMF3 File Format Specification (amf3-file-format-spec.pdf)
//!
//! Type Markers:
//! ```text
//! 0x00 - Undefined
//! 0x01 - Null
//! 0x02 - False
//! 0x03 - True
//! 0x04 - Integer (U29, signed 29-bit)
//! 0x05 - Double (IEEE 754)
//! 0x06 - String (U29 length/ref + UTF-8)
//! 0x07 - XML Document (legacy)
//! 0x08 - Date (U29 ref + double)
//! 0x09 - Array (U29 dense count, assoc pairs, dense values)
//! 0x0A - Object (U29 trait/ref, sealed values, dynamic pairs)
//! 0x0B - XML (E4X)
//! 0x0C - ByteArray (U29 length + bytes)
//! 0x0D - Vector<int>
//! 0x0E - Vector<uint>
//! 0x0F - Vector<Number>
//! 0x10 - Vector<Object>
//! 0x11 - Dictionary
//! ```
//!
//! Every complex value starts with a U29 header whose low bit is 0 for a
//! reference into a table and 1 for an inline value.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::byte_array::ByteArray;
use crate::error::{AmfError, RefTable, Result};
use crate::registry::{ClassRegistry, TypeDescriptor};

use super::references::{DecodeTable, EncodeTable, ObjectTable, Slot};
use super::u29::{self, U29_MAX};
use super::value::{
    AmfArray, AmfDictionary, AmfObject, AmfValue, AmfVector, Shared, VectorElements,
};

// AMF3 type markers
const MARKER_UNDEFINED: u8 = 0x00;
const MARKER_NULL: u8 = 0x01;
const MARKER_FALSE: u8 = 0x02;
const MARKER_TRUE: u8 = 0x03;
const MARKER_INTEGER: u8 = 0x04;
const MARKER_DOUBLE: u8 = 0x05;
const MARKER_STRING: u8 = 0x06;
const MARKER_XML_DOCUMENT: u8 = 0x07;
const MARKER_DATE: u8 = 0x08;
const MARKER_ARRAY: u8 = 0x09;
const MARKER_OBJECT: u8 = 0x0A;
const MARKER_XML: u8 = 0x0B;
const MARKER_BYTE_ARRAY: u8 = 0x0C;
const MARKER_VECTOR_INT: u8 = 0x0D;
const MARKER_VECTOR_UINT: u8 = 0x0E;
const MARKER_VECTOR_DOUBLE: u8 = 0x0F;
const MARKER_VECTOR_OBJECT: u8 = 0x10;
const MARKER_DICTIONARY: u8 = 0x11;

// Trait header flags (after the object-literal bit)
const TRAIT_INLINE: u32 = 0b0010;
const TRAIT_EXTERNALIZABLE: u32 = 0b0100;
const TRAIT_DYNAMIC: u32 = 0b1000;

/// Shape of an AMF3 object
///
/// Objects with equal traits share one trait definition on the wire; later
/// instances point at it through the trait reference table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Trait {
    /// Class alias, empty for anonymous objects
    pub alias: String,
    /// Sealed member names in wire order
    pub sealed: Vec<String>,
    pub dynamic: bool,
    pub externalizable: bool,
}

impl Trait {
    /// Trait of a plain anonymous object
    pub fn anonymous() -> Self {
        Self {
            dynamic: true,
            ..Self::default()
        }
    }

    fn externalizable(alias: String) -> Self {
        Self {
            alias,
            externalizable: true,
            ..Self::default()
        }
    }
}

/// Inline header carrying a count or length
fn inline_header(len: usize) -> Result<u32> {
    u32::try_from(len)
        .ok()
        .filter(|len| *len <= U29_MAX >> 1)
        .map(|len| (len << 1) | 1)
        .ok_or(AmfError::UnrepresentableValue("length exceeds U29 range"))
}

/// Reference header pointing at `index`, shifted past `flag_bits` low bits
fn reference_header(index: usize, flag_bits: u32) -> Result<u32> {
    u32::try_from(index)
        .ok()
        .filter(|index| *index <= U29_MAX >> flag_bits)
        .map(|index| index << flag_bits)
        .ok_or(AmfError::UnrepresentableValue("reference index exceeds U29 range"))
}

/// AMF3 encoder
///
/// One encoder serves one top-level value; its reference tables live exactly
/// as long as it does.
pub struct Amf3Encoder<'a> {
    out: &'a mut ByteArray,
    registry: &'a ClassRegistry,
    strings: EncodeTable<String>,
    objects: ObjectTable,
    traits: EncodeTable<Trait>,
    depth: usize,
    max_depth: usize,
}

impl<'a> Amf3Encoder<'a> {
    /// Create an encoder writing at the current position of `out`
    pub fn new(out: &'a mut ByteArray, registry: &'a ClassRegistry) -> Self {
        let max_depth = out.max_depth();
        Self {
            out,
            registry,
            strings: EncodeTable::new(),
            objects: ObjectTable::new(),
            traits: EncodeTable::new(),
            depth: 0,
            max_depth,
        }
    }

    pub(crate) fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// The underlying byte array, for externalizable hooks writing raw data
    pub fn bytes(&mut self) -> &mut ByteArray {
        &mut *self.out
    }

    /// Encode a single AMF3 value
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

    fn encode_value(&mut self, value: &AmfValue) -> Result<()> {
        match value {
            AmfValue::Undefined => self.out.write_u8(MARKER_UNDEFINED),
            AmfValue::Null => self.out.write_u8(MARKER_NULL),
            AmfValue::Boolean(b) => self.out.write_u8(if *b { MARKER_TRUE } else { MARKER_FALSE }),
            AmfValue::Number(n) => self.encode_number(*n)?,
            AmfValue::Integer(i) => self.encode_number(f64::from(*i))?,
            AmfValue::BigInt(n) => {
                self.out.write_u8(MARKER_STRING);
                self.write_string(&n.to_string())?;
            }
            AmfValue::String(s) => {
                self.out.write_u8(MARKER_STRING);
                self.write_string(s)?;
            }
            AmfValue::Date(millis) => {
                self.out.write_u8(MARKER_DATE);
                self.objects.reserve();
                u29::write_u29(self.out, 1)?;
                self.out.write_f64(*millis);
            }
            AmfValue::Xml(s) => self.encode_xml(MARKER_XML, s)?,
            AmfValue::XmlDocument(s) => self.encode_xml(MARKER_XML_DOCUMENT, s)?,
            AmfValue::Array(array) => {
                self.out.write_u8(MARKER_ARRAY);
                if !self.write_object_reference(value)? {
                    self.encode_array(&array.borrow())?;
                }
            }
            AmfValue::Set(set) => {
                self.out.write_u8(MARKER_ARRAY);
                if !self.write_object_reference(value)? {
                    let set = set.borrow();
                    u29::write_u29(self.out, inline_header(set.len())?)?;
                    self.write_string("")?;
                    for item in set.iter() {
                        self.encode(item)?;
                    }
                }
            }
            AmfValue::Object(object) => {
                self.out.write_u8(MARKER_OBJECT);
                if !self.write_object_reference(value)? {
                    self.encode_object(&object.borrow())?;
                }
            }
            AmfValue::Vector(vector) => {
                let vector = vector.borrow();
                self.out.write_u8(match vector.elements {
                    VectorElements::Int(_) => MARKER_VECTOR_INT,
                    VectorElements::UInt(_) => MARKER_VECTOR_UINT,
                    VectorElements::Double(_) => MARKER_VECTOR_DOUBLE,
                    VectorElements::Object { .. } => MARKER_VECTOR_OBJECT,
                });
                if !self.write_object_reference(value)? {
                    self.encode_vector(&vector)?;
                }
            }
            AmfValue::Dictionary(dictionary) => {
                self.out.write_u8(MARKER_DICTIONARY);
                if !self.write_object_reference(value)? {
                    self.encode_dictionary(&dictionary.borrow())?;
                }
            }
            AmfValue::ByteArray(bytes) => {
                self.out.write_u8(MARKER_BYTE_ARRAY);
                if !self.write_object_reference(value)? {
                    let bytes = bytes.borrow();
                    u29::write_u29(self.out, inline_header(bytes.len())?)?;
                    self.out.write_bytes(&bytes);
                }
            }
        }
        Ok(())
    }

    fn encode_number(&mut self, n: f64) -> Result<()> {
        match u29::int29_from_f64(n) {
            Some(i) => {
                self.out.write_u8(MARKER_INTEGER);
                u29::write_i29(self.out, i)
            }
            None => {
                self.out.write_u8(MARKER_DOUBLE);
                self.out.write_f64(n);
                Ok(())
            }
        }
    }

    fn encode_xml(&mut self, marker: u8, s: &str) -> Result<()> {
        self.out.write_u8(marker);
        self.objects.reserve();
        u29::write_u29(self.out, inline_header(s.len())?)?;
        self.out.write_utf_bytes(s);
        Ok(())
    }

    /// Write a string body (no marker) through the string table
    pub fn write_string(&mut self, s: &str) -> Result<()> {
        if s.is_empty() {
            return u29::write_u29(self.out, 1);
        }
        match self.strings.find_or_insert(s) {
            Slot::Existing(index) => u29::write_u29(self.out, reference_header(index, 1)?),
            Slot::New(_) => {
                u29::write_u29(self.out, inline_header(s.len())?)?;
                self.out.write_utf_bytes(s);
                Ok(())
            }
        }
    }

    /// Emit a reference if `value` was already written; otherwise claim the
    /// next object index and return false so the caller writes the body
    fn write_object_reference(&mut self, value: &AmfValue) -> Result<bool> {
        match self.objects.find_or_insert(value) {
            Slot::Existing(index) => {
                u29::write_u29(self.out, reference_header(index, 1)?)?;
                Ok(true)
            }
            Slot::New(_) => Ok(false),
        }
    }

    fn encode_array(&mut self, array: &AmfArray) -> Result<()> {
        u29::write_u29(self.out, inline_header(array.dense.len())?)?;
        for (key, value) in &array.named {
            if key.is_empty() {
                return Err(AmfError::UnrepresentableValue("empty key in associative array"));
            }
            self.write_string(key)?;
            self.encode(value)?;
        }
        self.write_string("")?;
        for value in &array.dense {
            self.encode(value)?;
        }
        Ok(())
    }

    /// Trait for `object` plus the descriptor it was derived from
    fn trait_for(&self, object: &AmfObject) -> (Trait, Option<Arc<TypeDescriptor>>) {
        let Some((alias, descriptor)) = object
            .type_name
            .as_deref()
            .and_then(|type_name| self.registry.lookup_type(type_name))
        else {
            return (Trait::anonymous(), None);
        };

        if descriptor.is_externalizable() {
            return (Trait::externalizable(alias), Some(descriptor));
        }

        let sealed = if descriptor.declared_members().is_empty() {
            object.properties.keys().cloned().collect()
        } else {
            descriptor.declared_members().to_vec()
        };
        let traits = Trait {
            alias,
            sealed,
            dynamic: descriptor.is_dynamic(),
            externalizable: false,
        };
        (traits, Some(descriptor))
    }

    fn write_trait(&mut self, traits: &Trait) -> Result<()> {
        match self.traits.find_or_insert(traits) {
            Slot::Existing(index) => u29::write_u29(self.out, reference_header(index, 2)? | 0b01),
            Slot::New(_) => {
                let count = u32::try_from(traits.sealed.len())
                    .ok()
                    .filter(|count| *count <= U29_MAX >> 4)
                    .ok_or(AmfError::UnrepresentableValue("too many sealed members"))?;
                let mut header = (count << 4) | TRAIT_INLINE | 0b01;
                if traits.externalizable {
                    header |= TRAIT_EXTERNALIZABLE;
                }
                if traits.dynamic {
                    header |= TRAIT_DYNAMIC;
                }
                u29::write_u29(self.out, header)?;
                self.write_string(&traits.alias)?;
                for name in &traits.sealed {
                    self.write_string(name)?;
                }
                Ok(())
            }
        }
    }

    fn encode_object(&mut self, object: &AmfObject) -> Result<()> {
        let (traits, descriptor) = self.trait_for(object);
        self.write_trait(&traits)?;

        if let Some(externalizer) = descriptor.as_ref().and_then(|d| d.externalizer()) {
            return externalizer.write_external(object, self);
        }

        for name in &traits.sealed {
            let value = object.properties.get(name).unwrap_or(&AmfValue::Undefined);
            self.encode(value)?;
        }

        let mut dropped = 0usize;
        for (key, value) in &object.properties {
            if traits.sealed.contains(key) {
                continue;
            }
            if !traits.dynamic {
                dropped += 1;
                continue;
            }
            if key.is_empty() {
                return Err(AmfError::UnrepresentableValue("empty dynamic member name"));
            }
            self.write_string(key)?;
            self.encode(value)?;
        }
        if traits.dynamic {
            self.write_string("")?;
        }
        if dropped > 0 {
            tracing::warn!(
                alias = %traits.alias,
                dropped = dropped,
                "Sealed type has undeclared members; they were not written"
            );
        }
        Ok(())
    }

    fn encode_vector(&mut self, vector: &AmfVector) -> Result<()> {
        u29::write_u29(self.out, inline_header(vector.len())?)?;
        self.out.write_bool(vector.fixed);
        match &vector.elements {
            VectorElements::Int(values) => values.iter().for_each(|v| self.out.write_i32(*v)),
            VectorElements::UInt(values) => values.iter().for_each(|v| self.out.write_u32(*v)),
            VectorElements::Double(values) => values.iter().for_each(|v| self.out.write_f64(*v)),
            VectorElements::Object { type_name, items } => {
                self.write_string(type_name)?;
                for item in items {
                    self.encode(item)?;
                }
            }
        }
        Ok(())
    }

    fn encode_dictionary(&mut self, dictionary: &AmfDictionary) -> Result<()> {
        u29::write_u29(self.out, inline_header(dictionary.len())?)?;
        // Weak keys have no meaning outside the player
        self.out.write_bool(false);
        for (key, value) in &dictionary.entries {
            self.encode(key)?;
            self.encode(value)?;
        }
        Ok(())
    }
}

/// Object-table header as read from the wire
enum Header {
    Reference(AmfValue),
    Inline(u32),
}

/// AMF3 decoder
pub struct Amf3Decoder<'a> {
    input: &'a mut ByteArray,
    registry: &'a ClassRegistry,
    strings: DecodeTable<String>,
    objects: DecodeTable<AmfValue>,
    traits: DecodeTable<Rc<Trait>>,
    depth: usize,
    max_depth: usize,
}

impl<'a> Amf3Decoder<'a> {
    /// Create a decoder reading from the current position of `input`
    pub fn new(input: &'a mut ByteArray, registry: &'a ClassRegistry) -> Self {
        let max_depth = input.max_depth();
        Self {
            input,
            registry,
            strings: DecodeTable::new(RefTable::String),
            objects: DecodeTable::new(RefTable::Object),
            traits: DecodeTable::new(RefTable::Trait),
            depth: 0,
            max_depth,
        }
    }

    pub(crate) fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// The underlying byte array, for externalizable hooks reading raw data
    pub fn bytes(&mut self) -> &mut ByteArray {
        &mut *self.input
    }

    /// Decode a single AMF3 value
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
            MARKER_UNDEFINED => Ok(AmfValue::Undefined),
            MARKER_NULL => Ok(AmfValue::Null),
            MARKER_FALSE => Ok(AmfValue::Boolean(false)),
            MARKER_TRUE => Ok(AmfValue::Boolean(true)),
            MARKER_INTEGER => Ok(AmfValue::Integer(u29::read_i29(self.input)?)),
            MARKER_DOUBLE => Ok(AmfValue::Number(self.input.read_f64()?)),
            MARKER_STRING => Ok(AmfValue::String(self.read_string()?)),
            MARKER_XML_DOCUMENT => self.decode_xml(AmfValue::XmlDocument),
            MARKER_DATE => self.decode_date(),
            MARKER_ARRAY => self.decode_array(),
            MARKER_OBJECT => self.decode_object(),
            MARKER_XML => self.decode_xml(AmfValue::Xml),
            MARKER_BYTE_ARRAY => self.decode_byte_array(),
            MARKER_VECTOR_INT | MARKER_VECTOR_UINT | MARKER_VECTOR_DOUBLE
            | MARKER_VECTOR_OBJECT => self.decode_vector(marker),
            MARKER_DICTIONARY => self.decode_dictionary(),
            _ => Err(AmfError::UnknownMarker(marker)),
        }
    }

    /// Read a string body (no marker) through the string table
    pub fn read_string(&mut self) -> Result<String> {
        let header = u29::read_u29(self.input)?;
        if header & 1 == 0 {
            return self.strings.get((header >> 1) as usize).cloned();
        }
        let len = (header >> 1) as usize;
        if len == 0 {
            return Ok(String::new());
        }
        let s = self.input.read_utf_bytes(len)?;
        self.strings.push(s.clone());
        Ok(s)
    }

    fn read_header(&mut self) -> Result<Header> {
        let header = u29::read_u29(self.input)?;
        if header & 1 == 0 {
            let value = self.objects.get((header >> 1) as usize)?.clone();
            return Ok(Header::Reference(value));
        }
        Ok(Header::Inline(header >> 1))
    }

    /// Claim an object slot before reading the body, so back references
    /// from inside the body resolve to the same handle
    fn register<T>(&mut self, body: T, wrap: fn(Shared<T>) -> AmfValue) -> Shared<T> {
        let handle = Rc::new(RefCell::new(body));
        self.objects.push(wrap(Rc::clone(&handle)));
        handle
    }

    fn decode_xml(&mut self, wrap: fn(String) -> AmfValue) -> Result<AmfValue> {
        match self.read_header()? {
            Header::Reference(value) => Ok(value),
            Header::Inline(len) => {
                let value = wrap(self.input.read_utf_bytes(len as usize)?);
                self.objects.push(value.clone());
                Ok(value)
            }
        }
    }

    fn decode_date(&mut self) -> Result<AmfValue> {
        match self.read_header()? {
            Header::Reference(value) => Ok(value),
            Header::Inline(_) => {
                let value = AmfValue::Date(self.input.read_f64()?);
                self.objects.push(value.clone());
                Ok(value)
            }
        }
    }

    fn decode_array(&mut self) -> Result<AmfValue> {
        let dense_len = match self.read_header()? {
            Header::Reference(value) => return Ok(value),
            Header::Inline(len) => len as usize,
        };

        let array = self.register(AmfArray::new(), AmfValue::Array);
        loop {
            let key = self.read_string()?;
            if key.is_empty() {
                break;
            }
            let value = self.decode()?;
            array.borrow_mut().named.insert(key, value);
        }

        array.borrow_mut().dense.reserve(dense_len.min(1024)); // Cap initial allocation
        for _ in 0..dense_len {
            let value = self.decode()?;
            array.borrow_mut().dense.push(value);
        }
        Ok(AmfValue::Array(array))
    }

    fn read_trait(&mut self, header: u32) -> Result<Rc<Trait>> {
        if header & TRAIT_INLINE == 0 {
            return self.traits.get((header >> 2) as usize).cloned();
        }

        let alias = self.read_string()?;
        let count = (header >> 4) as usize;
        let mut sealed = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            sealed.push(self.read_string()?);
        }
        let traits = Rc::new(Trait {
            alias,
            sealed,
            dynamic: header & TRAIT_DYNAMIC != 0,
            externalizable: header & TRAIT_EXTERNALIZABLE != 0,
        });
        self.traits.push(Rc::clone(&traits));
        Ok(traits)
    }

    fn decode_object(&mut self) -> Result<AmfValue> {
        let header = match self.read_header()? {
            Header::Reference(value) => return Ok(value),
            Header::Inline(bits) => bits,
        };
        // read_header already dropped the object-literal bit
        let traits = self.read_trait((header << 1) | 1)?;

        let descriptor = if traits.alias.is_empty() {
            None
        } else {
            self.registry.descriptor(&traits.alias)
        };

        if traits.externalizable {
            let descriptor = descriptor
                .filter(|d| d.is_externalizable())
                .ok_or_else(|| AmfError::UnknownExternalizable(traits.alias.clone()))?;
            let object = self.register(descriptor.instantiate(), AmfValue::Object);
            let mut body = descriptor.instantiate();
            if let Some(externalizer) = descriptor.externalizer() {
                externalizer.read_external(&mut body, self)?;
            }
            *object.borrow_mut() = body;
            return Ok(AmfValue::Object(object));
        }

        let instance = match &descriptor {
            Some(descriptor) => descriptor.instantiate(),
            None => {
                if !traits.alias.is_empty() {
                    tracing::debug!(
                        alias = %traits.alias,
                        "No type registered for alias, decoding as anonymous object"
                    );
                }
                AmfObject::new()
            }
        };
        let object = self.register(instance, AmfValue::Object);

        for name in &traits.sealed {
            let value = self.decode()?;
            object.borrow_mut().properties.insert(name.clone(), value);
        }

        if traits.dynamic {
            loop {
                let key = self.read_string()?;
                if key.is_empty() {
                    break;
                }
                let value = self.decode()?;
                object.borrow_mut().properties.insert(key, value);
            }
        }
        Ok(AmfValue::Object(object))
    }

    fn decode_byte_array(&mut self) -> Result<AmfValue> {
        match self.read_header()? {
            Header::Reference(value) => Ok(value),
            Header::Inline(len) => {
                let bytes = self.input.read_bytes(len as usize)?;
                let value = AmfValue::byte_array(bytes.to_vec());
                self.objects.push(value.clone());
                Ok(value)
            }
        }
    }

    fn ensure_available(&self, count: usize, width: usize) -> Result<()> {
        let needed = count.saturating_mul(width);
        let available = self.input.bytes_available();
        if available < needed {
            return Err(AmfError::truncated(needed, available));
        }
        Ok(())
    }

    fn decode_vector(&mut self, marker: u8) -> Result<AmfValue> {
        let count = match self.read_header()? {
            Header::Reference(value) => return Ok(value),
            Header::Inline(count) => count as usize,
        };
        let fixed = self.input.read_bool()?;

        let elements = match marker {
            MARKER_VECTOR_INT => {
                self.ensure_available(count, 4)?;
                let mut values = Vec::with_capacity(count);
                for _ in 0..count {
                    values.push(self.input.read_i32()?);
                }
                VectorElements::Int(values)
            }
            MARKER_VECTOR_UINT => {
                self.ensure_available(count, 4)?;
                let mut values = Vec::with_capacity(count);
                for _ in 0..count {
                    values.push(self.input.read_u32()?);
                }
                VectorElements::UInt(values)
            }
            MARKER_VECTOR_DOUBLE => {
                self.ensure_available(count, 8)?;
                let mut values = Vec::with_capacity(count);
                for _ in 0..count {
                    values.push(self.input.read_f64()?);
                }
                VectorElements::Double(values)
            }
            _ => {
                let type_name = self.read_string()?;
                let vector = self.register(
                    AmfVector {
                        fixed,
                        elements: VectorElements::Object {
                            type_name,
                            items: Vec::with_capacity(count.min(1024)),
                        },
                    },
                    AmfValue::Vector,
                );
                for _ in 0..count {
                    let item = self.decode()?;
                    if let VectorElements::Object { items, .. } = &mut vector.borrow_mut().elements {
                        items.push(item);
                    }
                }
                return Ok(AmfValue::Vector(vector));
            }
        };

        let value = AmfValue::vector(AmfVector { fixed, elements });
        self.objects.push(value.clone());
        Ok(value)
    }

    fn decode_dictionary(&mut self) -> Result<AmfValue> {
        let count = match self.read_header()? {
            Header::Reference(value) => return Ok(value),
            Header::Inline(count) => count as usize,
        };
        let weak_keys = self.input.read_bool()?;

        let dictionary = self.register(
            AmfDictionary {
                weak_keys,
                entries: Vec::with_capacity(count.min(1024)),
            },
            AmfValue::Dictionary,
        );
        for _ in 0..count {
            let key = self.decode()?;
            let value = self.decode()?;
            dictionary.borrow_mut().entries.push((key, value));
        }
        Ok(AmfValue::Dictionary(dictionary))
    }
}

/// Convenience function to encode a single value
pub fn encode(value: &AmfValue) -> Result<bytes::Bytes> {
    let mut ba = ByteArray::new();
    ba.write_object(value)?;
    Ok(ba.into_bytes())
}

/// Convenience function to encode multiple values, each with fresh tables
pub fn encode_all(values: &[AmfValue]) -> Result<bytes::Bytes> {
    let mut ba = ByteArray::new();
    for value in values {
        ba.write_object(value)?;
    }
    Ok(ba.into_bytes())
}

/// Convenience function to decode a single value
pub fn decode(data: &[u8]) -> Result<AmfValue> {
    ByteArray::from(data).read_object()
}

/// Convenience function to decode all values
pub fn decode_all(data: &[u8]) -> Result<Vec<AmfValue>> {
    let mut ba = ByteArray::from(data);
    let mut values = Vec::new();
    while ba.bytes_available() > 0 {
        values.push(ba.read_object()?);
    }
    Ok(values)
}
