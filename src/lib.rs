//! amf-rs: Action Message Format (AMF0/AMF3) serialization
//!
//! This library provides:
//! - AMF0 and AMF3 encoders and decoders over a shared value model
//! - Reference tables for strings, objects and traits, so shared and cyclic
//!   graphs survive a round trip
//! - A class alias registry for typed and externalizable objects
//! - A [`ByteArray`] cursor that switches between the two encodings
//!
//! # Example
//!
//! ```
//! use amf_rs::{AmfObject, AmfValue, ByteArray, ObjectEncoding};
//!
//! let mut ba = ByteArray::new();
//! ba.set_object_encoding(ObjectEncoding::Amf3);
//!
//! let value = AmfValue::object(AmfObject::new().with("name", "Daan").with("age", 30));
//! ba.write_object(&value).unwrap();
//!
//! ba.set_position(0);
//! assert_eq!(ba.read_object().unwrap(), value);
//! ```

pub mod amf;
pub mod byte_array;
pub mod error;
pub mod registry;

// Re-export main types for convenience
pub use amf::{
    Amf0Decoder, Amf0Encoder, Amf3Decoder, Amf3Encoder, AmfArray, AmfDictionary, AmfObject,
    AmfSet, AmfValue, AmfVector, ObjectEncoding, Trait, VectorElements,
};
pub use byte_array::{ByteArray, ByteArrayConfig};
pub use error::{AmfError, RefTable, Result};
pub use registry::{ClassRegistry, Externalizable, TypeDescriptor};
