//! AMF (Action Message Format) implementation
//!
//! AMF is Adobe's binary serialization format for ActionScript object graphs.
//! This module implements both AMF0 (original format) and AMF3 (ActionScript
//! 3.0 format), sharing the [`AmfValue`] representation.
//!
//! AMF3 values can be embedded in an AMF0 stream behind the AVM+ marker
//! (0x11). Reading that marker switches the stream's [`ObjectEncoding`] to
//! AMF3.

pub mod amf0;
pub mod amf3;
pub(crate) mod references;
pub mod u29;
pub mod value;

pub use amf0::{Amf0Decoder, Amf0Encoder};
pub use amf3::{Amf3Decoder, Amf3Encoder, Trait};
pub use value::{
    AmfArray, AmfDictionary, AmfObject, AmfSet, AmfValue, AmfVector, Properties, Shared,
    VectorElements,
};

/// Object encoding used by a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ObjectEncoding {
    /// AMF0, the ActionScript 1.0/2.0 format
    Amf0 = 0,
    /// AMF3, the ActionScript 3.0 format
    #[default]
    Amf3 = 3,
}

impl ObjectEncoding {
    /// Numeric value as used by Flash (`0` or `3`)
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ObjectEncoding {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ObjectEncoding::Amf0),
            3 => Ok(ObjectEncoding::Amf3),
            other => Err(other),
        }
    }
}
