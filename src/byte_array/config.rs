//! ByteArray configuration
//!
//! Initial object encoding, recursion limit and buffer sizing for a
//! [`ByteArray`](super::ByteArray).

use crate::amf::ObjectEncoding;

/// Configuration for a [`ByteArray`](super::ByteArray)
#[derive(Debug, Clone)]
pub struct ByteArrayConfig {
    /// Encoding used by `write_object`/`read_object` until changed
    pub object_encoding: ObjectEncoding,

    /// Maximum nesting depth of objects/arrays (prevents stack overflow on
    /// deep or hostile input)
    pub max_depth: usize,

    /// Bytes to preallocate for the backing buffer
    pub initial_capacity: usize,
}

impl Default for ByteArrayConfig {
    fn default() -> Self {
        Self {
            object_encoding: ObjectEncoding::Amf3,
            max_depth: 64,
            initial_capacity: 256,
        }
    }
}

impl ByteArrayConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial object encoding
    pub fn object_encoding(mut self, encoding: ObjectEncoding) -> Self {
        self.object_encoding = encoding;
        self
    }

    /// Set the maximum nesting depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the initial buffer capacity
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ByteArrayConfig::default();
        assert_eq!(config.object_encoding, ObjectEncoding::Amf3);
        assert_eq!(config.max_depth, 64);
        assert_eq!(config.initial_capacity, 256);
    }

    #[test]
    fn test_builder() {
        let config = ByteArrayConfig::new()
            .object_encoding(ObjectEncoding::Amf0)
            .max_depth(8)
            .initial_capacity(16);
        assert_eq!(config.object_encoding, ObjectEncoding::Amf0);
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.initial_capacity, 16);
    }
}
