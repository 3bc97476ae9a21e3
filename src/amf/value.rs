//! AMF value types
//!
//! Both AMF0 and AMF3 share a common value representation. Scalars are held
//! inline; every kind that takes part in object-reference tables and can form
//! cycles (arrays, objects, vectors, dictionaries, byte arrays, sets) is held
//! behind a [`Shared`] handle. Cloning an `AmfValue` clones the handle, so the
//! clone has the same identity as the original. Two separately constructed
//! handles with equal contents are distinct identities and are encoded as two
//! separate objects.
//!
//! `From` conversions are the single place where host values are classified
//! into AMF kinds. The codecs only ever branch on `AmfValue` variants.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use indexmap::IndexMap;

/// Shared, mutable handle used for reference-bearing values
pub type Shared<T> = Rc<RefCell<T>>;

/// Insertion-ordered string keyed properties
pub type Properties = IndexMap<String, AmfValue>;

/// Largest integer magnitude a double represents exactly (2^53 - 1)
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Unified AMF value representation
///
/// Some kinds (vectors, dictionaries, byte arrays, integers) only have an
/// AMF3 encoding. Writing them in AMF0 fails with
/// [`AmfError::UnrepresentableValue`](crate::AmfError::UnrepresentableValue),
/// except `Integer`, which AMF0 writes as a number.
#[derive(Debug, Clone)]
pub enum AmfValue {
    /// Undefined value (AMF0: 0x06, AMF3: 0x00)
    Undefined,

    /// Null value (AMF0: 0x05, AMF3: 0x01)
    Null,

    /// Boolean value (AMF0: 0x01, AMF3: 0x02/0x03)
    Boolean(bool),

    /// IEEE 754 double (AMF0: 0x00, AMF3: 0x05, or 0x04 when it fits in 29 bits)
    Number(f64),

    /// 29-bit signed integer (AMF3: 0x04)
    Integer(i32),

    /// Integer too large for a double; written as its decimal string
    BigInt(i128),

    /// UTF-8 string (AMF0: 0x02/0x0C, AMF3: 0x06)
    String(String),

    /// Milliseconds since the Unix epoch (AMF0: 0x0B, AMF3: 0x08)
    Date(f64),

    /// E4X XML (AMF3: 0x0B)
    Xml(String),

    /// Legacy XML document (AMF0: 0x0F, AMF3: 0x07)
    XmlDocument(String),

    /// Array with a dense part and optional named part
    /// (AMF0: 0x0A strict or 0x08 ECMA, AMF3: 0x09)
    Array(Shared<AmfArray>),

    /// Anonymous or typed object (AMF0: 0x03/0x10, AMF3: 0x0A)
    Object(Shared<AmfObject>),

    /// Typed vector (AMF3: 0x0D-0x10)
    Vector(Shared<AmfVector>),

    /// Dictionary with arbitrary keys (AMF3: 0x11)
    Dictionary(Shared<AmfDictionary>),

    /// Nested byte buffer (AMF3: 0x0C)
    ByteArray(Shared<Vec<u8>>),

    /// Collection of unique values, written as a dense array
    Set(Shared<AmfSet>),
}

/// Array value: dense elements plus named (associative) entries
///
/// AMF0 writes both parts into one key space. A named entry whose key is the
/// next dense index (`"0"` on an empty dense part, then `"1"`, ...) is
/// indistinguishable from a dense element there and reads back in `dense`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmfArray {
    pub dense: Vec<AmfValue>,
    pub named: Properties,
}

impl AmfArray {
    pub fn new() -> Self {
        Self::default()
    }

    /// An array with only a dense part
    pub fn dense(elements: Vec<AmfValue>) -> Self {
        Self {
            dense: elements,
            named: Properties::new(),
        }
    }

    /// True when the array has no named entries
    pub fn is_dense(&self) -> bool {
        self.named.is_empty()
    }

    /// Add a named entry, returning `self` for chaining
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AmfValue>) -> Self {
        self.named.insert(key.into(), value.into());
        self
    }
}

/// Object value
///
/// `type_name` is the host type identity. It is resolved to a class alias
/// through the [`ClassRegistry`](crate::ClassRegistry) when the object is
/// written; `None` is a plain anonymous object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmfObject {
    pub type_name: Option<String>,
    pub properties: Properties,
}

impl AmfObject {
    /// Create an anonymous object
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty object of the given type
    pub fn typed(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            properties: Properties::new(),
        }
    }

    /// Add a property, returning `self` for chaining
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AmfValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AmfValue>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&AmfValue> {
        self.properties.get(key)
    }

    pub fn is_typed(&self) -> bool {
        self.type_name.is_some()
    }
}

/// Elements of a typed vector
#[derive(Debug, Clone, PartialEq)]
pub enum VectorElements {
    /// `Vector.<int>`
    Int(Vec<i32>),
    /// `Vector.<uint>`
    UInt(Vec<u32>),
    /// `Vector.<Number>`
    Double(Vec<f64>),
    /// `Vector.<T>` for an object type name (`"*"` for any)
    Object {
        type_name: String,
        items: Vec<AmfValue>,
    },
}

impl VectorElements {
    pub fn len(&self) -> usize {
        match self {
            VectorElements::Int(v) => v.len(),
            VectorElements::UInt(v) => v.len(),
            VectorElements::Double(v) => v.len(),
            VectorElements::Object { items, .. } => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Typed vector value
///
/// A fixed vector cannot change length once decoded; the flag travels on the
/// wire and is restored on read.
#[derive(Debug, Clone, PartialEq)]
pub struct AmfVector {
    pub fixed: bool,
    pub elements: VectorElements,
}

impl AmfVector {
    pub fn int(values: Vec<i32>) -> Self {
        Self {
            fixed: false,
            elements: VectorElements::Int(values),
        }
    }

    pub fn uint(values: Vec<u32>) -> Self {
        Self {
            fixed: false,
            elements: VectorElements::UInt(values),
        }
    }

    pub fn double(values: Vec<f64>) -> Self {
        Self {
            fixed: false,
            elements: VectorElements::Double(values),
        }
    }

    pub fn object(type_name: impl Into<String>, items: Vec<AmfValue>) -> Self {
        Self {
            fixed: false,
            elements: VectorElements::Object {
                type_name: type_name.into(),
                items,
            },
        }
    }

    /// Mark the vector as fixed length
    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Dictionary value with arbitrary (possibly complex) keys
/// Dictionary value
///
/// Keys of reference kinds match by identity, so two distinct objects with
/// equal contents are two entries. Scalar keys match by value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmfDictionary {
    pub weak_keys: bool,
    pub entries: Vec<(AmfValue, AmfValue)>,
}

impl AmfDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `key`
    pub fn insert(&mut self, key: impl Into<AmfValue>, value: impl Into<AmfValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k.same_key(&key)) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &AmfValue) -> Option<&AmfValue> {
        self.entries.iter().find(|(k, _)| k.same_key(key)).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collection of unique values in insertion order
///
/// Reference kinds are unique by identity, scalars by value. There is no set
/// marker in either format: a set is written as a dense array and reads back
/// as an [`AmfValue::Array`]. [`AmfSet::from_array`] rebuilds it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmfSet {
    items: Vec<AmfValue>,
}

impl AmfSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value; returns false if it is already present
    pub fn insert(&mut self, value: impl Into<AmfValue>) -> bool {
        let value = value.into();
        if self.contains(&value) {
            return false;
        }
        self.items.push(value);
        true
    }

    pub fn contains(&self, value: &AmfValue) -> bool {
        self.items.iter().any(|v| v.same_key(value))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AmfValue> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Rebuild a set from a decoded array's dense part
    pub fn from_array(array: &AmfArray) -> Self {
        array.dense.iter().cloned().collect()
    }
}

impl<V: Into<AmfValue>> FromIterator<V> for AmfSet {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut set = AmfSet::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl AmfValue {
    /// Wrap an object in a new shared handle
    pub fn object(object: AmfObject) -> Self {
        AmfValue::Object(shared(object))
    }

    /// Wrap an array in a new shared handle
    pub fn array(array: AmfArray) -> Self {
        AmfValue::Array(shared(array))
    }

    /// Dense array from elements
    pub fn dense_array(elements: Vec<AmfValue>) -> Self {
        Self::array(AmfArray::dense(elements))
    }

    pub fn vector(vector: AmfVector) -> Self {
        AmfValue::Vector(shared(vector))
    }

    pub fn dictionary(dictionary: AmfDictionary) -> Self {
        AmfValue::Dictionary(shared(dictionary))
    }

    pub fn byte_array(bytes: impl Into<Vec<u8>>) -> Self {
        AmfValue::ByteArray(shared(bytes.into()))
    }

    pub fn set(set: AmfSet) -> Self {
        AmfValue::Set(shared(set))
    }

    pub fn date(millis: f64) -> Self {
        AmfValue::Date(millis)
    }

    /// Address of the shared allocation, for reference-bearing kinds
    ///
    /// Stable for as long as any handle to the value is alive.
    pub fn identity(&self) -> Option<usize> {
        match self {
            AmfValue::Array(rc) => Some(Rc::as_ptr(rc) as *const () as usize),
            AmfValue::Object(rc) => Some(Rc::as_ptr(rc) as *const () as usize),
            AmfValue::Vector(rc) => Some(Rc::as_ptr(rc) as *const () as usize),
            AmfValue::Dictionary(rc) => Some(Rc::as_ptr(rc) as *const () as usize),
            AmfValue::ByteArray(rc) => Some(Rc::as_ptr(rc) as *const () as usize),
            AmfValue::Set(rc) => Some(Rc::as_ptr(rc) as *const () as usize),
            _ => None,
        }
    }

    /// True when both values are handles to the same allocation
    pub fn same_identity(&self, other: &AmfValue) -> bool {
        match (self.identity(), other.identity()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Membership test for set items and dictionary keys
    fn same_key(&self, other: &AmfValue) -> bool {
        match (self.identity(), other.identity()) {
            (None, None) => self == other,
            (a, b) => a == b,
        }
    }

    /// Try to get this value as a string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AmfValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AmfValue::Number(n) => Some(*n),
            AmfValue::Integer(i) => Some(f64::from(*i)),
            _ => None,
        }
    }

    /// Try to get this value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AmfValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Shared<AmfObject>> {
        match self {
            AmfValue::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Shared<AmfArray>> {
        match self {
            AmfValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Check if this value is null or undefined
    pub fn is_null_or_undefined(&self) -> bool {
        matches!(self, AmfValue::Null | AmfValue::Undefined)
    }

    /// Get a property from an object, or a named entry from an array
    pub fn get(&self, key: &str) -> Option<AmfValue> {
        match self {
            AmfValue::Object(o) => o.borrow().properties.get(key).cloned(),
            AmfValue::Array(a) => a.borrow().named.get(key).cloned(),
            _ => None,
        }
    }

    /// Get a string property from an object value
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key)?.as_str().map(str::to_owned)
    }

    /// Get a number property from an object value
    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.get(key)?.as_number()
    }

    /// Type name of an object value, `None` for anonymous objects and non-objects
    pub fn type_name(&self) -> Option<String> {
        self.as_object()?.borrow().type_name.clone()
    }
}

impl PartialEq for AmfValue {
    /// Deep comparison. `Integer` and `Number` compare by magnitude, since
    /// AMF3 picks the wire kind from the value. Cyclic values compare without
    /// looping, see [`GraphEq`].
    fn eq(&self, other: &Self) -> bool {
        GraphEq::default().values(self, other)
    }
}

/// Structural comparison over graphs that may contain cycles
///
/// A pair of handles is recorded the first time it is compared. Meeting the
/// pair again counts as equal, so a walk that returns to a handle it is
/// already inside stops there. Every check is a conjunction, so any mismatch
/// still reaches the top.
#[derive(Default)]
struct GraphEq {
    seen: HashSet<(usize, usize)>,
}

impl GraphEq {
    fn values(&mut self, a: &AmfValue, b: &AmfValue) -> bool {
        use AmfValue::*;
        if let (Some(pa), Some(pb)) = (a.identity(), b.identity()) {
            if pa == pb || !self.seen.insert((pa, pb)) {
                return true;
            }
        }
        match (a, b) {
            (Undefined, Undefined) | (Null, Null) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (Number(a), Number(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Number(a), Integer(b)) | (Integer(b), Number(a)) => *a == f64::from(*b),
            (BigInt(a), BigInt(b)) => a == b,
            (String(a), String(b)) | (Xml(a), Xml(b)) | (XmlDocument(a), XmlDocument(b)) => {
                a == b
            }
            (Date(a), Date(b)) => a == b,
            (Array(a), Array(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                self.sequences(&a.dense, &b.dense) && self.properties(&a.named, &b.named)
            }
            (Object(a), Object(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.type_name == b.type_name && self.properties(&a.properties, &b.properties)
            }
            (Vector(a), Vector(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.fixed == b.fixed
                    && match (&a.elements, &b.elements) {
                        (
                            VectorElements::Object { type_name: ta, items: ia },
                            VectorElements::Object { type_name: tb, items: ib },
                        ) => ta == tb && self.sequences(ia, ib),
                        (ea, eb) => ea == eb,
                    }
            }
            (Dictionary(a), Dictionary(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.weak_keys == b.weak_keys
                    && a.entries.len() == b.entries.len()
                    && a.entries
                        .iter()
                        .zip(&b.entries)
                        .all(|((ka, va), (kb, vb))| self.values(ka, kb) && self.values(va, vb))
            }
            (ByteArray(a), ByteArray(b)) => *a.borrow() == *b.borrow(),
            (Set(a), Set(b)) => self.sequences(&a.borrow().items, &b.borrow().items),
            _ => false,
        }
    }

    fn sequences(&mut self, a: &[AmfValue], b: &[AmfValue]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(a, b)| self.values(a, b))
    }

    /// Order-insensitive, like `IndexMap`'s own equality
    fn properties(&mut self, a: &Properties, b: &Properties) -> bool {
        a.len() == b.len()
            && a.iter()
                .all(|(key, value)| b.get(key).is_some_and(|other| self.values(value, other)))
    }
}

impl Default for AmfValue {
    fn default() -> Self {
        AmfValue::Null
    }
}

impl From<bool> for AmfValue {
    fn from(v: bool) -> Self {
        AmfValue::Boolean(v)
    }
}

impl From<f64> for AmfValue {
    fn from(v: f64) -> Self {
        AmfValue::Number(v)
    }
}

impl From<f32> for AmfValue {
    fn from(v: f32) -> Self {
        AmfValue::Number(f64::from(v))
    }
}

impl From<i32> for AmfValue {
    fn from(v: i32) -> Self {
        AmfValue::Number(f64::from(v))
    }
}

impl From<u32> for AmfValue {
    fn from(v: u32) -> Self {
        AmfValue::Number(f64::from(v))
    }
}

impl From<i64> for AmfValue {
    fn from(v: i64) -> Self {
        if (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&v) {
            AmfValue::Number(v as f64)
        } else {
            AmfValue::BigInt(i128::from(v))
        }
    }
}

impl From<u64> for AmfValue {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(v) => AmfValue::from(v),
            Err(_) => AmfValue::BigInt(i128::from(v)),
        }
    }
}

impl From<i128> for AmfValue {
    fn from(v: i128) -> Self {
        match i64::try_from(v) {
            Ok(v) => AmfValue::from(v),
            Err(_) => AmfValue::BigInt(v),
        }
    }
}

impl From<String> for AmfValue {
    fn from(v: String) -> Self {
        AmfValue::String(v)
    }
}

impl From<&str> for AmfValue {
    fn from(v: &str) -> Self {
        AmfValue::String(v.to_string())
    }
}

impl<V: Into<AmfValue>> From<Option<V>> for AmfValue {
    fn from(v: Option<V>) -> Self {
        v.map_or(AmfValue::Null, Into::into)
    }
}

impl<V: Into<AmfValue>> From<Vec<V>> for AmfValue {
    fn from(v: Vec<V>) -> Self {
        AmfValue::dense_array(v.into_iter().map(Into::into).collect())
    }
}

impl<V: Into<AmfValue>> From<IndexMap<String, V>> for AmfValue {
    fn from(v: IndexMap<String, V>) -> Self {
        AmfValue::object(AmfObject {
            type_name: None,
            properties: v.into_iter().map(|(k, v)| (k, v.into())).collect(),
        })
    }
}

impl From<bytes::Bytes> for AmfValue {
    fn from(v: bytes::Bytes) -> Self {
        AmfValue::byte_array(v.to_vec())
    }
}

impl From<AmfObject> for AmfValue {
    fn from(v: AmfObject) -> Self {
        AmfValue::object(v)
    }
}

impl From<AmfArray> for AmfValue {
    fn from(v: AmfArray) -> Self {
        AmfValue::array(v)
    }
}

impl From<AmfVector> for AmfValue {
    fn from(v: AmfVector) -> Self {
        AmfValue::vector(v)
    }
}

impl From<AmfDictionary> for AmfValue {
    fn from(v: AmfDictionary) -> Self {
        AmfValue::dictionary(v)
    }
}

impl From<AmfSet> for AmfValue {
    fn from(v: AmfSet) -> Self {
        AmfValue::set(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        let s = AmfValue::String("test".into());
        assert_eq!(s.as_str(), Some("test"));
        assert_eq!(s.as_number(), None);

        let n = AmfValue::Number(42.0);
        assert_eq!(n.as_number(), Some(42.0));
        assert_eq!(n.as_str(), None);

        let o = AmfValue::object(AmfObject::new().with("key", "value"));
        assert_eq!(o.get_string("key").as_deref(), Some("value"));
        assert_eq!(o.type_name(), None);
    }

    #[test]
    fn test_from_conversions() {
        let v: AmfValue = "test".into();
        assert!(matches!(v, AmfValue::String(_)));

        let v: AmfValue = 42.0.into();
        assert!(matches!(v, AmfValue::Number(_)));

        let v: AmfValue = true.into();
        assert!(matches!(v, AmfValue::Boolean(true)));

        let v: AmfValue = None::<i32>.into();
        assert!(matches!(v, AmfValue::Null));
    }

    #[test]
    fn test_large_integers_classify_as_bigint() {
        assert!(matches!(AmfValue::from(MAX_SAFE_INTEGER), AmfValue::Number(_)));
        assert!(matches!(
            AmfValue::from(MAX_SAFE_INTEGER + 1),
            AmfValue::BigInt(9_007_199_254_740_992)
        ));
        assert!(matches!(AmfValue::from(u64::MAX), AmfValue::BigInt(_)));
        assert!(matches!(AmfValue::from(-5i128), AmfValue::Number(n) if n == -5.0));
    }

    #[test]
    fn test_integer_number_equality() {
        assert_eq!(AmfValue::Integer(7), AmfValue::Number(7.0));
        assert_eq!(AmfValue::Number(7.0), AmfValue::Integer(7));
        assert_ne!(AmfValue::Integer(7), AmfValue::Number(7.5));
        assert_ne!(AmfValue::Integer(0), AmfValue::Boolean(false));
    }

    #[test]
    fn test_identity_is_per_handle() {
        let a = AmfValue::object(AmfObject::new().with("id", 1));
        let b = AmfValue::object(AmfObject::new().with("id", 1));
        let a2 = a.clone();

        assert_eq!(a, b);
        assert!(!a.same_identity(&b));
        assert!(a.same_identity(&a2));
        assert!(!AmfValue::Number(1.0).same_identity(&AmfValue::Number(1.0)));
    }

    #[test]
    fn test_cyclic_self_comparison_terminates() {
        let root = AmfValue::object(AmfObject::new());
        if let AmfValue::Object(o) = &root {
            o.borrow_mut().insert("me", root.clone());
        }
        assert!(root == root.clone());
    }

    fn node(x: i32) -> AmfValue {
        let node = AmfValue::object(AmfObject::new().with("x", x));
        if let AmfValue::Object(o) = &node {
            o.borrow_mut().insert("next", node.clone());
        }
        node
    }

    #[test]
    fn test_distinct_cycles_compare_structurally() {
        // assert!(a == b) rather than assert_eq!, which would Debug a cycle
        assert!(node(1) == node(1));
        assert!(node(1) != node(2));

        // a two-node ring against a one-node loop with the same payload
        let first = AmfValue::object(AmfObject::new().with("x", 1));
        let second = AmfValue::object(AmfObject::new().with("x", 1).with("next", first.clone()));
        if let AmfValue::Object(o) = &first {
            o.borrow_mut().insert("next", second.clone());
        }
        assert!(first == node(1));

        let looped = AmfValue::dense_array(vec![]);
        if let AmfValue::Array(a) = &looped {
            a.borrow_mut().dense.push(looped.clone());
        }
        let other = AmfValue::dense_array(vec![]);
        if let AmfValue::Array(a) = &other {
            a.borrow_mut().dense.push(other.clone());
            a.borrow_mut().dense.push(AmfValue::Null);
        }
        assert!(looped != other);
    }

    #[test]
    fn test_set_keeps_unique_values() {
        let mut set = AmfSet::new();
        assert!(set.insert(1));
        assert!(set.insert("one"));
        assert!(!set.insert(1));
        assert_eq!(set.len(), 2);

        let array = AmfArray::dense(vec![1.into(), 1.into(), 2.into()]);
        assert_eq!(AmfSet::from_array(&array).len(), 2);
    }

    #[test]
    fn test_set_and_dictionary_keys_use_identity() {
        let a = AmfValue::object(AmfObject::new().with("id", 1));
        let b = AmfValue::object(AmfObject::new().with("id", 1));

        let mut set = AmfSet::new();
        assert!(set.insert(a.clone()));
        assert!(set.insert(b.clone()));
        assert!(!set.insert(a.clone()));
        assert_eq!(set.len(), 2);
        assert!(!set.contains(&AmfValue::object(AmfObject::new().with("id", 1))));

        let mut dict = AmfDictionary::new();
        dict.insert(a.clone(), "first");
        dict.insert(b.clone(), "second");
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.get(&a), Some(&AmfValue::from("first")));
        assert_eq!(dict.get(&b), Some(&AmfValue::from("second")));
    }

    #[test]
    fn test_dictionary_replaces_equal_keys() {
        let mut dict = AmfDictionary::new();
        dict.insert("Name", "Daan");
        dict.insert("Name", "Gravix");
        assert_eq!(dict.len(), 1);
        assert_eq!(
            dict.get(&"Name".into()),
            Some(&AmfValue::String("Gravix".into()))
        );
    }
}
