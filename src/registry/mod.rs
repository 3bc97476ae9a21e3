//! Class alias registry
//!
//! The registry maps host type names to the aliases written on the wire, and
//! aliases back to a [`TypeDescriptor`] that knows how to build, seal and
//! (optionally) externalize instances of that type.
//!
//! # Architecture
//!
//! ```text
//!                 Arc<ClassRegistry>
//!          ┌──────────────────────────────┐
//!          │ by_alias: alias -> Descriptor │
//!          │ by_type:  type  -> alias      │
//!          └──────────────┬───────────────┘
//!                         │ read lock per lookup
//!         ┌───────────────┴───────────────┐
//!         ▼                               ▼
//!   encoder: type_name               decoder: alias
//!   -> alias + trait                 -> instantiate()
//! ```
//!
//! A process-wide instance is available through [`ClassRegistry::global`] and
//! is what every [`ByteArray`](crate::ByteArray) uses by default. Tests and
//! embedders that need isolation build their own with [`ClassRegistry::new`].
//! Registration is rare and takes the write lock; lookups take the read lock.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;

use crate::amf::{Amf3Decoder, Amf3Encoder, AmfObject};
use crate::error::Result;

static GLOBAL: LazyLock<Arc<ClassRegistry>> = LazyLock::new(|| Arc::new(ClassRegistry::new()));

/// Custom AMF3 body encoding for a registered type
///
/// An externalizable type owns its whole object body: the codec writes the
/// trait header and then hands over to `write_external`, and on read hands
/// over to `read_external` right after the trait. The codec does not look at
/// the bytes in between, so the two hooks must agree on their length.
pub trait Externalizable: Send + Sync {
    /// Write the body of `object`
    fn write_external(&self, object: &AmfObject, out: &mut Amf3Encoder<'_>) -> Result<()>;

    /// Fill `object` (already instantiated from the descriptor) from the body
    fn read_external(&self, object: &mut AmfObject, input: &mut Amf3Decoder<'_>) -> Result<()>;
}

type Factory = Arc<dyn Fn() -> AmfObject + Send + Sync>;

/// Everything the codecs need to know about a registered type
#[derive(Clone)]
pub struct TypeDescriptor {
    type_name: String,
    dynamic: bool,
    sealed_members: Vec<String>,
    externalizer: Option<Arc<dyn Externalizable>>,
    factory: Option<Factory>,
}

impl TypeDescriptor {
    /// Descriptor for a sealed (non-dynamic) type
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            dynamic: false,
            sealed_members: Vec::new(),
            externalizer: None,
            factory: None,
        }
    }

    /// Allow members beyond the sealed ones
    pub fn dynamic(mut self, dynamic: bool) -> Self {
        self.dynamic = dynamic;
        self
    }

    /// Declare the sealed members and their wire order
    ///
    /// Without a declaration, an instance's own property order is used.
    pub fn sealed_members<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sealed_members = members.into_iter().map(Into::into).collect();
        self
    }

    /// Give the type its own body encoding
    pub fn externalizable(mut self, externalizer: impl Externalizable + 'static) -> Self {
        self.externalizer = Some(Arc::new(externalizer));
        self
    }

    /// Build fresh instances with `factory` instead of an empty object
    pub fn factory(mut self, factory: impl Fn() -> AmfObject + Send + Sync + 'static) -> Self {
        self.factory = Some(Arc::new(factory));
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn is_externalizable(&self) -> bool {
        self.externalizer.is_some()
    }

    pub fn declared_members(&self) -> &[String] {
        &self.sealed_members
    }

    pub fn externalizer(&self) -> Option<&Arc<dyn Externalizable>> {
        self.externalizer.as_ref()
    }

    /// Create an instance for the decoder to fill
    pub fn instantiate(&self) -> AmfObject {
        let mut object = match &self.factory {
            Some(factory) => factory(),
            None => AmfObject::new(),
        };
        object.type_name = Some(self.type_name.clone());
        object
    }
}

impl std::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &self.type_name)
            .field("dynamic", &self.dynamic)
            .field("sealed_members", &self.sealed_members)
            .field("externalizable", &self.is_externalizable())
            .field("has_factory", &self.factory.is_some())
            .finish()
    }
}

#[derive(Default)]
struct Aliases {
    by_alias: HashMap<String, Arc<TypeDescriptor>>,
    by_type: HashMap<String, String>,
}

/// Bidirectional map between type names and class aliases
#[derive(Default)]
pub struct ClassRegistry {
    aliases: RwLock<Aliases>,
}

impl ClassRegistry {
    /// Create an empty, isolated registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry
    pub fn global() -> Arc<ClassRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Register `descriptor` under `alias`
    ///
    /// Overwrites any previous mapping for the alias and for the descriptor's
    /// type name; the last registration wins.
    pub fn register(&self, alias: impl Into<String>, descriptor: TypeDescriptor) -> Arc<TypeDescriptor> {
        let alias = alias.into();
        let descriptor = Arc::new(descriptor);

        tracing::debug!(
            alias = %alias,
            type_name = %descriptor.type_name,
            externalizable = descriptor.is_externalizable(),
            dynamic = descriptor.dynamic,
            "Registered class alias"
        );

        let mut aliases = self.aliases.write();
        aliases
            .by_type
            .insert(descriptor.type_name.clone(), alias.clone());
        aliases.by_alias.insert(alias, Arc::clone(&descriptor));
        descriptor
    }

    /// Alias registered for a type name
    pub fn alias_for(&self, type_name: &str) -> Option<String> {
        self.aliases.read().by_type.get(type_name).cloned()
    }

    /// Descriptor registered under an alias
    pub fn descriptor(&self, alias: &str) -> Option<Arc<TypeDescriptor>> {
        self.aliases.read().by_alias.get(alias).cloned()
    }

    /// Alias and descriptor for a type name, if both directions agree
    ///
    /// A type whose alias has since been re-registered for a different type
    /// resolves to nothing and is written anonymously.
    pub fn lookup_type(&self, type_name: &str) -> Option<(String, Arc<TypeDescriptor>)> {
        let aliases = self.aliases.read();
        let alias = aliases.by_type.get(type_name)?;
        let descriptor = aliases.by_alias.get(alias)?;
        (descriptor.type_name == type_name).then(|| (alias.clone(), Arc::clone(descriptor)))
    }

    pub fn contains_alias(&self, alias: &str) -> bool {
        self.aliases.read().by_alias.contains_key(alias)
    }

    /// Number of registered aliases
    pub fn len(&self) -> usize {
        self.aliases.read().by_alias.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let aliases = self.aliases.read();
        f.debug_struct("ClassRegistry")
            .field("aliases", &aliases.by_type)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let registry = ClassRegistry::new();
        assert!(registry.is_empty());

        registry.register("com.person", TypeDescriptor::new("Person"));

        assert_eq!(registry.alias_for("Person").as_deref(), Some("com.person"));
        assert_eq!(
            registry.descriptor("com.person").unwrap().type_name(),
            "Person"
        );
        assert!(registry.contains_alias("com.person"));
        assert_eq!(registry.len(), 1);
        assert!(registry.descriptor("com.other").is_none());
        assert!(registry.alias_for("Other").is_none());
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = ClassRegistry::new();
        registry.register("src.person", TypeDescriptor::new("Person"));
        registry.register("src.person", TypeDescriptor::new("Employee"));

        assert_eq!(
            registry.descriptor("src.person").unwrap().type_name(),
            "Employee"
        );
        let (alias, _) = registry.lookup_type("Employee").unwrap();
        assert_eq!(alias, "src.person");
        // Person still maps to the alias, but the alias no longer maps back
        assert_eq!(registry.alias_for("Person").as_deref(), Some("src.person"));
        assert!(registry.lookup_type("Person").is_none());
    }

    #[test]
    fn test_instantiate_sets_type_name() {
        let descriptor = TypeDescriptor::new("Person")
            .factory(|| AmfObject::new().with("age", 0));
        let object = descriptor.instantiate();
        assert_eq!(object.type_name.as_deref(), Some("Person"));
        assert!(object.get("age").is_some());

        let plain = TypeDescriptor::new("Point").instantiate();
        assert_eq!(plain.type_name.as_deref(), Some("Point"));
        assert!(plain.properties.is_empty());
    }

    #[test]
    fn test_descriptor_flags() {
        let descriptor = TypeDescriptor::new("Bag")
            .dynamic(true)
            .sealed_members(["a", "b"]);
        assert!(descriptor.is_dynamic());
        assert!(!descriptor.is_externalizable());
        assert_eq!(descriptor.declared_members(), ["a", "b"]);
    }

    #[test]
    fn test_global_is_shared() {
        assert!(Arc::ptr_eq(&ClassRegistry::global(), &ClassRegistry::global()));
    }
}
