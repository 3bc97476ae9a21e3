use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use amf_rs::{
    Amf3Decoder, Amf3Encoder, AmfError, AmfObject, AmfValue, AmfVector, ByteArray, ClassRegistry,
    Externalizable, ObjectEncoding, Result, TypeDescriptor,
};

/// Writes `x` and `y` as two raw doubles
#[derive(Default)]
struct PointExternalizer {
    writes: Arc<AtomicUsize>,
    reads: Arc<AtomicUsize>,
}

impl Externalizable for PointExternalizer {
    fn write_external(&self, object: &AmfObject, out: &mut Amf3Encoder<'_>) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        for key in ["x", "y"] {
            let n = object.get(key).and_then(AmfValue::as_number).unwrap_or(0.0);
            out.bytes().write_f64(n);
        }
        Ok(())
    }

    fn read_external(&self, object: &mut AmfObject, input: &mut Amf3Decoder<'_>) -> Result<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        for key in ["x", "y"] {
            object.insert(key, input.bytes().read_f64()?);
        }
        Ok(())
    }
}

fn buffer_with(registry: &Arc<ClassRegistry>) -> ByteArray {
    ByteArray::new().with_registry(Arc::clone(registry))
}

fn point(x: f64, y: f64) -> AmfValue {
    AmfValue::object(AmfObject::typed("Point").with("x", x).with("y", y))
}

#[test]
fn typed_object_roundtrips_through_alias() {
    let registry = Arc::new(ClassRegistry::new());
    registry.register(
        "com.example.Person",
        TypeDescriptor::new("Person").sealed_members(["name", "age"]),
    );

    let person = AmfValue::object(AmfObject::typed("Person").with("name", "Daan").with("age", 30));
    for encoding in [ObjectEncoding::Amf0, ObjectEncoding::Amf3] {
        let mut ba = buffer_with(&registry);
        ba.set_object_encoding(encoding);
        ba.write_object(&person).unwrap();

        let alias = b"com.example.Person";
        assert!(ba
            .as_slice()
            .windows(alias.len())
            .any(|window| window == alias));

        ba.set_position(0);
        let decoded = ba.read_object().unwrap();
        assert_eq!(decoded.type_name().as_deref(), Some("Person"), "{encoding:?}");
        assert_eq!(decoded, person, "{encoding:?}");
    }
}

#[test]
fn unknown_alias_decodes_as_anonymous_object() {
    let writer = Arc::new(ClassRegistry::new());
    writer.register("com.example.Person", TypeDescriptor::new("Person").dynamic(true));
    let reader = Arc::new(ClassRegistry::new());

    let person = AmfValue::object(AmfObject::typed("Person").with("name", "Daan"));
    for encoding in [ObjectEncoding::Amf0, ObjectEncoding::Amf3] {
        let mut ba = buffer_with(&writer);
        ba.set_object_encoding(encoding);
        ba.write_object(&person).unwrap();

        ba.set_registry(Arc::clone(&reader));
        ba.set_position(0);
        let decoded = ba.read_object().unwrap();
        assert_eq!(decoded.type_name(), None, "{encoding:?}");
        assert_eq!(decoded.get_string("name").as_deref(), Some("Daan"));
    }
}

#[test]
fn unregistered_type_is_written_anonymously() {
    let registry = Arc::new(ClassRegistry::new());
    let mut ba = buffer_with(&registry);
    ba.write_object(&point(1.0, 2.0)).unwrap();
    // anonymous dynamic trait with an empty alias
    assert_eq!(&ba.as_slice()[..3], &[0x0A, 0x0B, 0x01]);
}

#[test]
fn sealed_type_drops_undeclared_members() {
    let registry = Arc::new(ClassRegistry::new());
    registry.register(
        "com.example.Person",
        TypeDescriptor::new("Person").sealed_members(["name"]),
    );
    let person = AmfValue::object(
        AmfObject::typed("Person")
            .with("name", "Daan")
            .with("nickname", "D"),
    );

    let mut ba = buffer_with(&registry);
    ba.write_object(&person).unwrap();
    ba.set_position(0);
    let decoded = ba.read_object().unwrap();
    assert_eq!(decoded.get_string("name").as_deref(), Some("Daan"));
    assert!(decoded.get("nickname").is_none());
}

#[test]
fn externalizable_hooks_run_once_per_instance() {
    let externalizer = PointExternalizer::default();
    let writes = Arc::clone(&externalizer.writes);
    let reads = Arc::clone(&externalizer.reads);

    let registry = Arc::new(ClassRegistry::new());
    registry.register(
        "com.example.Point",
        TypeDescriptor::new("Point").externalizable(externalizer),
    );

    let shared = point(3.0, 4.0);
    let value = AmfValue::vector(AmfVector::object(
        "com.example.Point",
        vec![shared.clone(), point(5.0, 6.0), shared],
    ));

    let mut ba = buffer_with(&registry);
    ba.write_object(&value).unwrap();
    assert_eq!(writes.load(Ordering::SeqCst), 2);

    ba.set_position(0);
    let decoded = ba.read_object().unwrap();
    assert_eq!(reads.load(Ordering::SeqCst), 2);
    assert_eq!(decoded, value);
    assert_eq!(ba.bytes_available(), 0);
}

#[test]
fn externalizable_without_registration_is_an_error() {
    let writer = Arc::new(ClassRegistry::new());
    writer.register(
        "com.example.Point",
        TypeDescriptor::new("Point").externalizable(PointExternalizer::default()),
    );

    let mut ba = buffer_with(&writer);
    ba.write_object(&point(1.0, 1.0)).unwrap();

    ba.set_registry(Arc::new(ClassRegistry::new()));
    ba.set_position(0);
    match ba.read_object() {
        Err(AmfError::UnknownExternalizable(alias)) => assert_eq!(alias, "com.example.Point"),
        other => panic!("unexpected result: {other:?}"),
    }
}

/// Writes a run of short-lived arrays through the nested encoder
struct ScratchExternalizer;

const SCRATCH_LEN: i32 = 8;

impl Externalizable for ScratchExternalizer {
    fn write_external(&self, _object: &AmfObject, out: &mut Amf3Encoder<'_>) -> Result<()> {
        for i in 0..SCRATCH_LEN {
            // Each array is dropped before the next one is allocated
            out.encode(&AmfValue::from(vec![i, i * 10]))?;
        }
        Ok(())
    }

    fn read_external(&self, object: &mut AmfObject, input: &mut Amf3Decoder<'_>) -> Result<()> {
        for i in 0..SCRATCH_LEN {
            object.insert(i.to_string(), input.decode()?);
        }
        Ok(())
    }
}

#[test]
fn dropped_temporaries_are_never_written_as_references() {
    let registry = Arc::new(ClassRegistry::new());
    registry.register(
        "com.example.Scratch",
        TypeDescriptor::new("Scratch").externalizable(ScratchExternalizer),
    );

    let mut ba = buffer_with(&registry);
    ba.write_object(&AmfValue::object(AmfObject::typed("Scratch")))
        .unwrap();
    ba.set_position(0);
    let decoded = ba.read_object().unwrap();

    let items: Vec<AmfValue> = (0..SCRATCH_LEN)
        .map(|i| decoded.get(&i.to_string()).unwrap())
        .collect();
    for (i, item) in (0..SCRATCH_LEN).zip(&items) {
        assert_eq!(*item, AmfValue::from(vec![i, i * 10]));
    }
    for (n, item) in items.iter().enumerate() {
        assert!(items[n + 1..].iter().all(|other| !other.same_identity(item)));
    }
    assert_eq!(ba.bytes_available(), 0);
}

struct RejectingExternalizer;

impl Externalizable for RejectingExternalizer {
    fn write_external(&self, _object: &AmfObject, _out: &mut Amf3Encoder<'_>) -> Result<()> {
        Err(AmfError::External("refusing to write".into()))
    }

    fn read_external(&self, _object: &mut AmfObject, _input: &mut Amf3Decoder<'_>) -> Result<()> {
        Err(AmfError::External("refusing to read".into()))
    }
}

#[test]
fn hook_failures_propagate() {
    let registry = Arc::new(ClassRegistry::new());
    registry.register(
        "com.example.Secret",
        TypeDescriptor::new("Secret").externalizable(RejectingExternalizer),
    );

    let mut ba = buffer_with(&registry);
    let secret = AmfValue::object(AmfObject::typed("Secret"));
    assert!(matches!(
        ba.write_object(&secret),
        Err(AmfError::External(message)) if message == "refusing to write"
    ));
}
