//! End-to-end encode/decode coverage exercising the format as an external
//! caller would: through the crate's public surface only.

use pretty_assertions::assert_eq;

use serime::{
    decode, deep_equal, encode, ConstructorEntry, DecoderConfig, EncoderConfig, Error, FunctionSource,
    PropertyEntry, PropertyKey, Value,
};

fn rt(value: &Value) -> Value {
    rt_with_constructors(value, &[])
}

fn rt_with_constructors(value: &Value, constructors: &[ConstructorEntry]) -> Value {
    let text = encode(value, EncoderConfig::default()).expect("encode should succeed");
    decode(&text, constructors, DecoderConfig::default()).expect("decode should succeed")
}

#[test]
fn scalars_round_trip_byte_for_byte() {
    for value in [
        Value::Null,
        Value::Undefined,
        Value::Bool(false),
        Value::Bool(true),
        Value::Number(-12.5),
        Value::Number(f64::NAN),
        Value::String("hello, world".to_string()),
    ] {
        let decoded = rt(&value);
        assert!(deep_equal(&value, &decoded), "{value:?} did not round-trip");
    }
}

#[test]
fn signed_zero_survives_the_reference_manager() {
    let decoded = rt(&Value::Number(-0.0));
    let Value::Number(n) = decoded else { panic!("expected number") };
    assert!(n.is_sign_negative());
    assert_eq!(n, 0.0);
}

#[test]
fn an_object_graph_with_shared_values_decodes_without_duplicating_payload() {
    let shared = Value::String("shared".to_string());
    let root = Value::object();
    if let Value::Object(h) = &root {
        let mut data = h.borrow_mut();
        data.entries.push((
            PropertyKey::String("first".to_string()),
            PropertyEntry::new(shared.clone(), Default::default()),
        ));
        data.entries.push((
            PropertyKey::String("second".to_string()),
            PropertyEntry::new(shared, Default::default()),
        ));
    }

    let text = encode(&root, EncoderConfig::default()).unwrap();
    assert_eq!(text.matches("shared").count(), 1, "shared string should only be written once: {text}");

    let decoded = rt(&root);
    assert!(deep_equal(&root, &decoded));
}

#[test]
fn a_self_referential_object_round_trips_as_a_real_cycle() {
    let root = Value::object();
    if let Value::Object(h) = &root {
        h.borrow_mut()
            .entries
            .push((PropertyKey::String("self".to_string()), PropertyEntry::new(root.clone(), Default::default())));
    }

    let decoded = rt(&root);
    let Value::Object(h) = &decoded else { panic!("expected object") };
    let inner = &h.borrow().entries[0].1.value;
    let Value::Object(inner_h) = inner else { panic!("expected object") };
    assert!(std::rc::Rc::ptr_eq(h, inner_h), "decoded cycle should point back at itself");

    assert!(deep_equal(&root, &decoded));
}

#[test]
fn arrays_preserve_order_without_an_explicit_index_key() {
    let arr = Value::array();
    if let Value::Array(h) = &arr {
        let mut data = h.borrow_mut();
        for n in [3.0, 1.0, 2.0] {
            data.elements.push(PropertyEntry::new(Value::Number(n), Default::default()));
        }
    }
    let decoded = rt(&arr);
    let Value::Array(h) = decoded else { panic!("expected array") };
    let data = h.borrow();
    let got: Vec<f64> = data
        .elements
        .iter()
        .map(|e| match e.value {
            Value::Number(n) => n,
            _ => panic!("expected number"),
        })
        .collect();
    assert_eq!(got, vec![3.0, 1.0, 2.0]);
}

#[test]
fn custom_instances_round_trip_their_class_name_through_the_dependency_table() {
    let a = Value::custom("Vector3");
    if let Value::Custom(h) = &a {
        h.borrow_mut().entries.push((
            PropertyKey::String("x".to_string()),
            PropertyEntry::new(Value::Number(1.0), Default::default()),
        ));
    }
    let decoded = rt_with_constructors(&a, &[ConstructorEntry::new("Vector3")]);
    let Value::Custom(h) = decoded else { panic!("expected custom instance") };
    assert_eq!(h.borrow().class_name, "Vector3");
}

#[test]
fn custom_class_names_with_reserved_characters_round_trip_through_the_prelude() {
    let name = "Foo,Bar:Baz";
    let a = Value::custom(name);
    let decoded = rt_with_constructors(&a, &[ConstructorEntry::new(name)]);
    let Value::Custom(h) = decoded else { panic!("expected custom instance") };
    assert_eq!(h.borrow().class_name, name);
}

#[test]
fn custom_instance_decode_fails_when_caller_does_not_supply_the_constructor() {
    let a = Value::custom("Vector3");
    let text = encode(&a, EncoderConfig::default()).unwrap();
    assert!(matches!(decode(&text, &[], DecoderConfig::default()), Err(Error::DecodeReference(_))));
}

#[test]
fn bigints_and_timestamps_and_symbols_round_trip() {
    use chrono::{TimeZone, Utc};
    use serime::Value::{BigInt as VBigInt, Symbol as VSymbol, Timestamp as VTimestamp};

    let big = VBigInt(num_bigint::BigInt::parse_bytes(b"123456789012345678901234567890", 10).unwrap());
    assert!(deep_equal(&big, &rt(&big)));

    let ts = VTimestamp(Utc.with_ymd_and_hms(2020, 6, 15, 12, 30, 0).unwrap());
    assert!(deep_equal(&ts, &rt(&ts)));

    let sym = VSymbol(serime::symbol::WellKnownSymbol::Iterator);
    assert!(deep_equal(&sym, &rt(&sym)));
}

#[test]
fn mappings_preserve_shared_keys_across_entries() {
    let key = Value::String("shared-key".to_string());
    let mapping = Value::mapping();
    if let Value::Mapping(h) = &mapping {
        let mut data = h.borrow_mut();
        data.entries.push((key.clone(), PropertyEntry::new(Value::Number(1.0), Default::default())));
        data.entries.push((key, PropertyEntry::new(Value::Number(2.0), Default::default())));
    }
    let text = encode(&mapping, EncoderConfig::default()).unwrap();
    assert_eq!(text.matches("shared-key").count(), 1, "shared mapping key should be written once: {text}");

    let decoded = rt(&mapping);
    assert!(deep_equal(&mapping, &decoded));
}

#[test]
fn sets_preserve_elements_and_reuse_the_element_encoding_as_its_own_key() {
    let set = Value::set();
    if let Value::Set(h) = &set {
        let mut data = h.borrow_mut();
        data.elements.push(PropertyEntry::new(Value::String("a".to_string()), Default::default()));
        data.elements.push(PropertyEntry::new(Value::String("b".to_string()), Default::default()));
    }
    let decoded = rt(&set);
    assert!(deep_equal(&set, &decoded));
}

#[test]
fn descriptor_and_accessibility_flags_survive_the_round_trip() {
    use serime::flags::{ObjectAccessibilityFlags, PropertyDescriptorFlags};

    let obj = Value::object();
    if let Value::Object(h) = &obj {
        let mut data = h.borrow_mut();
        data.accessibility = ObjectAccessibilityFlags::FROZEN | ObjectAccessibilityFlags::SEALED;
        data.entries.push((
            PropertyKey::String("x".to_string()),
            PropertyEntry::new(Value::Number(1.0), PropertyDescriptorFlags::CONFIGURABLE | PropertyDescriptorFlags::ENUMERABLE),
        ));
    }
    let decoded = rt(&obj);
    let Value::Object(h) = decoded else { panic!("expected object") };
    let data = h.borrow();
    assert_eq!(data.accessibility, ObjectAccessibilityFlags::FROZEN | ObjectAccessibilityFlags::SEALED);
    assert_eq!(
        data.entries[0].1.descriptor,
        PropertyDescriptorFlags::CONFIGURABLE | PropertyDescriptorFlags::ENUMERABLE
    );
}

#[test]
fn duplicate_dependency_names_are_rejected_at_decode_time() {
    let err = decode(
        "$Point,Point:$0%0|{}",
        &[ConstructorEntry::new("Point")],
        DecoderConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::DecodeReference(_)));
}

#[test]
fn references_are_compacted_to_0_k_in_first_declaration_order() {
    let shared_a = Value::String("alpha".to_string());
    let shared_b = Value::String("beta".to_string());
    let obj = Value::object();
    if let Value::Object(h) = &obj {
        let mut data = h.borrow_mut();
        data.entries.push((PropertyKey::String("a1".to_string()), PropertyEntry::new(shared_a.clone(), Default::default())));
        data.entries.push((PropertyKey::String("b1".to_string()), PropertyEntry::new(shared_b.clone(), Default::default())));
        data.entries.push((PropertyKey::String("a2".to_string()), PropertyEntry::new(shared_a, Default::default())));
        data.entries.push((PropertyKey::String("b2".to_string()), PropertyEntry::new(shared_b, Default::default())));
    }
    let text = encode(&obj, EncoderConfig::default()).unwrap();
    assert!(text.contains("@0=1|alpha"), "expected first declared id to be 0: {text}");
    assert!(text.contains("@1=1|beta"), "expected second declared id to be 1: {text}");
    assert!(text.contains("#0"));
    assert!(text.contains("#1"));
}

#[test]
fn functions_never_evaluate_and_are_gated_by_config_on_both_sides() {
    let f = Value::Function(FunctionSource {
        name: "add".to_string(),
        source: "function add(a, b) { return a + b; }".to_string(),
    });

    assert!(encode(&f, EncoderConfig::default()).is_err());

    let mut enc_cfg = EncoderConfig::default();
    enc_cfg.functions = true;
    let text = encode(&f, enc_cfg).unwrap();

    assert!(decode(&text, &[], DecoderConfig::default()).is_err());

    let mut dec_cfg = DecoderConfig::default();
    dec_cfg.functions = true;
    let decoded = decode(&text, &[], dec_cfg).unwrap();
    let Value::Function(source) = decoded else { panic!("expected function") };
    assert_eq!(source.name, "add");
    assert_eq!(source.source, "function add(a, b) { return a + b; }");
}

#[test]
fn an_unbound_reference_is_a_decode_error_not_a_panic() {
    assert!(decode("#42", &[], DecoderConfig::default()).is_err());
}
