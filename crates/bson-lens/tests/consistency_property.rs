//! Property tests: the three access modes must agree on any document.

mod common;

use std::collections::HashMap;

use bson_lens::{
    decode_document, decode_partial, index_document, skip_value, value_size, BsonValue,
    FieldMatcher,
};
use bson_lens_buffers::Reader;
use common::DocBuilder;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Scalar {
    Null,
    Bool(bool),
    I32(i32),
    I64(i64),
    F64(f64),
    Str(String),
    Date(i64),
}

fn scalar_strategy() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        Just(Scalar::Null),
        any::<bool>().prop_map(Scalar::Bool),
        any::<i32>().prop_map(Scalar::I32),
        any::<i64>().prop_map(Scalar::I64),
        (-1.0e12f64..1.0e12).prop_map(Scalar::F64),
        "[a-z0-9 ]{0,12}".prop_map(Scalar::Str),
        any::<i64>().prop_map(Scalar::Date),
    ]
}

fn doc_strategy() -> impl Strategy<Value = HashMap<String, Scalar>> {
    prop::collection::hash_map("[a-z]{1,8}", scalar_strategy(), 0..10)
}

/// Encodes the model with field names in sorted order.
fn encode(model: &HashMap<String, Scalar>) -> Vec<u8> {
    let mut names: Vec<&String> = model.keys().collect();
    names.sort();
    let mut b = DocBuilder::new();
    for name in names {
        b = match &model[name] {
            Scalar::Null => b.null(name),
            Scalar::Bool(v) => b.boolean(name, *v),
            Scalar::I32(v) => b.int32(name, *v),
            Scalar::I64(v) => b.int64(name, *v),
            Scalar::F64(v) => b.double(name, *v),
            Scalar::Str(v) => b.string(name, v),
            Scalar::Date(v) => b.datetime(name, *v),
        };
    }
    b.finish()
}

fn expected(scalar: &Scalar) -> BsonValue {
    match scalar {
        Scalar::Null => BsonValue::Null,
        Scalar::Bool(v) => BsonValue::Boolean(*v),
        Scalar::I32(v) => BsonValue::Int32(*v),
        Scalar::I64(v) => BsonValue::Int64(*v),
        Scalar::F64(v) => BsonValue::Double(*v),
        Scalar::Str(v) => BsonValue::Str(v.clone()),
        Scalar::Date(v) => BsonValue::DateTime(*v),
    }
}

proptest! {
    #[test]
    fn eager_decode_matches_the_model(model in doc_strategy()) {
        let bytes = encode(&model);
        let decoded = decode_document(&bytes).unwrap();
        prop_assert_eq!(decoded.len(), model.len());
        for (name, scalar) in &model {
            prop_assert_eq!(&decoded[name], &expected(scalar));
        }
    }

    #[test]
    fn indexed_reads_match_eager(model in doc_strategy()) {
        let bytes = encode(&model);
        let eager = decode_document(&bytes).unwrap();
        let indexed = index_document(&bytes).unwrap();
        prop_assert_eq!(indexed.len(), eager.len());
        for (name, value) in &eager {
            prop_assert!(indexed.contains(name));
            prop_assert_eq!(indexed.value(name).unwrap(), value);
            // Idempotence: a second read returns the identical cached value.
            prop_assert_eq!(indexed.value(name).unwrap(), value);
        }
    }

    #[test]
    fn partial_matches_eager_restriction(model in doc_strategy()) {
        let bytes = encode(&model);
        let eager = decode_document(&bytes).unwrap();
        let mut names: Vec<String> = model.keys().cloned().collect();
        names.sort();
        let subset: Vec<String> = names.into_iter().step_by(2).collect();
        let matcher = FieldMatcher::new(subset.clone());
        let full = decode_partial(&bytes, &matcher, false).unwrap();
        let lazy = decode_partial(&bytes, &matcher, true).unwrap();
        prop_assert_eq!(&full, &lazy);
        prop_assert_eq!(full.len(), subset.len());
        for name in &subset {
            prop_assert_eq!(&full[name], &eager[name]);
        }
    }

    #[test]
    fn skip_and_size_agree_for_every_element(model in doc_strategy()) {
        let bytes = encode(&model);
        let mut r = Reader::new(&bytes);
        let declared = r.i32_le().unwrap() as usize;
        loop {
            let type_byte = r.u8().unwrap();
            if type_byte == 0x00 {
                break;
            }
            r.take_until_nul().unwrap();
            let at = r.pos();
            let size = value_size(&bytes, at, type_byte).unwrap();
            skip_value(&mut r, type_byte).unwrap();
            prop_assert_eq!(r.pos() - at, size);
        }
        prop_assert_eq!(r.pos(), declared);
    }
}
