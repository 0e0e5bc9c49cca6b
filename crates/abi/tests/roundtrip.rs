//! Property tests: generated scalar tuples survive both codecs.

use proptest::prelude::*;
use solabi::{BigInt, TupleType, Value};

#[derive(Clone, Debug)]
struct Case {
    descriptor: &'static str,
    value: Value,
}

fn scalar_case() -> impl Strategy<Value = Case> {
    prop_oneof![
        any::<bool>().prop_map(|b| Case { descriptor: "bool", value: Value::Bool(b) }),
        (-128i64..=127).prop_map(|v| Case { descriptor: "int8", value: Value::Int(v) }),
        any::<i64>().prop_map(|v| Case { descriptor: "int64", value: Value::Int(v) }),
        any::<u32>().prop_map(|v| {
            Case { descriptor: "uint32", value: Value::Uint(u64::from(v)) }
        }),
        any::<u64>().prop_map(|v| Case { descriptor: "uint64", value: Value::Uint(v) }),
        any::<i128>().prop_map(|v| {
            Case { descriptor: "int256", value: Value::BigInt(BigInt::from(v)) }
        }),
        any::<u128>().prop_map(|v| {
            Case { descriptor: "uint128", value: Value::BigInt(BigInt::from(v)) }
        }),
        proptest::collection::vec(any::<u8>(), 0..=80)
            .prop_map(|b| Case { descriptor: "bytes", value: Value::Bytes(b) }),
        proptest::collection::vec(any::<u8>(), 4)
            .prop_map(|b| Case { descriptor: "bytes4", value: Value::FixedBytes(b) }),
        "[a-z]{0,12}".prop_map(|s| Case { descriptor: "string", value: Value::String(s) }),
    ]
}

proptest! {
    #[test]
    fn standard_roundtrip(cases in proptest::collection::vec(scalar_case(), 0..6)) {
        let descriptor = format!(
            "({})",
            cases.iter().map(|c| c.descriptor).collect::<Vec<_>>().join(",")
        );
        let tuple = TupleType::parse(&descriptor).unwrap();
        let values: Vec<Value> = cases.iter().map(|c| c.value.clone()).collect();
        let encoded = tuple.encode(&values).unwrap();
        prop_assert_eq!(tuple.decode(&encoded).unwrap(), values);
    }

    #[test]
    fn packed_roundtrip_single_dynamic(
        head in proptest::collection::vec(scalar_case(), 0..4),
        payload in proptest::collection::vec(any::<u8>(), 0..40),
    ) {
        // static scalars followed by one dynamic element
        let mut parts: Vec<&str> =
            head.iter().filter(|c| !matches!(c.descriptor, "bytes" | "string")).map(|c| c.descriptor).collect();
        parts.push("bytes");
        let descriptor = format!("({})", parts.join(","));
        let tuple = TupleType::parse(&descriptor).unwrap();

        let mut values: Vec<Value> = head
            .iter()
            .filter(|c| !matches!(c.descriptor, "bytes" | "string"))
            .map(|c| c.value.clone())
            .collect();
        values.push(Value::Bytes(payload));

        let encoded = tuple.encode_packed(&values).unwrap();
        prop_assert_eq!(tuple.decode_packed(&encoded).unwrap(), values);
    }
}
