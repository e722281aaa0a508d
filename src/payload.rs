//! Payload shapes for each operation kind.

use prost_types::value::Kind;
use prost_types::{ListValue, Value};

use crate::error::{BenchError, Result};
use crate::params::{self, Param};
use crate::OperationKind;

/// Printable byte used to fill byte-string payloads.
pub const FILLER: u8 = b'0';

#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Number(f64),
    List(Vec<f64>),
    Bytes(Vec<u8>),
    /// One nested field of a map-valued entry.
    Field { field: Vec<u8>, value: f64 },
}

impl Payload {
    pub fn kind(&self) -> OperationKind {
        match self {
            Payload::Number(_) => OperationKind::Scalar,
            Payload::List(_) => OperationKind::ListAppend,
            Payload::Bytes(_) => OperationKind::ByteString,
            Payload::Field { .. } => OperationKind::NestedField,
        }
    }

    /// Bytes of user data carried by one request with this payload.
    pub fn data_len(&self) -> u64 {
        match self {
            Payload::Number(_) => 8,
            Payload::List(values) => values.len() as u64 * 8,
            Payload::Bytes(bytes) => bytes.len() as u64,
            Payload::Field { field, .. } => field.len() as u64 + 8,
        }
    }

    /// The value envelope sent on the wire.
    ///
    /// For a nested field this is the field's value; the field name travels in
    /// its own request slot.
    pub fn into_value(self) -> Result<Value> {
        let kind = match self {
            Payload::Number(v) | Payload::Field { value: v, .. } => Kind::NumberValue(v),
            Payload::List(values) => Kind::ListValue(ListValue {
                values: values.into_iter().map(number).collect(),
            }),
            Payload::Bytes(bytes) => {
                let s = String::from_utf8(bytes)
                    .map_err(|e| BenchError::Request(format!("byte payload is not UTF-8: {e}")))?;
                Kind::StringValue(s)
            }
        };
        Ok(Value { kind: Some(kind) })
    }
}

pub fn number(v: f64) -> Value {
    Value {
        kind: Some(Kind::NumberValue(v)),
    }
}

/// Builds the payload for `kind`.
///
/// Sizes the process cannot allocate are reported against the parameter that
/// set them.
pub fn build(kind: OperationKind, size: u64, seed: f64) -> Result<Payload> {
    match kind {
        OperationKind::Scalar => Ok(Payload::Number(seed)),
        OperationKind::ListAppend => list(size, seed),
        OperationKind::ByteString => bytes(size),
        OperationKind::NestedField => Ok(field(0, seed)),
    }
}

fn alloc<T>(param: &Param, size: u64) -> Result<Vec<T>> {
    let value = size.to_string();
    let len = usize::try_from(size).map_err(|e| BenchError::config(param.name, &value, e))?;
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|e| BenchError::config(param.name, &value, e))?;
    Ok(buf)
}

/// `seed, seed + 1, ..., seed + size - 1`.
pub fn list(size: u64, seed: f64) -> Result<Payload> {
    let mut values = alloc(&params::LIST_SIZE, size)?;
    values.extend((0..size).map(|i| seed + i as f64));
    Ok(Payload::List(values))
}

pub fn bytes(size: u64) -> Result<Payload> {
    let mut buf = alloc(&params::BYTE_SZ, size)?;
    buf.resize(size as usize, FILLER);
    Ok(Payload::Bytes(buf))
}

/// The nested-field entry for one sweep index.
pub fn field(index: u64, seed: f64) -> Payload {
    Payload::Field {
        field: index.to_string().into_bytes(),
        value: seed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_values_follow_seed() {
        let p = build(OperationKind::ListAppend, 5, 42.0).unwrap();
        assert_eq!(p, Payload::List(vec![42.0, 43.0, 44.0, 45.0, 46.0]));
    }

    #[test]
    fn test_list_length_matches_size() {
        for size in [1u64, 2, 17, 1000] {
            match build(OperationKind::ListAppend, size, -3.5).unwrap() {
                Payload::List(v) => {
                    assert_eq!(v.len() as u64, size);
                    assert_eq!(v[0], -3.5);
                    assert_eq!(v[v.len() - 1], -3.5 + (size - 1) as f64);
                }
                other => panic!("unexpected payload: {other:?}"),
            }
        }
    }

    #[test]
    fn test_bytes_exact_length_without_nul() {
        for size in [0u64, 1, 3, 64, 4096, 65_537] {
            match build(OperationKind::ByteString, size, 0.0).unwrap() {
                Payload::Bytes(b) => {
                    assert_eq!(b.len() as u64, size);
                    assert!(!b.contains(&0));
                }
                other => panic!("unexpected payload: {other:?}"),
            }
        }
    }

    #[test]
    fn test_unallocatable_sizes_are_config_errors() {
        for (kind, name) in [
            (OperationKind::ByteString, "ENV_BYTE_SZ"),
            (OperationKind::ListAppend, "ENV_LIST_SIZE"),
        ] {
            match build(kind, u64::MAX, 0.0).unwrap_err() {
                BenchError::Config { name: n, value, .. } => {
                    assert_eq!(n, name);
                    assert_eq!(value, u64::MAX.to_string());
                }
                other => panic!("unexpected error: {other}"),
            }
        }
        // Sizes are ignored where they do not shape the payload.
        assert!(build(OperationKind::Scalar, u64::MAX, 0.0).is_ok());
        assert!(build(OperationKind::NestedField, u64::MAX, 0.0).is_ok());
    }

    #[test]
    fn test_default_byte_size_is_one_filler_byte() {
        let params = crate::params::BenchParams::from_lookup(|_| None).unwrap();
        assert_eq!(
            build(OperationKind::ByteString, params.byte_size, 42.0).unwrap(),
            Payload::Bytes(vec![FILLER])
        );
    }

    #[test]
    fn test_scalar_ignores_size() {
        let small = build(OperationKind::Scalar, 0, 7.25).unwrap();
        let large = build(OperationKind::Scalar, 1000, 7.25).unwrap();
        assert_eq!(small, large);
        assert_eq!(small, Payload::Number(7.25));
    }

    #[test]
    fn test_field_key_is_decimal_index() {
        assert_eq!(
            field(12, 42.0),
            Payload::Field {
                field: b"12".to_vec(),
                value: 42.0
            }
        );
        assert_eq!(build(OperationKind::NestedField, 99, 1.0).unwrap(), field(0, 1.0));
    }

    #[test]
    fn test_payload_kind_matches_operation() {
        for kind in [
            OperationKind::Scalar,
            OperationKind::ListAppend,
            OperationKind::ByteString,
            OperationKind::NestedField,
        ] {
            assert_eq!(build(kind, 3, 0.0).unwrap().kind(), kind);
        }
    }

    #[test]
    fn test_into_value_shapes() {
        let v = build(OperationKind::ListAppend, 2, 1.0).unwrap().into_value().unwrap();
        match v.kind {
            Some(Kind::ListValue(l)) => {
                assert_eq!(l.values, vec![number(1.0), number(2.0)]);
            }
            other => panic!("unexpected kind: {other:?}"),
        }

        let v = bytes(4).unwrap().into_value().unwrap();
        assert_eq!(v.kind, Some(Kind::StringValue("0000".to_string())));

        let v = field(3, 9.0).into_value().unwrap();
        assert_eq!(v, number(9.0));
    }
}
