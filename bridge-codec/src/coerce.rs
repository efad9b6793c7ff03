//! Primitive coercion rules.

use bridge_primitives::{CodecError, CodecResult, HostValue, PrimitiveKind};
use serde_json::{Number, Value};

/// Coerces `value` to `kind`, returning a scalar of that kind.
pub(crate) fn coerce(kind: PrimitiveKind, value: &HostValue) -> CodecResult<HostValue> {
    match kind {
        PrimitiveKind::Int => to_int(value).map(HostValue::Int),
        PrimitiveKind::Float => to_float(value).map(HostValue::Float),
        PrimitiveKind::String => Ok(HostValue::Str(value.to_string())),
        PrimitiveKind::Bool => Ok(HostValue::Bool(value.truthy())),
    }
}

/// Coerces a host value and renders it on the wire.
pub(crate) fn serialize(kind: PrimitiveKind, value: &HostValue) -> CodecResult<Value> {
    match coerce(kind, value)? {
        HostValue::Int(number) => Ok(Value::from(number)),
        HostValue::Float(number) => Number::from_f64(number)
            .map(Value::Number)
            .ok_or_else(|| CodecError::coercion(kind, number)),
        HostValue::Str(text) => Ok(Value::String(text)),
        HostValue::Bool(flag) => Ok(Value::Bool(flag)),
        other => Err(CodecError::coercion(kind, other)),
    }
}

/// Coerces wire data to a host scalar.
pub(crate) fn deserialize(kind: PrimitiveKind, wire: &Value) -> CodecResult<HostValue> {
    coerce(kind, &HostValue::from_json(wire))
}

fn to_int(value: &HostValue) -> CodecResult<i64> {
    let fail = || CodecError::coercion(PrimitiveKind::Int, value);
    match value {
        HostValue::Int(number) => Ok(*number),
        HostValue::Bool(flag) => Ok(i64::from(*flag)),
        HostValue::Float(number) => float_to_int(*number).ok_or_else(fail),
        HostValue::Str(text) => text.trim().parse::<i64>().map_err(|_| fail()),
        _ => Err(fail()),
    }
}

#[allow(clippy::cast_precision_loss)]
fn to_float(value: &HostValue) -> CodecResult<f64> {
    let fail = || CodecError::coercion(PrimitiveKind::Float, value);
    match value {
        HostValue::Float(number) => Ok(*number),
        HostValue::Int(number) => Ok(*number as f64),
        HostValue::Bool(flag) => Ok(f64::from(u8::from(*flag))),
        HostValue::Str(text) => text.trim().parse::<f64>().map_err(|_| fail()),
        _ => Err(fail()),
    }
}

/// Truncates toward zero; `None` when the result does not fit in `i64`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn float_to_int(number: f64) -> Option<i64> {
    let truncated = number.trunc();
    let lower = i64::MIN as f64;
    (number.is_finite() && truncated >= lower && truncated < -lower).then(|| truncated as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn primitives_round_trip() {
        let samples = [
            (PrimitiveKind::Int, HostValue::Int(-42)),
            (PrimitiveKind::Float, HostValue::Float(2.5)),
            (PrimitiveKind::Float, HostValue::Float(3.0)),
            (PrimitiveKind::String, HostValue::from("hello")),
            (PrimitiveKind::Bool, HostValue::Bool(true)),
            (PrimitiveKind::Bool, HostValue::Bool(false)),
        ];
        for (kind, value) in samples {
            let wire = serialize(kind, &value).expect("serialize");
            assert_eq!(deserialize(kind, &wire).expect("deserialize"), value);
        }
    }

    #[test]
    fn numeric_coercion_casts() {
        assert_eq!(deserialize(PrimitiveKind::Int, &json!("3")).unwrap(), HostValue::Int(3));
        assert_eq!(deserialize(PrimitiveKind::Int, &json!(3.9)).unwrap(), HostValue::Int(3));
        assert_eq!(deserialize(PrimitiveKind::Int, &json!(-3.9)).unwrap(), HostValue::Int(-3));
        assert_eq!(deserialize(PrimitiveKind::Int, &json!(true)).unwrap(), HostValue::Int(1));
        assert_eq!(
            deserialize(PrimitiveKind::Float, &json!(" 1.5 ")).unwrap(),
            HostValue::Float(1.5)
        );
        assert_eq!(deserialize(PrimitiveKind::Float, &json!(2)).unwrap(), HostValue::Float(2.0));
    }

    #[test]
    fn non_coercible_input_fails() {
        for wire in [json!("abc"), json!("3.5"), json!(null), json!([1]), json!({"a": 1})] {
            let err = deserialize(PrimitiveKind::Int, &wire).expect_err("int coercion");
            assert!(matches!(err, CodecError::Coercion { kind: PrimitiveKind::Int, .. }));
        }
        assert!(deserialize(PrimitiveKind::Float, &json!("nope")).is_err());
        assert!(serialize(PrimitiveKind::Float, &HostValue::Float(f64::NAN)).is_err());
        assert!(serialize(PrimitiveKind::Int, &HostValue::Float(1e300)).is_err());
    }

    #[test]
    fn string_and_bool_never_fail() {
        assert_eq!(serialize(PrimitiveKind::String, &HostValue::Int(7)).unwrap(), json!("7"));
        assert_eq!(
            serialize(PrimitiveKind::String, &HostValue::Float(2.0)).unwrap(),
            json!("2.0")
        );
        assert_eq!(deserialize(PrimitiveKind::Bool, &json!("")).unwrap(), HostValue::Bool(false));
        assert_eq!(deserialize(PrimitiveKind::Bool, &json!(0)).unwrap(), HostValue::Bool(false));
        assert_eq!(deserialize(PrimitiveKind::Bool, &json!([0])).unwrap(), HostValue::Bool(true));
    }
}
