use crate::common::{Document, Value};
use crate::errors::{ArtemisError, ArtemisResult, ErrorKind};

/// Conversion between a Rust type and its [Value] representation.
///
/// Entities implement it (usually with `#[derive(Convertible)]`) to be mapped
/// to and from store documents; field types implement it so the derived code
/// can convert each field.
pub trait Convertible {
    type Output;

    fn to_value(&self) -> ArtemisResult<Value>;
    fn from_value(value: &Value) -> ArtemisResult<Self::Output>;
}

/// Converts a [Value] into `T`; used by derived code.
#[inline]
pub fn from_value<T: Convertible<Output = T>>(value: &Value) -> ArtemisResult<T> {
    T::from_value(value)
}

fn mapping_error(value: &Value, expected: &str) -> ArtemisError {
    log::error!("Value {} is not {}", value, expected);
    ArtemisError::new(
        &format!("Value {} is not {}", value, expected),
        ErrorKind::ObjectMappingError,
    )
}

macro_rules! convertible_integer {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl Convertible for $ty {
                type Output = $ty;

                fn to_value(&self) -> ArtemisResult<Value> {
                    Ok(Value::I64(*self as i64))
                }

                fn from_value(value: &Value) -> ArtemisResult<Self> {
                    match value {
                        Value::I64(i) => <$ty>::try_from(*i).map_err(|_| mapping_error(value, $name)),
                        _ => Err(mapping_error(value, $name)),
                    }
                }
            }
        )*
    };
}

convertible_integer!(i8 => "an i8", i16 => "an i16", i32 => "an i32", u8 => "a u8", u16 => "a u16", u32 => "a u32");

impl Convertible for i64 {
    type Output = i64;

    fn to_value(&self) -> ArtemisResult<Value> {
        Ok(Value::I64(*self))
    }

    fn from_value(value: &Value) -> ArtemisResult<Self> {
        value.as_i64().ok_or_else(|| mapping_error(value, "an i64"))
    }
}

impl Convertible for u64 {
    type Output = u64;

    fn to_value(&self) -> ArtemisResult<Value> {
        i64::try_from(*self)
            .map(Value::I64)
            .map_err(|_| mapping_error(&Value::F64(*self as f64), "representable as i64"))
    }

    fn from_value(value: &Value) -> ArtemisResult<Self> {
        match value {
            Value::I64(i) => u64::try_from(*i).map_err(|_| mapping_error(value, "a u64")),
            _ => Err(mapping_error(value, "a u64")),
        }
    }
}

impl Convertible for f64 {
    type Output = f64;

    fn to_value(&self) -> ArtemisResult<Value> {
        Ok(Value::F64(*self))
    }

    fn from_value(value: &Value) -> ArtemisResult<Self> {
        value.as_f64().ok_or_else(|| mapping_error(value, "an f64"))
    }
}

impl Convertible for f32 {
    type Output = f32;

    fn to_value(&self) -> ArtemisResult<Value> {
        Ok(Value::F64(*self as f64))
    }

    fn from_value(value: &Value) -> ArtemisResult<Self> {
        value
            .as_f64()
            .map(|f| f as f32)
            .ok_or_else(|| mapping_error(value, "an f32"))
    }
}

impl Convertible for bool {
    type Output = bool;

    fn to_value(&self) -> ArtemisResult<Value> {
        Ok(Value::Bool(*self))
    }

    fn from_value(value: &Value) -> ArtemisResult<Self> {
        value.as_bool().ok_or_else(|| mapping_error(value, "a bool"))
    }
}

impl Convertible for String {
    type Output = String;

    fn to_value(&self) -> ArtemisResult<Value> {
        Ok(Value::String(self.clone()))
    }

    fn from_value(value: &Value) -> ArtemisResult<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mapping_error(value, "a string"))
    }
}

impl Convertible for Document {
    type Output = Document;

    fn to_value(&self) -> ArtemisResult<Value> {
        Ok(Value::Document(self.clone()))
    }

    fn from_value(value: &Value) -> ArtemisResult<Self> {
        value
            .as_document()
            .cloned()
            .ok_or_else(|| mapping_error(value, "a document"))
    }
}

impl Convertible for Value {
    type Output = Value;

    fn to_value(&self) -> ArtemisResult<Value> {
        Ok(self.clone())
    }

    fn from_value(value: &Value) -> ArtemisResult<Self> {
        Ok(value.clone())
    }
}

impl<T> Convertible for Option<T>
where
    T: Convertible<Output = T>,
{
    type Output = Option<T>;

    fn to_value(&self) -> ArtemisResult<Value> {
        match self {
            Some(v) => v.to_value(),
            None => Ok(Value::Null),
        }
    }

    fn from_value(value: &Value) -> ArtemisResult<Self::Output> {
        match value {
            Value::Null => Ok(None),
            v => T::from_value(v).map(Some),
        }
    }
}

impl<T> Convertible for Vec<T>
where
    T: Convertible<Output = T>,
{
    type Output = Vec<T>;

    fn to_value(&self) -> ArtemisResult<Value> {
        self.iter()
            .map(Convertible::to_value)
            .collect::<ArtemisResult<Vec<_>>>()
            .map(Value::Array)
    }

    fn from_value(value: &Value) -> ArtemisResult<Self::Output> {
        match value {
            Value::Array(items) => items.iter().map(T::from_value).collect(),
            Value::Null => Ok(Vec::new()),
            _ => Err(mapping_error(value, "an array")),
        }
    }
}
