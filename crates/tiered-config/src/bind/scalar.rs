//! `Bind` implementations for scalars and std containers.
//!
//! Coercion is weak: strings parse into numbers and booleans, numbers and
//! booleans render into strings. An empty string is the zero value, and a
//! single value binds into a sequence as one element. `null` leaves scalars
//! untouched.

use super::{Bind, Binder};
use crate::UnmarshalError;
use serde_json::{Number, Value};
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::path::PathBuf;
use std::str::FromStr;

impl Bind for Value {
    fn bind(&mut self, value: &Value, _binder: &Binder<'_>) -> Result<(), UnmarshalError> {
        self.clone_from(value);
        Ok(())
    }
}

impl Bind for String {
    fn bind(&mut self, value: &Value, binder: &Binder<'_>) -> Result<(), UnmarshalError> {
        match value {
            Value::Null => {}
            Value::String(text) => self.clone_from(text),
            Value::Number(number) => *self = number.to_string(),
            Value::Bool(flag) => *self = flag.to_string(),
            other => return Err(binder.mismatch("string", other)),
        }
        Ok(())
    }
}

impl Bind for PathBuf {
    fn bind(&mut self, value: &Value, binder: &Binder<'_>) -> Result<(), UnmarshalError> {
        match value {
            Value::Null => {}
            Value::String(text) => *self = PathBuf::from(text),
            other => return Err(binder.mismatch("path", other)),
        }
        Ok(())
    }
}

impl Bind for bool {
    fn bind(&mut self, value: &Value, binder: &Binder<'_>) -> Result<(), UnmarshalError> {
        match value {
            Value::Null => {}
            Value::Bool(flag) => *self = *flag,
            Value::Number(number) => *self = number.as_f64().is_some_and(|n| n != 0.0),
            Value::String(text) => {
                *self = parse_bool(text).ok_or_else(|| {
                    binder.invalid("bool", format!("unrecognized boolean '{text}'"))
                })?;
            }
            other => return Err(binder.mismatch("bool", other)),
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Some(true),
        "" | "0" | "f" | "false" => Some(false),
        _ => None,
    }
}

fn bind_integer<T>(
    slot: &mut T,
    value: &Value,
    binder: &Binder<'_>,
    expected: &'static str,
) -> Result<(), UnmarshalError>
where
    T: TryFrom<i64> + TryFrom<u64> + FromStr + From<bool>,
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Value::Null => {}
        Value::Bool(flag) => *slot = <T as From<bool>>::from(*flag),
        Value::Number(number) => *slot = integer_from_number(number, binder, expected)?,
        Value::String(text) if text.trim().is_empty() => *slot = <T as From<bool>>::from(false),
        Value::String(text) => {
            *slot = text
                .trim()
                .parse()
                .map_err(|err| binder.invalid(expected, err))?;
        }
        other => return Err(binder.mismatch(expected, other)),
    }
    Ok(())
}

fn integer_from_number<T>(
    number: &Number,
    binder: &Binder<'_>,
    expected: &'static str,
) -> Result<T, UnmarshalError>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    if let Some(int) = number.as_i64() {
        return <T as TryFrom<i64>>::try_from(int).map_err(|_| binder.out_of_range(expected));
    }
    if let Some(uint) = number.as_u64() {
        return <T as TryFrom<u64>>::try_from(uint).map_err(|_| binder.out_of_range(expected));
    }
    let float = number.as_f64().unwrap_or(f64::NAN);
    if float.fract() != 0.0 || !float.is_finite() {
        return Err(binder.invalid(expected, format!("{float} is not a whole number")));
    }
    // Both bounds are exact powers of two; casts below them cannot saturate.
    if (0.0..U64_END).contains(&float) {
        <T as TryFrom<u64>>::try_from(float as u64).map_err(|_| binder.out_of_range(expected))
    } else if (I64_START..0.0).contains(&float) {
        <T as TryFrom<i64>>::try_from(float as i64).map_err(|_| binder.out_of_range(expected))
    } else {
        Err(binder.out_of_range(expected))
    }
}

/// 2^64, one past `u64::MAX`.
const U64_END: f64 = 18_446_744_073_709_551_616.0;
/// -2^63, exactly `i64::MIN`.
const I64_START: f64 = -9_223_372_036_854_775_808.0;

macro_rules! bind_integers {
    ($($ty:ty),*) => {
        $(
            impl Bind for $ty {
                fn bind(&mut self, value: &Value, binder: &Binder<'_>) -> Result<(), UnmarshalError> {
                    bind_integer(self, value, binder, stringify!($ty))
                }
            }
        )*
    };
}

bind_integers!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! bind_floats {
    ($($ty:ty),*) => {
        $(
            impl Bind for $ty {
                fn bind(&mut self, value: &Value, binder: &Binder<'_>) -> Result<(), UnmarshalError> {
                    match value {
                        Value::Null => {}
                        Value::Bool(flag) => *self = if *flag { 1.0 } else { 0.0 },
                        Value::Number(number) => {
                            let float = number
                                .as_f64()
                                .ok_or_else(|| binder.out_of_range(stringify!($ty)))?;
                            *self = float as $ty;
                        }
                        Value::String(text) if text.trim().is_empty() => *self = 0.0,
                        Value::String(text) => {
                            *self = text
                                .trim()
                                .parse()
                                .map_err(|err| binder.invalid(stringify!($ty), err))?;
                        }
                        other => return Err(binder.mismatch(stringify!($ty), other)),
                    }
                    Ok(())
                }
            }
        )*
    };
}

bind_floats!(f32, f64);

impl<T: Bind + Default> Bind for Option<T> {
    fn bind(&mut self, value: &Value, binder: &Binder<'_>) -> Result<(), UnmarshalError> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        self.get_or_insert_with(T::default).bind(value, binder)
    }
}

impl<T: Bind + ?Sized> Bind for Box<T> {
    fn bind(&mut self, value: &Value, binder: &Binder<'_>) -> Result<(), UnmarshalError> {
        (**self).bind(value, binder)
    }
}

impl<T: Bind + Default> Bind for Vec<T> {
    fn bind(&mut self, value: &Value, binder: &Binder<'_>) -> Result<(), UnmarshalError> {
        match value {
            Value::Null => Ok(()),
            Value::Array(items) => {
                let mut bound = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let mut slot = T::default();
                    slot.bind(item, &binder.descend(&index.to_string()))?;
                    bound.push(slot);
                }
                *self = bound;
                Ok(())
            }
            Value::Object(map) if map.is_empty() => {
                self.clear();
                Ok(())
            }
            single => {
                let mut slot = T::default();
                slot.bind(single, binder)?;
                *self = vec![slot];
                Ok(())
            }
        }
    }
}

impl<T, S> Bind for HashMap<String, T, S>
where
    T: Bind + Default,
    S: BuildHasher,
{
    fn bind(&mut self, value: &Value, binder: &Binder<'_>) -> Result<(), UnmarshalError> {
        let map = match value {
            Value::Null => return Ok(()),
            Value::Object(map) => map,
            other => return Err(binder.mismatch("mapping", other)),
        };
        for (key, item) in map {
            self.entry(key.clone())
                .or_default()
                .bind(item, &binder.descend(key))?;
        }
        Ok(())
    }
}

impl<T: Bind + Default> Bind for BTreeMap<String, T> {
    fn bind(&mut self, value: &Value, binder: &Binder<'_>) -> Result<(), UnmarshalError> {
        let map = match value {
            Value::Null => return Ok(()),
            Value::Object(map) => map,
            other => return Err(binder.mismatch("mapping", other)),
        };
        for (key, item) in map {
            self.entry(key.clone())
                .or_default()
                .bind(item, &binder.descend(key))?;
        }
        Ok(())
    }
}
