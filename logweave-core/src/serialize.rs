//! Placeholder values and their conversion to display text.
//!
//! Scalars go through `Display` first and fall back to `Debug` when their
//! `Display` impl reports an error. Composites always go through `Debug`,
//! so a `Vec` or a user struct never collapses into a useless type name.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt::{self, Write as _};
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{LogError, LogResult};
use crate::level::Level;

/// A value with both a default string conversion and a structural form.
pub trait Scalar: fmt::Display + fmt::Debug {}

impl<T: fmt::Display + fmt::Debug + ?Sized> Scalar for T {}

/// A borrowed placeholder value, tagged with how it should be rendered.
#[derive(Clone, Copy)]
pub enum Value<'a> {
    /// Rendered with `Display`, falling back to `Debug`.
    Scalar(&'a dyn Scalar),
    /// Rendered with `Debug` only.
    Composite(&'a dyn fmt::Debug),
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(v) => f.debug_tuple("Scalar").field(v).finish(),
            Value::Composite(v) => f.debug_tuple("Composite").field(v).finish(),
        }
    }
}

/// Treat `value` as a scalar.
pub fn display<T: Scalar>(value: &T) -> Value<'_> {
    Value::Scalar(value)
}

/// Treat `value` as a composite and render it structurally.
pub fn inspect<T: fmt::Debug>(value: &T) -> Value<'_> {
    Value::Composite(value)
}

/// Conversion into a [`Value`], used by the `emit!` and `render!` macros.
pub trait IntoValue<'a> {
    fn into_value(self) -> Value<'a>;
}

impl<'a> IntoValue<'a> for &Value<'a> {
    fn into_value(self) -> Value<'a> {
        *self
    }
}

impl<'a, 'b> IntoValue<'a> for &'a &'b str {
    fn into_value(self) -> Value<'a> {
        Value::Scalar(self)
    }
}

macro_rules! scalar_values {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<'a> IntoValue<'a> for &'a $ty {
                fn into_value(self) -> Value<'a> {
                    Value::Scalar(self)
                }
            }

            impl<'a, 'b> IntoValue<'a> for &'a &'b $ty {
                fn into_value(self) -> Value<'a> {
                    Value::Scalar(*self)
                }
            }
        )*
    };
}

scalar_values!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    String, Box<str>, Arc<str>, Level,
);

impl<'a, 'b> IntoValue<'a> for &'a Cow<'b, str> {
    fn into_value(self) -> Value<'a> {
        Value::Scalar(self)
    }
}

impl<'a, 'b, T: fmt::Debug> IntoValue<'a> for &'a &'b [T] {
    fn into_value(self) -> Value<'a> {
        Value::Composite(self)
    }
}

impl<'a, T: fmt::Debug, const N: usize> IntoValue<'a> for &'a [T; N] {
    fn into_value(self) -> Value<'a> {
        Value::Composite(self)
    }
}

macro_rules! composite_values {
    ($(<$($param:ident),*> $ty:ty),* $(,)?) => {
        $(
            impl<'a, $($param: fmt::Debug),*> IntoValue<'a> for &'a $ty {
                fn into_value(self) -> Value<'a> {
                    Value::Composite(self)
                }
            }

            impl<'a, 'b, $($param: fmt::Debug),*> IntoValue<'a> for &'a &'b $ty {
                fn into_value(self) -> Value<'a> {
                    Value::Composite(*self)
                }
            }
        )*
    };
}

composite_values!(
    <> PathBuf,
    <T> Vec<T>,
    <T> Option<T>,
    <> (),
    <A> (A,),
    <A, B> (A, B),
    <A, B, C> (A, B, C),
    <A, B, C, D> (A, B, C, D),
    <A, B, C, D, E> (A, B, C, D, E),
    <A, B, C, D, E, G> (A, B, C, D, E, G),
    <T> VecDeque<T>,
    <T> BTreeSet<T>,
    <T> HashSet<T>,
    <K, V> BTreeMap<K, V>,
    <K, V> HashMap<K, V>,
);

/// Render a single placeholder.
pub fn serialize(value: Value<'_>) -> LogResult<String> {
    match value {
        Value::Composite(v) => {
            inspect_to_string(v).map_err(|inspect| LogError::Serialization {
                display: None,
                inspect,
            })
        }
        Value::Scalar(v) => {
            let mut out = String::new();
            match write!(out, "{}", v) {
                Ok(()) => Ok(out),
                Err(display) => inspect_to_string(v).map_err(|inspect| LogError::Serialization {
                    display: Some(display),
                    inspect,
                }),
            }
        }
    }
}

fn inspect_to_string<T: fmt::Debug + ?Sized>(value: &T) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write!(out, "{:?}", value)?;
    Ok(out)
}
