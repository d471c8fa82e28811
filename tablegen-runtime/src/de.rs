//! Positional serde deserializers over CSV row tokens.
//!
//! A record struct is rebuilt without knowing its field names: the row is
//! presented to its `Deserialize` impl as a sequence, and every token is
//! coerced according to the type the field asks for. This is the runtime
//! half of the contract with the extractor, which writes one token per
//! struct field in declaration order.

use std::str::FromStr;

use serde::de::{DeserializeOwned, DeserializeSeed, Deserializer, SeqAccess, Visitor};
use serde::forward_to_deserialize_any;
use thiserror::Error;

use crate::error::CoerceError;

/// Leading character that marks a key token as a raw string.
pub const RAW_KEY_PREFIX: char = 'r';

/// Strip exactly one character from each end of `token`.
pub(crate) fn unquote(token: &str) -> Result<&str, CoerceError> {
    let mut chars = token.chars();
    match (chars.next(), chars.next_back()) {
        (Some(_), Some(_)) => Ok(chars.as_str()),
        _ => Err(CoerceError::Unquoted {
            token: token.to_owned(),
        }),
    }
}

macro_rules! deserialize_parsed {
    ($($method:ident => $visit:ident($ty:ty);)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
                visitor.$visit(self.parse::<$ty>(stringify!($ty))?)
            }
        )*
    };
}

macro_rules! deserialize_unsupported {
    ($($method:ident($($arg:ident: $ty:ty),*) => $kind:literal;)*) => {
        $(
            fn $method<V: Visitor<'de>>(
                self,
                $($arg: $ty,)*
                _visitor: V,
            ) -> Result<V::Value, Self::Error> {
                $(let _ = $arg;)*
                Err(CoerceError::Unsupported($kind))
            }
        )*
    };
}

/// Deserializer for one field token.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TokenDeserializer<'a> {
    token: &'a str,
}

impl<'a> TokenDeserializer<'a> {
    pub(crate) fn new(token: &'a str) -> Self {
        Self { token }
    }

    fn parse<T: FromStr>(&self, kind: &'static str) -> Result<T, CoerceError> {
        self.token
            .parse()
            .map_err(|_| CoerceError::parse(self.token, kind))
    }
}

impl<'de> Deserializer<'de> for TokenDeserializer<'_> {
    type Error = CoerceError;

    /// Self-describing fallback: infer the kind from the token's shape.
    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        let token = self.token;
        if token.starts_with('"') {
            return visitor.visit_str(unquote(token)?);
        }
        if let Ok(flag) = token.parse::<bool>() {
            return visitor.visit_bool(flag);
        }
        if let Ok(int) = token.parse::<i64>() {
            return visitor.visit_i64(int);
        }
        if let Ok(int) = token.parse::<u64>() {
            return visitor.visit_u64(int);
        }
        if let Ok(float) = token.parse::<f64>() {
            return visitor.visit_f64(float);
        }
        visitor.visit_str(token)
    }

    deserialize_parsed! {
        deserialize_bool => visit_bool(bool);
        deserialize_i8 => visit_i8(i8);
        deserialize_i16 => visit_i16(i16);
        deserialize_i32 => visit_i32(i32);
        deserialize_i64 => visit_i64(i64);
        deserialize_i128 => visit_i128(i128);
        deserialize_u8 => visit_u8(u8);
        deserialize_u16 => visit_u16(u16);
        deserialize_u32 => visit_u32(u32);
        deserialize_u64 => visit_u64(u64);
        deserialize_u128 => visit_u128(u128);
        deserialize_f32 => visit_f32(f32);
        deserialize_f64 => visit_f64(f64);
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        let inner = unquote(self.token)?;
        let mut chars = inner.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => visitor.visit_char(ch),
            _ => Err(CoerceError::NotAChar {
                token: self.token.to_owned(),
            }),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_str(unquote(self.token)?)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_str(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        if self.token.is_empty() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }

    deserialize_unsupported! {
        deserialize_bytes() => "bytes";
        deserialize_byte_buf() => "bytes";
        deserialize_unit() => "unit";
        deserialize_unit_struct(name: &'static str) => "unit struct";
        deserialize_seq() => "sequence";
        deserialize_tuple(len: usize) => "tuple";
        deserialize_tuple_struct(name: &'static str, len: usize) => "tuple struct";
        deserialize_map() => "map";
        deserialize_struct(name: &'static str, fields: &'static [&'static str]) => "struct";
        deserialize_enum(name: &'static str, variants: &'static [&'static str]) => "enum";
        deserialize_identifier() => "identifier";
    }
}

/// Deserializer for the field columns of one row (everything after the key).
#[derive(Debug, Clone, Copy)]
pub(crate) struct RowDeserializer<'a> {
    tokens: &'a [&'a str],
}

impl<'a> RowDeserializer<'a> {
    pub(crate) fn new(tokens: &'a [&'a str]) -> Self {
        Self { tokens }
    }
}

impl<'de> Deserializer<'de> for RowDeserializer<'_> {
    type Error = CoerceError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_seq(RowAccess {
            tokens: self.tokens.iter().enumerate(),
        })
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self.tokens {
            [token] => visitor
                .visit_newtype_struct(TokenDeserializer::new(token))
                .map_err(|err| err.at_field(0)),
            _ => self.deserialize_any(visitor),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct seq tuple tuple_struct map
        struct enum identifier ignored_any
    }
}

struct RowAccess<'a> {
    tokens: std::iter::Enumerate<std::slice::Iter<'a, &'a str>>,
}

impl<'de> SeqAccess<'de> for RowAccess<'_> {
    type Error = CoerceError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, Self::Error> {
        match self.tokens.next() {
            Some((field, token)) => seed
                .deserialize(TokenDeserializer::new(token))
                .map(Some)
                .map_err(|err| err.at_field(field)),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.tokens.len())
    }
}

enum Key<'a> {
    Str(&'a str),
    Int(i64),
}

/// Deserializer for the key column.
///
/// The key kind is decided by the token alone: a leading
/// [`RAW_KEY_PREFIX`] marks a string key, anything else is a base-10
/// integer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct KeyDeserializer<'a> {
    token: &'a str,
}

impl<'a> KeyDeserializer<'a> {
    pub(crate) fn new(token: &'a str) -> Self {
        Self { token }
    }

    fn is_raw(&self) -> bool {
        self.token.starts_with(RAW_KEY_PREFIX)
    }

    fn classify(&self) -> Result<Key<'a>, CoerceError> {
        match self.token.strip_prefix(RAW_KEY_PREFIX) {
            Some(quoted) => unquote(quoted)
                .map(Key::Str)
                .map_err(|_| CoerceError::Unquoted {
                    token: self.token.to_owned(),
                }),
            None => self
                .token
                .parse()
                .map(Key::Int)
                .map_err(|_| CoerceError::parse(self.token, "integer key")),
        }
    }

    fn integer(&self) -> Result<TokenDeserializer<'a>, CoerceError> {
        if self.is_raw() {
            return Err(CoerceError::KeyKind {
                token: self.token.to_owned(),
                expected: "integer",
            });
        }
        Ok(TokenDeserializer::new(self.token))
    }
}

macro_rules! deserialize_integer_key {
    ($($method:ident)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
                self.integer()?.$method(visitor)
            }
        )*
    };
}

impl<'de> Deserializer<'de> for KeyDeserializer<'_> {
    type Error = CoerceError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.classify()? {
            Key::Str(text) => visitor.visit_str(text),
            Key::Int(int) => visitor.visit_i64(int),
        }
    }

    deserialize_integer_key! {
        deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64 deserialize_i128
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64 deserialize_u128
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.classify()? {
            Key::Str(text) => visitor.visit_str(text),
            Key::Int(_) => Err(CoerceError::KeyKind {
                token: self.token.to_owned(),
                expected: "string",
            }),
        }
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_str(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    forward_to_deserialize_any! {
        bool f32 f64 char bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

#[derive(Debug, Error)]
enum ProbeError {
    #[error("record has {0} fields")]
    Arity(usize),
    #[error("{0}")]
    Other(String),
}

impl serde::de::Error for ProbeError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        Self::Other(msg.to_string())
    }
}

/// Deserializer that never produces a value; it only reports how many
/// fields the record type asks for.
struct Probe;

impl<'de> Deserializer<'de> for Probe {
    type Error = ProbeError;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(ProbeError::Other("expected a struct or tuple struct".into()))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        Err(ProbeError::Arity(fields.len()))
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        len: usize,
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        Err(ProbeError::Arity(len))
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        len: usize,
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        Err(ProbeError::Arity(len))
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        Err(ProbeError::Arity(1))
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct seq map enum identifier ignored_any
    }
}

/// Number of positional fields `T`'s `Deserialize` impl reads.
pub(crate) fn field_count<T: DeserializeOwned>() -> Result<usize, String> {
    match T::deserialize(Probe) {
        Err(ProbeError::Arity(count)) => Ok(count),
        Err(ProbeError::Other(reason)) => Err(reason),
        Ok(_) => Err("type deserialized without reading any field".into()),
    }
}
