// every field is stored as canonical text, these types are what it can be read as
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
// used for decimal numbers
use bigdecimal::{BigDecimal, RoundingMode};
// canonical text of byte sequences and serialized objects
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

// used when parsing text into a typed value
use std::str::FromStr;
// used to print out readable forms of a data type
use std::fmt;
// used to let the byte wrapper behave like its contents
use std::ops;

use crate::error::{Result, RowfileError};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S%.f";

pub trait DataType: Sized {
    // static stuff which needs to be implemented downstream
    const DATA_TYPE: &'static str;
    fn decode(text: &str) -> Result<Self>;
    fn encode(&self) -> String;
    // instance callable with pre-made implementation
    fn data_type(&self) -> &'static str {
        Self::DATA_TYPE
    }
}

// ------------- Data Types --------------
impl DataType for String {
    const DATA_TYPE: &'static str = "String";
    fn decode(text: &str) -> Result<String> {
        Ok(text.to_owned())
    }
    fn encode(&self) -> String {
        self.clone()
    }
}

/// Numeric truthiness: anything that parses to a nonzero number is true,
/// everything else (zero, empty, garbage) is false.
impl DataType for bool {
    const DATA_TYPE: &'static str = "bool";
    fn decode(text: &str) -> Result<bool> {
        Ok(text
            .trim()
            .parse::<f64>()
            .map(|n| n != 0.0)
            .unwrap_or(false))
    }
    fn encode(&self) -> String {
        String::from(if *self { "1" } else { "0" })
    }
}

macro_rules! numeric_data_type {
    ($($ty:ty),+) => {
        $(
            impl DataType for $ty {
                const DATA_TYPE: &'static str = stringify!($ty);
                fn decode(text: &str) -> Result<$ty> {
                    text.trim()
                        .parse::<$ty>()
                        .map_err(|e| RowfileError::conversion(text, Self::DATA_TYPE, e))
                }
                fn encode(&self) -> String {
                    self.to_string()
                }
            }
        )+
    };
}
numeric_data_type!(i8, i16, i32, i64, f32, f64);

impl DataType for BigDecimal {
    const DATA_TYPE: &'static str = "Decimal";
    fn decode(text: &str) -> Result<BigDecimal> {
        BigDecimal::from_str(text.trim())
            .map_err(|e| RowfileError::conversion(text, Self::DATA_TYPE, e))
    }
    fn encode(&self) -> String {
        self.to_string()
    }
}

/// Decodes a decimal and brings it to exactly `scale` fractional digits,
/// rounding half up or padding with zeros.
pub fn decode_decimal_scaled(text: &str, scale: i64) -> Result<BigDecimal> {
    let decimal = BigDecimal::decode(text)?;
    Ok(decimal.with_scale_round(scale, RoundingMode::HalfUp))
}

impl DataType for NaiveDate {
    const DATA_TYPE: &'static str = "Date";
    fn decode(text: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
            .map_err(|e| RowfileError::conversion(text, Self::DATA_TYPE, e))
    }
    fn encode(&self) -> String {
        self.format(DATE_FORMAT).to_string()
    }
}
impl DataType for NaiveTime {
    const DATA_TYPE: &'static str = "Time";
    fn decode(text: &str) -> Result<NaiveTime> {
        NaiveTime::from_str(text.trim())
            .map_err(|e| RowfileError::conversion(text, Self::DATA_TYPE, e))
    }
    fn encode(&self) -> String {
        self.format(TIME_FORMAT).to_string()
    }
}
impl DataType for NaiveDateTime {
    const DATA_TYPE: &'static str = "Timestamp";
    fn decode(text: &str) -> Result<NaiveDateTime> {
        let trimmed = text.trim();
        let (date, time) = trimmed
            .split_once([' ', 'T'])
            .ok_or_else(|| RowfileError::conversion(text, Self::DATA_TYPE, "missing time part"))?;
        let date = NaiveDate::decode(date)
            .map_err(|_| RowfileError::conversion(text, Self::DATA_TYPE, "bad date part"))?;
        let time = NaiveTime::decode(time)
            .map_err(|_| RowfileError::conversion(text, Self::DATA_TYPE, "bad time part"))?;
        Ok(NaiveDateTime::new(date, time))
    }
    fn encode(&self) -> String {
        format!(
            "{} {}",
            self.format(DATE_FORMAT),
            self.format(TIME_FORMAT)
        )
    }
}
impl DataType for Url {
    const DATA_TYPE: &'static str = "Url";
    fn decode(text: &str) -> Result<Url> {
        Url::parse(text.trim()).map_err(|e| RowfileError::conversion(text, Self::DATA_TYPE, e))
    }
    fn encode(&self) -> String {
        self.as_str().to_owned()
    }
}

// Special types below
#[derive(Eq, PartialEq, Hash, Clone, Debug, Default)]
pub struct Bytes(Vec<u8>);

impl Bytes {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Bytes(bytes.into())
    }
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}
impl DataType for Bytes {
    const DATA_TYPE: &'static str = "Bytes";
    fn decode(text: &str) -> Result<Bytes> {
        STANDARD
            .decode(text.trim())
            .map(Bytes)
            .map_err(|e| RowfileError::conversion(text, Self::DATA_TYPE, e))
    }
    fn encode(&self) -> String {
        STANDARD.encode(&self.0)
    }
}
impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes(bytes)
    }
}
impl From<&[u8]> for Bytes {
    fn from(bytes: &[u8]) -> Self {
        Bytes(bytes.to_vec())
    }
}
impl fmt::Display for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}
impl ops::Deref for Bytes {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// ------------- Generic objects -------------
/// Serializes any object to JSON and stores the bytes base64 encoded.
pub fn encode_object<T: Serialize + ?Sized>(object: &T) -> Result<String> {
    let bytes = serde_json::to_vec(object)
        .map_err(|e| RowfileError::conversion("<object>", "Object", e))?;
    Ok(STANDARD.encode(bytes))
}

/// The reverse of [`encode_object`]; never applied implicitly.
pub fn decode_object<T: DeserializeOwned>(text: &str) -> Result<T> {
    let bytes = STANDARD
        .decode(text.trim())
        .map_err(|e| RowfileError::conversion(text, "Object", e))?;
    serde_json::from_slice(&bytes).map_err(|e| RowfileError::conversion(text, "Object", e))
}

/// Every value the generic "write native value" path recognizes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Decimal(BigDecimal),
    Bytes(Bytes),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    Url(Url),
    Object(serde_json::Value),
}

impl Value {
    /// Canonical text of the value.
    pub fn encode(&self) -> Result<String> {
        Ok(match self {
            Value::Text(v) => v.encode(),
            Value::Boolean(v) => v.encode(),
            Value::Byte(v) => v.encode(),
            Value::Short(v) => v.encode(),
            Value::Int(v) => v.encode(),
            Value::Long(v) => v.encode(),
            Value::Float(v) => v.encode(),
            Value::Double(v) => v.encode(),
            Value::Decimal(v) => v.encode(),
            Value::Bytes(v) => v.encode(),
            Value::Date(v) => v.encode(),
            Value::Time(v) => v.encode(),
            Value::Timestamp(v) => v.encode(),
            Value::Url(v) => v.encode(),
            Value::Object(v) => encode_object(v)?,
        })
    }
    pub fn data_type(&self) -> &'static str {
        match self {
            Value::Text(_) => String::DATA_TYPE,
            Value::Boolean(_) => bool::DATA_TYPE,
            Value::Byte(_) => i8::DATA_TYPE,
            Value::Short(_) => i16::DATA_TYPE,
            Value::Int(_) => i32::DATA_TYPE,
            Value::Long(_) => i64::DATA_TYPE,
            Value::Float(_) => f32::DATA_TYPE,
            Value::Double(_) => f64::DATA_TYPE,
            Value::Decimal(_) => BigDecimal::DATA_TYPE,
            Value::Bytes(_) => Bytes::DATA_TYPE,
            Value::Date(_) => NaiveDate::DATA_TYPE,
            Value::Time(_) => NaiveTime::DATA_TYPE,
            Value::Timestamp(_) => NaiveDateTime::DATA_TYPE,
            Value::Url(_) => Url::DATA_TYPE,
            Value::Object(_) => "Object",
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )+
    };
}
value_from!(
    String => Text,
    bool => Boolean,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    BigDecimal => Decimal,
    Bytes => Bytes,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => Timestamp,
    Url => Url,
    serde_json::Value => Object,
);
impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.encode() {
            Ok(text) => write!(f, "{}", text),
            Err(_) => write!(f, "?"),
        }
    }
}
