// Named typed accessors. Each one resolves the column, then runs one codec.
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use url::Url;

use crate::catalog::ColumnIndex;
use crate::cursor::RowCursor;
use crate::datatype::{Bytes, DataType, decode_decimal_scaled};
use crate::error::Result;

macro_rules! typed_accessors {
    ($($get:ident, $update:ident => $ty:ty;)+) => {
        impl RowCursor {
            $(
                pub fn $get<I: ColumnIndex>(&self, column: I) -> Result<$ty> {
                    self.get::<$ty, I>(column)
                }
                pub fn $update<I: ColumnIndex>(&mut self, column: I, value: $ty) -> Result<()> {
                    self.update_text(column, value.encode())
                }
            )+
        }
    };
}

typed_accessors! {
    get_boolean, update_boolean => bool;
    get_byte, update_byte => i8;
    get_short, update_short => i16;
    get_int, update_int => i32;
    get_long, update_long => i64;
    get_float, update_float => f32;
    get_double, update_double => f64;
    get_decimal, update_decimal => BigDecimal;
    get_date, update_date => NaiveDate;
    get_time, update_time => NaiveTime;
    get_timestamp, update_timestamp => NaiveDateTime;
    get_url, update_url => Url;
}

impl RowCursor {
    pub fn get_string<I: ColumnIndex>(&self, column: I) -> Result<String> {
        self.get::<String, I>(column)
    }
    pub fn update_string<I: ColumnIndex>(&mut self, column: I, value: &str) -> Result<()> {
        self.update_text(column, value)
    }
    pub fn get_bytes<I: ColumnIndex>(&self, column: I) -> Result<Vec<u8>> {
        self.get::<Bytes, I>(column).map(Bytes::into_inner)
    }
    pub fn update_bytes<I: ColumnIndex>(&mut self, column: I, value: &[u8]) -> Result<()> {
        self.update_text(column, Bytes::from(value).encode())
    }
    /// Decimal brought to exactly `scale` fractional digits.
    pub fn get_decimal_scaled<I: ColumnIndex>(&self, column: I, scale: i64) -> Result<BigDecimal> {
        decode_decimal_scaled(self.field(column)?.text(), scale)
    }
}
