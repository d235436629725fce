//! # Promo Payload
//!
//! Plaintext record sealed inside a promo code.
//!
//! Layout: one byte field count, then per field a big-endian `u16` length
//! followed by that many UTF-8 bytes. Field order is
//! promo_text, promoter_id, restaurant_id, post_id, dish_id. Records with
//! four fields predate dish ids and decode with an empty `dish_id`.

use serde::{Deserialize, Serialize};

use super::errors::{CodecError, CodecResult};

const FIELD_NAMES: [&str; 5] = [
    "promo_text",
    "promoter_id",
    "restaurant_id",
    "post_id",
    "dish_id",
];

const MIN_FIELDS: usize = 4;

/// Identity tuple carried by a promo code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoFields {
    pub promo_text: String,
    pub promoter_id: String,
    pub restaurant_id: String,
    pub post_id: String,
    #[serde(default)]
    pub dish_id: String,
}

impl PromoFields {
    pub fn new(
        promo_text: impl Into<String>,
        promoter_id: impl Into<String>,
        restaurant_id: impl Into<String>,
        post_id: impl Into<String>,
    ) -> Self {
        Self {
            promo_text: promo_text.into(),
            promoter_id: promoter_id.into(),
            restaurant_id: restaurant_id.into(),
            post_id: post_id.into(),
            dish_id: String::new(),
        }
    }

    pub fn with_dish(mut self, dish_id: impl Into<String>) -> Self {
        self.dish_id = dish_id.into();
        self
    }

    fn fields(&self) -> [&str; 5] {
        [
            &self.promo_text,
            &self.promoter_id,
            &self.restaurant_id,
            &self.post_id,
            &self.dish_id,
        ]
    }

    /// Serialize to the length-prefixed record
    pub fn to_record(&self) -> CodecResult<Vec<u8>> {
        let fields = self.fields();
        let capacity = 1 + fields.iter().map(|f| 2 + f.len()).sum::<usize>();
        let mut out = Vec::with_capacity(capacity);
        out.push(fields.len() as u8);

        for (name, value) in FIELD_NAMES.into_iter().zip(fields) {
            let len = u16::try_from(value.len()).map_err(|_| CodecError::FieldTooLong(name))?;
            out.extend_from_slice(&len.to_be_bytes());
            out.extend_from_slice(value.as_bytes());
        }

        Ok(out)
    }

    /// Parse a length-prefixed record
    pub fn from_record(record: &[u8]) -> CodecResult<Self> {
        let (&count, mut rest) = record
            .split_first()
            .ok_or_else(|| CodecError::MalformedPayload("empty record".to_string()))?;
        let count = count as usize;

        if count < MIN_FIELDS {
            return Err(CodecError::MissingFields(count));
        }
        if count > FIELD_NAMES.len() {
            return Err(CodecError::MalformedPayload(format!(
                "unexpected field count {}",
                count
            )));
        }

        let mut values = Vec::with_capacity(FIELD_NAMES.len());
        for name in FIELD_NAMES.iter().take(count) {
            if rest.len() < 2 {
                return Err(CodecError::MalformedPayload(format!(
                    "missing length for {}",
                    name
                )));
            }
            let (len_bytes, tail) = rest.split_at(2);
            let len = u16::from_be_bytes([len_bytes[0], len_bytes[1]]) as usize;
            if tail.len() < len {
                return Err(CodecError::MalformedPayload(format!("{} is truncated", name)));
            }
            let (value, tail) = tail.split_at(len);
            let value = std::str::from_utf8(value)
                .map_err(|_| CodecError::MalformedPayload(format!("{} is not UTF-8", name)))?;
            values.push(value.to_string());
            rest = tail;
        }

        if !rest.is_empty() {
            return Err(CodecError::MalformedPayload("trailing bytes".to_string()));
        }

        let mut values = values.into_iter();
        let mut next = || values.next().unwrap_or_default();
        Ok(Self {
            promo_text: next(),
            promoter_id: next(),
            restaurant_id: next(),
            post_id: next(),
            dish_id: next(),
        })
    }
}
