//! Missingness-preserving label encoding

use crate::error::{GridFillError, Result};
use serde::{Deserialize, Serialize};

/// Default label written for values that could not be filled
pub const DEFAULT_PLACEHOLDER: &str = "MISSING";

/// Code <-> token table for one categorical field.
///
/// Tokens are stored sorted, so a token's code is its position in
/// lexicographic order. The placeholder is part of the table whenever the
/// field had absent entries, but absent entries are never encoded as its code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecTable {
    field: String,
    placeholder: String,
    tokens: Vec<String>,
}

impl CodecTable {
    /// Field this table was built for
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Tokens ordered by code
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Code assigned to `token`, if any
    pub fn code_of(&self, token: &str) -> Option<u32> {
        self.tokens
            .binary_search_by(|t| t.as_str().cmp(token))
            .ok()
            .map(|i| i as u32)
    }

    /// Token for `code`
    pub fn token_of(&self, code: u32) -> Result<&str> {
        self.tokens
            .get(code as usize)
            .map(String::as_str)
            .ok_or_else(|| self.unknown(code.to_string()))
    }

    /// Interpret a grid value as a code and look it up.
    ///
    /// Only finite non-negative whole numbers can be codes.
    pub fn token_of_value(&self, value: f64) -> Result<&str> {
        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
            return Err(self.unknown(value.to_string()));
        }
        self.token_of(value as u32)
    }

    fn unknown(&self, code: String) -> GridFillError {
        GridFillError::UnknownCode {
            field: self.field.clone(),
            code,
        }
    }
}

/// Reversible integer encoding of string fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalCodec {
    placeholder: String,
}

impl Default for CategoricalCodec {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER)
    }
}

impl CategoricalCodec {
    /// Create a codec with the given placeholder label
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
        }
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Encode raw tokens. Absent and empty entries map to `None`.
    pub fn encode(&self, field: &str, values: &[Option<&str>]) -> (Vec<Option<u32>>, CodecTable) {
        let mut has_missing = false;
        let mut tokens: Vec<String> = Vec::new();

        for value in values {
            match value {
                Some(token) if !token.is_empty() => tokens.push((*token).to_string()),
                _ => has_missing = true,
            }
        }
        if has_missing {
            tokens.push(self.placeholder.clone());
        }
        tokens.sort_unstable();
        tokens.dedup();

        let table = CodecTable {
            field: field.to_string(),
            placeholder: self.placeholder.clone(),
            tokens,
        };

        let codes = values
            .iter()
            .map(|value| match value {
                Some(token) if !token.is_empty() => table.code_of(token),
                _ => None,
            })
            .collect();

        (codes, table)
    }

    /// Decode codes back to tokens. `None` decodes to the placeholder label.
    pub fn decode(&self, codes: &[Option<u32>], table: &CodecTable) -> Result<Vec<String>> {
        codes
            .iter()
            .map(|code| match code {
                Some(code) => table.token_of(*code).map(str::to_string),
                None => Ok(table.placeholder().to_string()),
            })
            .collect()
    }

    /// Decode grid values (codes stored as `f64`)
    pub fn decode_values(&self, values: &[Option<f64>], table: &CodecTable) -> Result<Vec<String>> {
        values
            .iter()
            .map(|value| match value {
                Some(v) => table.token_of_value(*v).map(str::to_string),
                None => Ok(table.placeholder().to_string()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexicographic_codes() {
        let codec = CategoricalCodec::default();
        let values = vec![Some("NR"), Some("LTE"), None, Some("NR"), Some("")];
        let (codes, table) = codec.encode("NETWORK_TYPE", &values);

        assert_eq!(table.tokens(), &["LTE", "MISSING", "NR"]);
        assert_eq!(codes, vec![Some(2), Some(0), None, Some(2), None]);
    }

    #[test]
    fn test_round_trip_and_placeholder() {
        let codec = CategoricalCodec::default();
        let values = vec![Some("n41"), None, Some("n78"), Some("n1")];
        let (codes, table) = codec.encode("NR_BAND", &values);

        let decoded = codec.decode(&codes, &table).unwrap();
        assert_eq!(decoded, vec!["n41", "MISSING", "n78", "n1"]);
    }

    #[test]
    fn test_code_zero_distinct_from_missing() {
        let codec = CategoricalCodec::default();
        let (codes, table) = codec.encode("f", &[Some("A"), None]);

        assert_eq!(codes[0], Some(0));
        assert_eq!(codes[1], None);
        assert_eq!(codec.decode(&codes, &table).unwrap(), vec!["A", "MISSING"]);
    }

    #[test]
    fn test_no_placeholder_without_missing() {
        let codec = CategoricalCodec::new("NA");
        let (_, table) = codec.encode("f", &[Some("b"), Some("a")]);
        assert_eq!(table.tokens(), &["a", "b"]);
        assert_eq!(table.code_of("NA"), None);
    }

    #[test]
    fn test_deterministic_across_input_order() {
        let codec = CategoricalCodec::default();
        let (_, t1) = codec.encode("f", &[Some("z"), Some("a"), Some("m")]);
        let (_, t2) = codec.encode("f", &[Some("m"), Some("z"), Some("a")]);
        assert_eq!(t1, t2);
    }

    #[test]
    fn test_unknown_code() {
        let codec = CategoricalCodec::default();
        let (_, table) = codec.encode("f", &[Some("a")]);

        let err = codec.decode(&[Some(3)], &table).unwrap_err();
        assert!(matches!(err, GridFillError::UnknownCode { ref field, .. } if field == "f"));

        assert!(codec.decode_values(&[Some(0.5)], &table).is_err());
        assert!(codec.decode_values(&[Some(-1.0)], &table).is_err());
        assert_eq!(codec.decode_values(&[Some(0.0), None], &table).unwrap(), vec!["a", "MISSING"]);
    }

    #[test]
    fn test_table_serialize() {
        let codec = CategoricalCodec::default();
        let (_, table) = codec.encode("f", &[Some("b"), Some("a")]);
        let json = serde_json::to_string(&table).unwrap();
        let back: CodecTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}
