//! SKU and batch identifier formats.
//!
//! A batch id encodes the batch number and the position of an item inside
//! that batch, both zero padded: `B001-004` is the fourth item of batch 1.
//! A SKU chains the grade, the location, the batch id and an optional
//! warehouse tag with `-` separators:
//!
//! ```text
//! LN-DEN001-B001-004        grade, location, batch id
//! LN-DEN001-B001-004-A12    ... plus warehouse tag
//! ```
//!
//! Locations and tags are restricted to ASCII alphanumerics so the fields
//! can always be recovered by splitting on `-`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{core::grade::Grade, error::BatchError};

const BATCH_ID_MARKER: char = 'B';

/// Position of an item: batch number plus item number within the batch.
///
/// # Examples
///
/// ```
/// use sku_batch_rs::core::sku::BatchId;
///
/// let id = BatchId::new(1, 4);
/// assert_eq!(id.to_string(), "B001-004");
/// assert!(id.to_string().starts_with(&BatchId::batch_prefix(1)));
/// assert_eq!("B001-004".parse::<BatchId>().unwrap(), id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BatchId {
    pub batch_number: u32,
    pub item_number: u32,
}

impl BatchId {
    pub fn new(batch_number: u32, item_number: u32) -> Self {
        Self {
            batch_number,
            item_number,
        }
    }

    /// The string every batch id of `batch_number` starts with.
    pub fn batch_prefix(batch_number: u32) -> String {
        format!("{}{:03}-", BATCH_ID_MARKER, batch_number)
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:03}-{:03}",
            BATCH_ID_MARKER, self.batch_number, self.item_number
        )
    }
}

impl FromStr for BatchId {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || BatchError::Validation(format!("malformed batch id: {:?}", s));

        let rest = s.trim().strip_prefix(BATCH_ID_MARKER).ok_or_else(malformed)?;
        let (batch, item) = rest.split_once('-').ok_or_else(malformed)?;

        let parse_part = |part: &str| -> Result<u32, BatchError> {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            part.parse::<u32>().map_err(|_| malformed())
        };

        Ok(BatchId::new(parse_part(batch)?, parse_part(item)?))
    }
}

impl TryFrom<String> for BatchId {
    type Error = BatchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BatchId> for String {
    fn from(id: BatchId) -> Self {
        id.to_string()
    }
}

/// Checks that a location or warehouse tag can be embedded in a SKU.
pub fn validate_token(field: &str, value: &str) -> Result<(), BatchError> {
    if value.is_empty() {
        return Err(BatchError::Validation(format!("{} must not be empty", field)));
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(BatchError::Validation(format!(
            "{} must only contain ASCII letters and digits: {:?}",
            field, value
        )));
    }
    Ok(())
}

/// The decoded fields of a SKU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sku {
    pub grade: Grade,
    pub location: String,
    pub batch_id: BatchId,
    pub warehouse_tag: Option<String>,
}

impl Sku {
    /// Builds a SKU after validating the location and tag.
    pub fn new(
        grade: Grade,
        location: &str,
        batch_id: BatchId,
        warehouse_tag: Option<&str>,
    ) -> Result<Self, BatchError> {
        validate_token("location", location)?;
        if let Some(tag) = warehouse_tag {
            validate_token("warehouse tag", tag)?;
        }

        Ok(Self {
            grade,
            location: location.to_string(),
            batch_id,
            warehouse_tag: warehouse_tag.map(str::to_string),
        })
    }

    /// Recovers the fields of a formatted SKU.
    ///
    /// # Examples
    ///
    /// ```
    /// use sku_batch_rs::core::{grade::Grade, sku::Sku};
    ///
    /// let sku = Sku::parse("VG-DEN001-B002-017-A12").unwrap();
    /// assert_eq!(sku.grade, Grade::VeryGood);
    /// assert_eq!(sku.location, "DEN001");
    /// assert_eq!(sku.batch_id.batch_number, 2);
    /// assert_eq!(sku.batch_id.item_number, 17);
    /// assert_eq!(sku.warehouse_tag.as_deref(), Some("A12"));
    /// ```
    pub fn parse(s: &str) -> Result<Self, BatchError> {
        let parts: Vec<&str> = s.trim().split('-').collect();
        if parts.len() != 4 && parts.len() != 5 {
            return Err(BatchError::Validation(format!("malformed SKU: {:?}", s)));
        }

        let grade = parts[0].parse::<Grade>()?;
        let batch_id = format!("{}-{}", parts[2], parts[3]).parse::<BatchId>()?;

        Sku::new(grade, parts[1], batch_id, parts.get(4).copied())
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.grade, self.location, self.batch_id)?;
        if let Some(tag) = &self.warehouse_tag {
            write!(f, "-{}", tag)?;
        }
        Ok(())
    }
}

/// Formats a SKU from raw inputs.
///
/// Pure and deterministic. Fails with [`BatchError::InvalidGrade`] when
/// `grade` is not a recognised code and with [`BatchError::Validation`]
/// when the location or tag cannot be embedded.
///
/// # Examples
///
/// ```
/// use sku_batch_rs::core::sku::{generate_sku, BatchId};
///
/// let sku = generate_sku("LN", "DEN001", &BatchId::new(1, 4), None).unwrap();
/// assert_eq!(sku, "LN-DEN001-B001-004");
///
/// let sku = generate_sku("ac", "DEN001", &BatchId::new(12, 50), Some("A12")).unwrap();
/// assert_eq!(sku, "AC-DEN001-B012-050-A12");
/// ```
pub fn generate_sku(
    grade: &str,
    location: &str,
    batch_id: &BatchId,
    warehouse_tag: Option<&str>,
) -> Result<String, BatchError> {
    let grade = grade.parse::<Grade>()?;
    Ok(Sku::new(grade, location, *batch_id, warehouse_tag)?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_give_same_sku() -> Result<(), BatchError> {
        let batch_id = BatchId::new(3, 9);
        for grade in Grade::ALL {
            let first = generate_sku(grade.code(), "DEN001", &batch_id, Some("C4"))?;
            let second = generate_sku(grade.code(), "DEN001", &batch_id, Some("C4"))?;
            assert_eq!(first, second);
            assert!(first.starts_with(grade.code()));
        }
        Ok(())
    }

    #[test]
    fn invalid_grade_is_rejected() {
        let result = generate_sku("XX", "DEN001", &BatchId::new(1, 1), None);
        assert!(matches!(result, Err(BatchError::InvalidGrade(_))));
    }

    #[test]
    fn location_with_separator_is_rejected() {
        let result = generate_sku("LN", "DEN-001", &BatchId::new(1, 1), None);
        assert!(matches!(result, Err(BatchError::Validation(_))));

        let result = generate_sku("LN", "DEN001", &BatchId::new(1, 1), Some(""));
        assert!(matches!(result, Err(BatchError::Validation(_))));
    }

    #[test]
    fn sku_fields_are_recoverable() -> Result<(), BatchError> {
        let original = Sku::new(Grade::Salvage, "PHX2", BatchId::new(1000, 7), None)?;
        let text = original.to_string();
        assert_eq!(text, "SA-PHX2-B1000-007");
        assert_eq!(Sku::parse(&text)?, original);
        Ok(())
    }

    #[test]
    fn malformed_batch_ids_are_rejected() {
        for input in ["", "001-004", "B001", "B-004", "B001-", "B0x1-004", "B001-+4"] {
            assert!(input.parse::<BatchId>().is_err(), "accepted {:?}", input);
        }
    }

    #[test]
    fn batch_prefix_does_not_match_other_batches() {
        let prefix = BatchId::batch_prefix(1);
        assert!(BatchId::new(1, 50).to_string().starts_with(&prefix));
        assert!(!BatchId::new(11, 1).to_string().starts_with(&prefix));
        assert!(!BatchId::new(100, 1).to_string().starts_with(&prefix));
    }
}
