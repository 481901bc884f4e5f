use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{grade::Grade, sku::BatchId};

/// Number of columns in the inventory layout.
pub const COLUMN_COUNT: usize = 14;

/// Header row of the inventory layout, in column order.
pub const COLUMN_NAMES: [&str; COLUMN_COUNT] = [
    "SKU",
    "Grade",
    "Location",
    "Batch ID",
    "Warehouse Tag",
    "UPC",
    "Manufacturer",
    "Model",
    "Notes",
    "Timestamp",
    "Manifest ID",
    "Pallet ID",
    "Unit ID",
    "PID-UID",
];

/// One physical item in the inventory.
///
/// Fields are declared in column order; the serde names are the header
/// names of the inventory file. Optional fields are `None` in memory and an
/// empty cell on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "SKU")]
    pub sku: String,
    #[serde(rename = "Grade")]
    pub grade: Grade,
    #[serde(rename = "Location")]
    pub location: Option<String>,
    /// Copy of the batch position at creation time, never renumbered.
    #[serde(rename = "Batch ID")]
    pub batch_id: Option<BatchId>,
    #[serde(rename = "Warehouse Tag")]
    pub warehouse_tag: Option<String>,
    #[serde(rename = "UPC")]
    pub upc: Option<String>,
    #[serde(rename = "Manufacturer")]
    pub manufacturer: Option<String>,
    #[serde(rename = "Model")]
    pub model: Option<String>,
    #[serde(rename = "Notes")]
    pub notes: Option<String>,
    #[serde(rename = "Timestamp", with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "Manifest ID")]
    pub manifest_id: Option<String>,
    #[serde(rename = "Pallet ID")]
    pub pallet_id: Option<String>,
    #[serde(rename = "Unit ID")]
    pub unit_id: Option<String>,
    #[serde(rename = "PID-UID")]
    pub pid_uid: Option<String>,
}

impl ProductRecord {
    pub fn batch_number(&self) -> Option<u32> {
        self.batch_id.map(|id| id.batch_number)
    }
}

/// Details collected for a product before it is assigned a SKU.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewProduct {
    pub warehouse_tag: Option<String>,
    pub upc: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub notes: Option<String>,
    pub manifest_id: Option<String>,
    pub pallet_id: Option<String>,
    pub unit_id: Option<String>,
    pub pid_uid: Option<String>,
}

/// Normalises a free-text field: blank input means "not collected".
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Serde adapter for the `Timestamp` column.
///
/// Writes RFC 3339 in UTC with second precision. Reads RFC 3339 as well as
/// the naive `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS` forms, which are
/// taken as UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn parse(value: &str) -> Option<DateTime<Utc>> {
        let value = value.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
            return Some(parsed.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {:?}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn naive_timestamps_are_read_as_utc() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        assert_eq!(timestamp::parse("2024-03-09 14:05:00"), Some(expected));
        assert_eq!(timestamp::parse("2024-03-09T14:05:00"), Some(expected));
        assert_eq!(timestamp::parse("2024-03-09T14:05:00Z"), Some(expected));
        assert_eq!(timestamp::parse("2024-03-09T16:05:00+02:00"), Some(expected));
        assert_eq!(timestamp::parse("yesterday"), None);
    }

    #[test]
    fn timestamps_are_written_to_the_second() {
        let value = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        assert_eq!(timestamp::format(&value), "2024-03-09T14:05:00Z");
    }

    #[test]
    fn blank_text_is_not_collected() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(" Sony ".to_string())), Some("Sony".to_string()));
    }
}
