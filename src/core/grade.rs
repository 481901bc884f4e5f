use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::BatchError;

/// Condition grade of a physical item.
///
/// Grades are written as their two-letter (or one-letter) codes. Parsing is
/// case-insensitive and ignores surrounding whitespace, so `" vg "` reads as
/// [`Grade::VeryGood`].
///
/// # Examples
///
/// ```
/// use sku_batch_rs::core::grade::Grade;
///
/// let grade: Grade = "ln".parse().unwrap();
/// assert_eq!(grade, Grade::LikeNew);
/// assert_eq!(grade.code(), "LN");
/// assert!("XX".parse::<Grade>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Grade {
    /// `LN`
    LikeNew,
    /// `VG`
    VeryGood,
    /// `G`
    Good,
    /// `AC`
    Acceptable,
    /// `SA`, salvage or for parts
    Salvage,
}

impl Grade {
    pub const ALL: [Grade; 5] = [
        Grade::LikeNew,
        Grade::VeryGood,
        Grade::Good,
        Grade::Acceptable,
        Grade::Salvage,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Grade::LikeNew => "LN",
            Grade::VeryGood => "VG",
            Grade::Good => "G",
            Grade::Acceptable => "AC",
            Grade::Salvage => "SA",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Grade::LikeNew => "Like New",
            Grade::VeryGood => "Very Good",
            Grade::Good => "Good",
            Grade::Acceptable => "Acceptable",
            Grade::Salvage => "Salvage/for parts",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Grade {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        Grade::ALL
            .into_iter()
            .find(|grade| grade.code() == code)
            .ok_or_else(|| BatchError::InvalidGrade(s.to_string()))
    }
}

impl TryFrom<String> for Grade {
    type Error = BatchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Grade> for String {
    fn from(grade: Grade) -> Self {
        grade.code().to_string()
    }
}
