use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::de::{Deserialize, Deserializer};
use serde::{Serialize, Serializer};

use crate::error::ReconError;

/// A calendar month — the single internal form of a period key.
///
/// External sources disagree on the textual form: series exports use
/// `YYYY-MM`, the transfer ledger uses `YYYY/MM`. Both parse into this
/// type; [`Period::dashed`] and [`Period::slashed`] render each form
/// explicitly. Joins across sources compare `Period` values, never strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, ReconError> {
        if !(1..=12).contains(&month) {
            return Err(ReconError::PeriodParse(format!("{year}-{month:02}")));
        }
        Ok(Self { year, month })
    }

    /// Month containing a Unix timestamp, evaluated in UTC.
    ///
    /// Always UTC: period derivation must not depend on the machine the
    /// run happens to execute on.
    pub fn from_timestamp_utc(secs: i64) -> Option<Self> {
        let dt = chrono::DateTime::from_timestamp(secs, 0)?;
        Some(Self { year: dt.year(), month: dt.month() })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First calendar day of the month, for date-floor comparisons.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("month validated on construction")
    }

    /// `YYYY-MM`, the form used by series exports.
    pub fn dashed(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// `YYYY/MM`, the form used by the transfer ledger.
    pub fn slashed(&self) -> String {
        format!("{:04}/{:02}", self.year, self.month)
    }

    /// The month immediately after this one.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// Inclusive iteration from `self` through `end`. Empty when
    /// `end < self`.
    pub fn through(self, end: Period) -> impl Iterator<Item = Period> {
        let mut cursor = self;
        std::iter::from_fn(move || {
            if cursor > end {
                return None;
            }
            let current = cursor;
            cursor = cursor.next();
            Some(current)
        })
    }
}

impl FromStr for Period {
    type Err = ReconError;

    /// Accepts both delimiter forms: `2023-01` and `2023/01`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once(['-', '/'])
            .ok_or_else(|| ReconError::PeriodParse(s.into()))?;
        let year: i32 = year.parse().map_err(|_| ReconError::PeriodParse(s.into()))?;
        let month: u32 = month.parse().map_err(|_| ReconError::PeriodParse(s.into()))?;
        Self::new(year, month).map_err(|_| ReconError::PeriodParse(s.into()))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.dashed())
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid period key '{s}'")))
    }
}
