// src/period.rs

use std::fmt;

use crate::error::{IngestError, Result};

/// One (year, month) unit of ingestion work.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(IngestError::Config(format!(
                "month {} out of range 1-12",
                month
            )));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// English month name, as the BTS form expects in its `time` field.
    pub fn month_name(&self) -> &'static str {
        u8::try_from(self.month)
            .ok()
            .and_then(|m| chrono::Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or_default()
    }

    /// `{year}{month}.zip`, e.g. `202003.zip`.
    pub fn archive_file_name(&self) -> String {
        format!("{}{:02}.zip", self.year, self.month)
    }

    /// `{month}-{year}.csv`, e.g. `03-2020.csv`.
    pub fn cleaned_file_name(&self) -> String {
        format!("{}.csv", self)
    }

    /// Every month of every year, years outermost.
    pub fn enumerate<I>(years: I) -> Vec<Period>
    where
        I: IntoIterator<Item = i32>,
    {
        years
            .into_iter()
            .flat_map(|year| (1..=12).map(move |month| Period { year, month }))
            .collect()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{}", self.month, self.year)
    }
}
