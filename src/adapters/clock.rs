//! Current date adapter

use super::Clock;
use crate::Result;
use chrono::{NaiveDate, Utc};

/// Wall-clock UTC date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn current_date(&self) -> Result<NaiveDate> {
        Ok(Utc::now().date_naive())
    }
}

/// Pinned date, for replaying a request as of a given day
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn current_date(&self) -> Result<NaiveDate> {
        Ok(self.0)
    }
}
