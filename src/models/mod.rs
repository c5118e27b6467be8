//! Domain models for the rentdash pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`BookingRecord`] - an enriched rental booking row
//! - [`LeadRecord`] - a filtered sales-funnel lead row
//! - [`ReportRow`] - the fixed column projection used by the report views
//! - [`YearMonth`] - a date truncated to calendar-month granularity

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Year-Month
// =============================================================================

/// A date truncated to calendar month granularity.
///
/// Used for monthly aggregation (`month_of_move_in`, `month_of_lead`) and for
/// the source-provided `Truncated Date` column. Displays as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Truncate a date to its calendar month.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse a `YYYY-MM` string. Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        let (year, month) = s.trim().split_once('-')?;
        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        let year: i32 = year.parse().ok()?;
        let month: u32 = month.parse().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(Self { year, month })
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// =============================================================================
// Booking Record
// =============================================================================

/// One rental booking row from the "ReverseArbitrage" worksheet, enriched
/// with the derived columns the report views depend on.
///
/// Date fields are `None` when the source cell failed to parse; the derived
/// `extended` / `num_days_extended` pair is `None` whenever either of the two
/// move-out dates it is computed from is `None` (never defaulted to
/// false/zero).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    pub booking_id: String,
    pub relocation_specialist: String,
    pub move_in_date: Option<NaiveDate>,
    pub move_out_date: Option<NaiveDate>,
    pub original_move_out_date: Option<NaiveDate>,
    /// Raw source value, e.g. "45 days".
    pub length_of_stay: String,
    /// Leading numeric token of `length_of_stay`.
    pub length_of_stay_num: f64,
    pub landlord: String,
    pub landlord_phone: String,
    pub landlord_email: String,
    pub tenant_name: String,
    pub tenant_phone: String,
    pub tenant_email: String,
    pub address: String,
    pub notes: String,
    /// Signed day count from today to the lease's scheduled end
    /// (source-provided, not recomputed).
    pub days_from_lease_end: i64,
    pub insurance_rsd: String,
    pub landlord_rsd: String,
    /// Source flag, "Yes"/"No".
    pub ll_returned_security_deposit: String,
    pub profit_from_rent_spread: f64,
    pub revenue_from_fees: f64,
    pub truncated_date: Option<YearMonth>,
    /// Year-month of `move_in_date`.
    pub month_of_move_in: Option<YearMonth>,
    /// `profit_from_rent_spread + revenue_from_fees`.
    pub total_profit: f64,
    /// Strict `move_out_date > original_move_out_date`.
    pub extended: Option<bool>,
    /// `move_out_date - original_move_out_date` in days.
    pub num_days_extended: Option<i64>,
}

// =============================================================================
// Lead Record
// =============================================================================

/// One sales lead from the CRM worksheet, after filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadRecord {
    pub lead_id: String,
    pub date_of_lead: NaiveDate,
    /// Year-month of `date_of_lead`.
    pub month_of_lead: YearMonth,
}

// =============================================================================
// Report Row (view projection)
// =============================================================================

/// The fixed column subset both report views project to.
///
/// `Eq + Hash` so the expiring-soon view can drop exact duplicates across all
/// projected columns. The raw `length_of_stay` string is carried instead of
/// its numeric form so the projection stays hashable and matches the source
/// presentation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportRow {
    pub booking_id: String,
    pub relocation_specialist: String,
    pub move_in_date: Option<NaiveDate>,
    pub move_out_date: Option<NaiveDate>,
    pub length_of_stay: String,
    pub landlord: String,
    pub landlord_phone: String,
    pub landlord_email: String,
    pub tenant_name: String,
    pub tenant_phone: String,
    pub tenant_email: String,
    pub address: String,
    pub notes: String,
    pub days_from_lease_end: i64,
    pub insurance_rsd: String,
    pub landlord_rsd: String,
}

impl From<&BookingRecord> for ReportRow {
    fn from(b: &BookingRecord) -> Self {
        Self {
            booking_id: b.booking_id.clone(),
            relocation_specialist: b.relocation_specialist.clone(),
            move_in_date: b.move_in_date,
            move_out_date: b.move_out_date,
            length_of_stay: b.length_of_stay.clone(),
            landlord: b.landlord.clone(),
            landlord_phone: b.landlord_phone.clone(),
            landlord_email: b.landlord_email.clone(),
            tenant_name: b.tenant_name.clone(),
            tenant_phone: b.tenant_phone.clone(),
            tenant_email: b.tenant_email.clone(),
            address: b.address.clone(),
            notes: b.notes.clone(),
            days_from_lease_end: b.days_from_lease_end,
            insurance_rsd: b.insurance_rsd.clone(),
            landlord_rsd: b.landlord_rsd.clone(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_month_from_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 21).unwrap();
        let ym = YearMonth::from_date(date);
        assert_eq!(ym, YearMonth { year: 2025, month: 3 });
        assert_eq!(ym.to_string(), "2025-03");
    }

    #[test]
    fn test_year_month_parse() {
        assert_eq!(YearMonth::parse("2025-07"), Some(YearMonth { year: 2025, month: 7 }));
        assert_eq!(YearMonth::parse(" 2024-12 "), Some(YearMonth { year: 2024, month: 12 }));
        assert_eq!(YearMonth::parse("2025-13"), None);
        assert_eq!(YearMonth::parse("2025-7"), None);
        assert_eq!(YearMonth::parse("07/2025"), None);
        assert_eq!(YearMonth::parse(""), None);
    }

    #[test]
    fn test_year_month_ordering() {
        let a = YearMonth { year: 2024, month: 12 };
        let b = YearMonth { year: 2025, month: 1 };
        assert!(a < b);
    }

    #[test]
    fn test_report_row_dedup_semantics() {
        use std::collections::HashSet;

        let row = ReportRow {
            booking_id: "BK-1".into(),
            relocation_specialist: "Ana".into(),
            move_in_date: NaiveDate::from_ymd_opt(2025, 1, 15),
            move_out_date: NaiveDate::from_ymd_opt(2025, 3, 1),
            length_of_stay: "45 days".into(),
            landlord: "L".into(),
            landlord_phone: "555".into(),
            landlord_email: "l@x.com".into(),
            tenant_name: "T".into(),
            tenant_phone: "556".into(),
            tenant_email: "t@x.com".into(),
            address: "1 Main St".into(),
            notes: "".into(),
            days_from_lease_end: 5,
            insurance_rsd: "RSD-1".into(),
            landlord_rsd: "".into(),
        };

        let mut seen = HashSet::new();
        assert!(seen.insert(row.clone()));
        assert!(!seen.insert(row.clone()));

        let mut other = row;
        other.notes = "different".into();
        assert!(seen.insert(other));
    }
}
