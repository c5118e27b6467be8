//! Record transformation pipeline.
//!
//! Converts raw header-keyed rows from the two source worksheets into the
//! enriched record sets the report views consume:
//!
//! - [`build_bookings`] - "ReverseArbitrage" rows into [`BookingRecord`]s
//! - [`build_leads`] - CRM rows into filtered, sorted [`LeadRecord`]s
//! - [`fetch_dashboard_data`] - fetch both tables and run both builders
//!
//! Failure policy: the numeric columns the views depend on (`Length of Stay`
//! leading token, the two profit columns, `Days From Lease End Date`) must
//! parse, and a malformed value aborts the invocation with a
//! [`ValidationError`] naming the row and column. Date columns are the
//! opposite: an unparsable date becomes `None` and propagates as `None`
//! through every derived field, never aborting.

pub mod views;

use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::{PipelineResult, ValidationError};
use crate::models::{BookingRecord, LeadRecord, YearMonth};
use crate::sheets::SheetsClient;

/// Source documents and worksheets.
pub const BOOKINGS_DOCUMENT: &str = "General";
pub const BOOKINGS_WORKSHEET: &str = "ReverseArbitrage";
pub const LEADS_DOCUMENT: &str = "Reverse Arbitrage Leads";
pub const LEADS_WORKSHEET: &str = "Paradise Point Housing CRM";

/// Leads recorded before this date predate the funnel and are excluded
/// (inclusive lower bound).
pub const LEAD_CUTOFF: NaiveDate = match NaiveDate::from_ymd_opt(2025, 3, 21) {
    Some(d) => d,
    None => panic!("invalid lead cutoff"),
};

// =============================================================================
// Cell helpers
// =============================================================================

/// Trimmed string view of a cell; missing and null cells read as "".
fn str_field(row: &Map<String, Value>, column: &str) -> String {
    match row.get(column) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Parse a `MM/DD/YYYY` date cell. Blank or unparsable cells become `None`.
fn parse_mdy(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%m/%d/%Y").ok()
}

/// Required numeric cell. Accepts number cells and numeric strings
/// (currency formatting stripped); anything else is a [`ValidationError`].
fn require_f64(
    row: &Map<String, Value>,
    column: &str,
    row_id: &str,
) -> Result<f64, ValidationError> {
    match row.get(column) {
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| {
            ValidationError::new(row_id, column, format!("number out of range: {}", n))
        }),
        Some(Value::String(s)) => {
            let cleaned = s.trim().trim_start_matches('$').replace(',', "");
            cleaned.parse::<f64>().map_err(|_| {
                ValidationError::new(row_id, column, format!("expected a number, got '{}'", s.trim()))
            })
        }
        other => Err(ValidationError::new(
            row_id,
            column,
            format!("expected a number, got '{}'", other.map(Value::to_string).unwrap_or_default()),
        )),
    }
}

/// Required integer cell, with the same acceptance rules as [`require_f64`].
fn require_i64(
    row: &Map<String, Value>,
    column: &str,
    row_id: &str,
) -> Result<i64, ValidationError> {
    let value = require_f64(row, column, row_id)?;
    if value.fract() != 0.0 {
        return Err(ValidationError::new(
            row_id,
            column,
            format!("expected an integer, got {}", value),
        ));
    }
    Ok(value as i64)
}

/// Leading whitespace-separated token of `Length of Stay`, as a float.
/// A missing or non-numeric token is a hard precondition failure.
fn length_of_stay_num(raw: &str, row_id: &str) -> Result<f64, ValidationError> {
    let token = raw.split_whitespace().next().unwrap_or("");
    token.parse::<f64>().map_err(|_| {
        ValidationError::new(
            row_id,
            "Length of Stay",
            format!("leading token '{}' is not numeric", token),
        )
    })
}

// =============================================================================
// Booking rows
// =============================================================================

/// Transform raw booking rows into enriched [`BookingRecord`]s.
///
/// Derivation order and semantics follow the dashboard contract exactly; see
/// the module docs for the failure policy. `extended` and
/// `num_days_extended` are both `None` when either move-out date failed to
/// parse, so a missing date can never read as "not extended".
pub fn build_bookings(rows: &[Map<String, Value>]) -> Result<Vec<BookingRecord>, ValidationError> {
    let mut records = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let booking_id = str_field(row, "Booking ID");
        let row_id = if booking_id.is_empty() {
            format!("row {}", index + 1)
        } else {
            booking_id.clone()
        };

        let move_in_date = parse_mdy(&str_field(row, "Move In Date"));
        let month_of_move_in = move_in_date.map(YearMonth::from_date);

        let length_of_stay = str_field(row, "Length of Stay");
        let length_of_stay_num = length_of_stay_num(&length_of_stay, &row_id)?;

        let profit_from_rent_spread = require_f64(row, "Profit From Rent Spread", &row_id)?;
        let revenue_from_fees = require_f64(row, "Revenue From Fees", &row_id)?;
        let total_profit = profit_from_rent_spread + revenue_from_fees;

        let move_out_date = parse_mdy(&str_field(row, "Move Out Date"));
        let original_move_out_date = parse_mdy(&str_field(row, "Original Move Out Date"));

        let (extended, num_days_extended) = match (move_out_date, original_move_out_date) {
            (Some(out), Some(original)) => {
                (Some(out > original), Some((out - original).num_days()))
            }
            _ => (None, None),
        };

        let truncated_date = YearMonth::parse(&str_field(row, "Truncated Date"));

        let days_from_lease_end = require_i64(row, "Days From Lease End Date", &row_id)?;

        records.push(BookingRecord {
            booking_id,
            relocation_specialist: str_field(row, "PPH Relocation Specialist"),
            move_in_date,
            move_out_date,
            original_move_out_date,
            length_of_stay,
            length_of_stay_num,
            landlord: str_field(row, "Landlord"),
            landlord_phone: str_field(row, "Landlord Phone Number"),
            landlord_email: str_field(row, "Landlord Email Address"),
            tenant_name: str_field(row, "Tenant Name"),
            tenant_phone: str_field(row, "Tenant Phone Number"),
            tenant_email: str_field(row, "Tenant Email Address"),
            address: str_field(row, "Address"),
            notes: str_field(row, "Notes"),
            days_from_lease_end,
            insurance_rsd: str_field(row, "Insurance RSD"),
            landlord_rsd: str_field(row, "Landlord RSD"),
            ll_returned_security_deposit: str_field(row, "LL Returned Security Deposit?"),
            profit_from_rent_spread,
            revenue_from_fees,
            truncated_date,
            month_of_move_in,
            total_profit,
            extended,
            num_days_extended,
        });
    }

    Ok(records)
}

// =============================================================================
// Lead rows
// =============================================================================

/// Transform raw CRM rows into filtered, sorted [`LeadRecord`]s.
///
/// Rows with a blank `Lead ID` are dropped, dates are parsed up front as ISO
/// `YYYY-MM-DD` (rows whose date does not parse are dropped, which matches
/// the raw-string cutoff comparison for the well-formed source), leads before
/// [`LEAD_CUTOFF`] are excluded, and the result is sorted ascending by date.
pub fn build_leads(rows: &[Map<String, Value>]) -> Vec<LeadRecord> {
    let mut leads: Vec<LeadRecord> = rows
        .iter()
        .filter_map(|row| {
            let lead_id = str_field(row, "Lead ID");
            if lead_id.is_empty() {
                return None;
            }

            let date_of_lead =
                NaiveDate::parse_from_str(str_field(row, "Date of Lead").as_str(), "%Y-%m-%d")
                    .ok()?;
            if date_of_lead < LEAD_CUTOFF {
                return None;
            }

            Some(LeadRecord {
                lead_id,
                month_of_lead: YearMonth::from_date(date_of_lead),
                date_of_lead,
            })
        })
        .collect();

    leads.sort_by_key(|lead| lead.date_of_lead);
    leads
}

/// Monthly lead funnel: count of leads per calendar month, ascending.
pub fn lead_counts_by_month(leads: &[LeadRecord]) -> Vec<(YearMonth, usize)> {
    let mut counts: BTreeMap<YearMonth, usize> = BTreeMap::new();
    for lead in leads {
        *counts.entry(lead.month_of_lead).or_default() += 1;
    }
    counts.into_iter().collect()
}

// =============================================================================
// Fetch orchestration
// =============================================================================

/// Both enriched record sets for one dashboard request.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub bookings: Vec<BookingRecord>,
    pub leads: Vec<LeadRecord>,
}

/// Fetch both source tables and run the transformation pipeline.
///
/// Everything is rebuilt from a fresh fetch on every call; no caching.
pub async fn fetch_dashboard_data(client: &SheetsClient) -> PipelineResult<DashboardData> {
    println!("📖 Fetching {} / {}...", BOOKINGS_DOCUMENT, BOOKINGS_WORKSHEET);
    let booking_rows = client.fetch_table(BOOKINGS_DOCUMENT, BOOKINGS_WORKSHEET).await?;
    println!("   ✓ {} booking rows", booking_rows.len());

    println!("📖 Fetching {} / {}...", LEADS_DOCUMENT, LEADS_WORKSHEET);
    let lead_rows = client.fetch_table(LEADS_DOCUMENT, LEADS_WORKSHEET).await?;
    println!("   ✓ {} lead rows", lead_rows.len());

    let bookings = build_bookings(&booking_rows)?;
    let leads = build_leads(&lead_rows);
    println!("   ✓ {} bookings, {} leads after transformation", bookings.len(), leads.len());

    Ok(DashboardData { bookings, leads })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn booking_row(overrides: &[(&str, Value)]) -> Map<String, Value> {
        let mut row = Map::new();
        let defaults = [
            ("Booking ID", json!("BK-1")),
            ("PPH Relocation Specialist", json!("Ana")),
            ("Move In Date", json!("01/15/2025")),
            ("Move Out Date", json!("03/01/2025")),
            ("Original Move Out Date", json!("03/01/2025")),
            ("Length of Stay", json!("45 days")),
            ("Landlord", json!("Lyle")),
            ("Landlord Phone Number", json!("555-0100")),
            ("Landlord Email Address", json!("lyle@example.com")),
            ("Tenant Name", json!("Tara")),
            ("Tenant Phone Number", json!("555-0101")),
            ("Tenant Email Address", json!("tara@example.com")),
            ("Address", json!("1 Main St")),
            ("Notes", json!("")),
            ("Days From Lease End Date", json!(5)),
            ("Insurance RSD", json!("RSD-1")),
            ("Landlord RSD", json!("")),
            ("LL Returned Security Deposit?", json!("No")),
            ("Profit From Rent Spread", json!(1200.5)),
            ("Revenue From Fees", json!(99.5)),
            ("Truncated Date", json!("2025-01")),
        ];
        for (k, v) in defaults {
            row.insert(k.to_string(), v);
        }
        for (k, v) in overrides {
            row.insert(k.to_string(), v.clone());
        }
        row
    }

    fn lead_row(id: &str, date: &str) -> Map<String, Value> {
        let mut row = Map::new();
        row.insert("Lead ID".into(), json!(id));
        row.insert("Date of Lead".into(), json!(date));
        row
    }

    #[test]
    fn test_booking_derivations() {
        let rows = vec![booking_row(&[])];
        let bookings = build_bookings(&rows).unwrap();
        let b = &bookings[0];

        assert_eq!(b.move_in_date, NaiveDate::from_ymd_opt(2025, 1, 15));
        assert_eq!(b.month_of_move_in, Some(YearMonth { year: 2025, month: 1 }));
        assert_eq!(b.length_of_stay_num, 45.0);
        assert_eq!(b.total_profit, 1300.0);
        assert_eq!(b.truncated_date, Some(YearMonth { year: 2025, month: 1 }));
        assert_eq!(b.days_from_lease_end, 5);
    }

    #[test]
    fn test_invalid_move_in_date_degrades_to_none() {
        // 13/40/2025 is not a date; the pipeline must not raise.
        let rows = vec![booking_row(&[("Move In Date", json!("13/40/2025"))])];
        let bookings = build_bookings(&rows).unwrap();

        assert_eq!(bookings[0].move_in_date, None);
        assert_eq!(bookings[0].month_of_move_in, None);
    }

    #[test]
    fn test_extended_true_with_day_count() {
        let rows = vec![booking_row(&[
            ("Move Out Date", json!("03/10/2025")),
            ("Original Move Out Date", json!("03/01/2025")),
        ])];
        let b = &build_bookings(&rows).unwrap()[0];

        assert_eq!(b.extended, Some(true));
        assert_eq!(b.num_days_extended, Some(9));
    }

    #[test]
    fn test_extended_false_when_equal_or_earlier() {
        let equal = vec![booking_row(&[])];
        let b = &build_bookings(&equal).unwrap()[0];
        assert_eq!(b.extended, Some(false));
        assert_eq!(b.num_days_extended, Some(0));

        let earlier = vec![booking_row(&[
            ("Move Out Date", json!("02/20/2025")),
            ("Original Move Out Date", json!("03/01/2025")),
        ])];
        let b = &build_bookings(&earlier).unwrap()[0];
        assert_eq!(b.extended, Some(false));
        assert_eq!(b.num_days_extended, Some(-9));
    }

    #[test]
    fn test_extended_none_when_either_date_unparsable() {
        let rows = vec![booking_row(&[("Original Move Out Date", json!("TBD"))])];
        let b = &build_bookings(&rows).unwrap()[0];

        assert_eq!(b.extended, None);
        assert_eq!(b.num_days_extended, None);
    }

    #[test]
    fn test_bad_length_of_stay_names_row_and_column() {
        let rows = vec![booking_row(&[("Length of Stay", json!("about 45 days"))])];
        let err = build_bookings(&rows).unwrap_err();

        assert_eq!(err.row, "BK-1");
        assert_eq!(err.column, "Length of Stay");
    }

    #[test]
    fn test_bad_profit_field_fails_pipeline() {
        let rows = vec![booking_row(&[("Revenue From Fees", json!("n/a"))])];
        let err = build_bookings(&rows).unwrap_err();

        assert_eq!(err.column, "Revenue From Fees");
    }

    #[test]
    fn test_currency_formatted_strings_accepted() {
        let rows = vec![booking_row(&[
            ("Profit From Rent Spread", json!("$1,200.50")),
            ("Revenue From Fees", json!("99.50")),
        ])];
        let b = &build_bookings(&rows).unwrap()[0];

        assert_eq!(b.total_profit, 1300.0);
    }

    #[test]
    fn test_blank_booking_id_error_names_row_index() {
        let rows = vec![booking_row(&[
            ("Booking ID", json!("")),
            ("Length of Stay", json!("soonish")),
        ])];
        let err = build_bookings(&rows).unwrap_err();

        assert_eq!(err.row, "row 1");
    }

    #[test]
    fn test_truncated_date_unparsable_is_none() {
        let rows = vec![booking_row(&[("Truncated Date", json!("January"))])];
        let b = &build_bookings(&rows).unwrap()[0];

        assert_eq!(b.truncated_date, None);
    }

    #[test]
    fn test_leads_filter_sort_and_month() {
        let rows = vec![
            lead_row("L-3", "2025-06-02"),
            lead_row("", "2025-05-01"),
            lead_row("L-1", "2025-03-21"),
            lead_row("L-0", "2025-03-20"),
            lead_row("L-2", "2025-04-10"),
        ];
        let leads = build_leads(&rows);

        let ids: Vec<&str> = leads.iter().map(|l| l.lead_id.as_str()).collect();
        // Blank id dropped, pre-cutoff dropped, cutoff itself kept, ascending.
        assert_eq!(ids, vec!["L-1", "L-2", "L-3"]);
        assert_eq!(leads[0].date_of_lead, LEAD_CUTOFF);
        assert_eq!(leads[1].month_of_lead, YearMonth { year: 2025, month: 4 });
    }

    #[test]
    fn test_leads_unparsable_date_dropped() {
        let rows = vec![lead_row("L-1", "soon"), lead_row("L-2", "2025-05-05")];
        let leads = build_leads(&rows);

        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].lead_id, "L-2");
    }

    #[test]
    fn test_lead_counts_by_month() {
        let rows = vec![
            lead_row("L-1", "2025-04-01"),
            lead_row("L-2", "2025-04-20"),
            lead_row("L-3", "2025-06-02"),
        ];
        let counts = lead_counts_by_month(&build_leads(&rows));

        assert_eq!(
            counts,
            vec![
                (YearMonth { year: 2025, month: 4 }, 2),
                (YearMonth { year: 2025, month: 6 }, 1),
            ]
        );
    }

    #[test]
    fn test_empty_inputs() {
        assert!(build_bookings(&[]).unwrap().is_empty());
        assert!(build_leads(&[]).is_empty());
    }
}
