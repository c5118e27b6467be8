//! Report view builder.
//!
//! Applies the business filters, sorts, and the fixed column projection to
//! the enriched booking set. Both views return an empty `Vec` when nothing
//! matches.

use std::collections::HashSet;

use crate::models::{BookingRecord, ReportRow};

/// Leases whose end falls within this many days qualify as "expiring soon".
const EXPIRING_WINDOW_DAYS: i64 = 14;

/// Bookings with a lease ending in the next [`EXPIRING_WINDOW_DAYS`] days
/// (inclusive range `[1, 14]`) that carry an insurance RSD reference.
///
/// Sorted ascending by `days_from_lease_end`; exact duplicate rows after
/// projection are dropped, first occurrence wins.
pub fn expiring_soon(bookings: &[BookingRecord]) -> Vec<ReportRow> {
    let mut rows: Vec<ReportRow> = bookings
        .iter()
        .filter(|b| {
            (1..=EXPIRING_WINDOW_DAYS).contains(&b.days_from_lease_end)
                && !b.insurance_rsd.is_empty()
        })
        .map(ReportRow::from)
        .collect();

    rows.sort_by_key(|r| r.days_from_lease_end);

    let mut seen = HashSet::new();
    rows.retain(|row| seen.insert(row.clone()));
    rows
}

/// Bookings past their lease end whose landlord has not returned the
/// security deposit (`LL Returned Security Deposit?` is exactly "No").
///
/// Sorted ascending by `days_from_lease_end`; no de-duplication.
pub fn pending_rsd(bookings: &[BookingRecord]) -> Vec<ReportRow> {
    let mut rows: Vec<ReportRow> = bookings
        .iter()
        .filter(|b| b.days_from_lease_end <= 0 && b.ll_returned_security_deposit == "No")
        .map(ReportRow::from)
        .collect();

    rows.sort_by_key(|r| r.days_from_lease_end);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking(id: &str, days: i64, insurance: &str, returned: &str) -> BookingRecord {
        BookingRecord {
            booking_id: id.into(),
            relocation_specialist: "Ana".into(),
            move_in_date: None,
            move_out_date: None,
            original_move_out_date: None,
            length_of_stay: "30 days".into(),
            length_of_stay_num: 30.0,
            landlord: "L".into(),
            landlord_phone: "555".into(),
            landlord_email: "l@x.com".into(),
            tenant_name: "T".into(),
            tenant_phone: "556".into(),
            tenant_email: "t@x.com".into(),
            address: "1 Main St".into(),
            notes: String::new(),
            days_from_lease_end: days,
            insurance_rsd: insurance.into(),
            landlord_rsd: String::new(),
            ll_returned_security_deposit: returned.into(),
            profit_from_rent_spread: 0.0,
            revenue_from_fees: 0.0,
            truncated_date: None,
            month_of_move_in: None,
            total_profit: 0.0,
            extended: None,
            num_days_extended: None,
        }
    }

    #[test]
    fn test_expiring_soon_window_and_insurance() {
        let bookings = vec![
            booking("BK-1", 5, "RSD-1", "No"),
            booking("BK-2", 20, "RSD-2", "No"),  // outside window
            booking("BK-3", 0, "RSD-3", "No"),   // below window
            booking("BK-4", 14, "", "No"),       // blank insurance
            booking("BK-5", 14, "RSD-5", "Yes"), // boundary, kept
            booking("BK-6", 1, "RSD-6", "Yes"),  // boundary, kept
        ];
        let rows = expiring_soon(&bookings);

        let ids: Vec<&str> = rows.iter().map(|r| r.booking_id.as_str()).collect();
        assert_eq!(ids, vec!["BK-6", "BK-1", "BK-5"]);
    }

    #[test]
    fn test_expiring_soon_sorted_ascending() {
        let bookings = vec![
            booking("BK-9", 9, "R", "No"),
            booking("BK-2", 2, "R", "No"),
            booking("BK-7", 7, "R", "No"),
        ];
        let days: Vec<i64> = expiring_soon(&bookings)
            .iter()
            .map(|r| r.days_from_lease_end)
            .collect();
        assert_eq!(days, vec![2, 7, 9]);
    }

    #[test]
    fn test_expiring_soon_drops_exact_duplicates() {
        let bookings = vec![
            booking("BK-1", 5, "RSD-1", "No"),
            booking("BK-1", 5, "RSD-1", "No"),
        ];
        assert_eq!(expiring_soon(&bookings).len(), 1);
    }

    #[test]
    fn test_expiring_soon_keeps_rows_differing_in_any_column() {
        let mut twin = booking("BK-1", 5, "RSD-1", "No");
        twin.notes = "second unit".into();
        let bookings = vec![booking("BK-1", 5, "RSD-1", "No"), twin];

        assert_eq!(expiring_soon(&bookings).len(), 2);
    }

    #[test]
    fn test_pending_rsd_predicate() {
        let bookings = vec![
            booking("BK-1", -3, "", "No"),
            booking("BK-2", -3, "", "Yes"), // returned, excluded
            booking("BK-3", 0, "", "No"),   // boundary, kept
            booking("BK-4", 1, "", "No"),   // lease not ended yet
            booking("BK-5", -10, "", "no"), // exact match only
        ];
        let rows = pending_rsd(&bookings);

        let ids: Vec<&str> = rows.iter().map(|r| r.booking_id.as_str()).collect();
        assert_eq!(ids, vec!["BK-1", "BK-3"]);
    }

    #[test]
    fn test_pending_rsd_keeps_duplicates() {
        let bookings = vec![
            booking("BK-1", -3, "", "No"),
            booking("BK-1", -3, "", "No"),
        ];
        assert_eq!(pending_rsd(&bookings).len(), 2);
    }

    #[test]
    fn test_both_views_empty_on_no_match() {
        let bookings = vec![booking("BK-1", 30, "", "Yes")];
        assert!(expiring_soon(&bookings).is_empty());
        assert!(pending_rsd(&bookings).is_empty());
        assert!(expiring_soon(&[]).is_empty());
        assert!(pending_rsd(&[]).is_empty());
    }
}
