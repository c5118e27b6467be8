//! HTML rendering for the dashboard page.
//!
//! Pure string building, no templating layer. The page embeds the two report
//! tables; all cell values are HTML-escaped.

use chrono::NaiveDate;

use crate::models::ReportRow;

/// Column headers, in projection order.
const COLUMNS: [&str; 16] = [
    "Booking ID",
    "PPH Relocation Specialist",
    "Move In Date",
    "Move Out Date",
    "Length of Stay",
    "Landlord",
    "Landlord Phone Number",
    "Landlord Email Address",
    "Tenant Name",
    "Tenant Phone Number",
    "Tenant Email Address",
    "Address",
    "Notes",
    "Days From Lease End Date",
    "Insurance RSD",
    "Landlord RSD",
];

/// Escape a value for HTML text and attribute contexts.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%m/%d/%Y").to_string())
        .unwrap_or_default()
}

fn render_row(row: &ReportRow) -> String {
    let cells = [
        row.booking_id.clone(),
        row.relocation_specialist.clone(),
        format_date(row.move_in_date),
        format_date(row.move_out_date),
        row.length_of_stay.clone(),
        row.landlord.clone(),
        row.landlord_phone.clone(),
        row.landlord_email.clone(),
        row.tenant_name.clone(),
        row.tenant_phone.clone(),
        row.tenant_email.clone(),
        row.address.clone(),
        row.notes.clone(),
        row.days_from_lease_end.to_string(),
        row.insurance_rsd.clone(),
        row.landlord_rsd.clone(),
    ];

    let mut html = String::from("      <tr>");
    for cell in &cells {
        html.push_str("<td>");
        html.push_str(&escape(cell));
        html.push_str("</td>");
    }
    html.push_str("</tr>\n");
    html
}

fn render_table(rows: &[ReportRow]) -> String {
    if rows.is_empty() {
        return "    <p class=\"empty\">No matching bookings.</p>\n".to_string();
    }

    let mut html = String::from("    <table>\n      <tr>");
    for col in COLUMNS {
        html.push_str("<th>");
        html.push_str(&escape(col));
        html.push_str("</th>");
    }
    html.push_str("</tr>\n");
    for row in rows {
        html.push_str(&render_row(row));
    }
    html.push_str("    </table>\n");
    html
}

/// Render the full dashboard page.
pub fn render_dashboard(expiring_soon: &[ReportRow], pending_rsd: &[ReportRow]) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
           <meta charset=\"utf-8\">\n\
           <title>Rental Operations Dashboard</title>\n\
           <style>\n\
             body { font-family: sans-serif; margin: 2rem; }\n\
             table { border-collapse: collapse; margin-bottom: 2rem; }\n\
             th, td { border: 1px solid #ccc; padding: 4px 8px; text-align: left; }\n\
             th { background: #f0f0f0; }\n\
             .empty { color: #666; }\n\
           </style>\n\
         </head>\n\
         <body>\n\
           <h1>Rental Operations Dashboard</h1>\n",
    );

    html.push_str("  <section>\n    <h2>Leases Expiring Soon (1-14 days)</h2>\n");
    html.push_str(&render_table(expiring_soon));
    html.push_str("  </section>\n");

    html.push_str("  <section>\n    <h2>Pending Security Deposit Returns</h2>\n");
    html.push_str(&render_table(pending_rsd));
    html.push_str("  </section>\n");

    html.push_str("</body>\n</html>\n");
    html
}
