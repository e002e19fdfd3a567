//! CSV rendering for list export.
//!
//! The export contract only promises an opaque downloadable blob; CSV keeps
//! it readable by every spreadsheet tool without pulling in a spreadsheet
//! writer. Distance is converted to kilometers with two decimals for human
//! consumption, matching how results are presented elsewhere.

use leadscout_core::SavedList;

const HEADER: &str = "Business Name,Address,Postal Code,Distance (km),Phone,Website,Emails";

/// Renders a saved list as a CSV document, one row per item, in list order.
#[must_use]
pub fn render_csv(list: &SavedList) -> String {
    let mut out = String::with_capacity(64 * (list.items.len() + 1));
    out.push_str(HEADER);
    out.push('\n');

    for item in &list.items {
        let row = [
            csv_field(&item.name),
            csv_field(&item.address),
            csv_field(item.postal_code.as_deref().unwrap_or("")),
            format!("{:.2}", item.distance_m / 1000.0),
            csv_field(item.phone.as_deref().unwrap_or("")),
            csv_field(item.website.as_deref().unwrap_or("")),
            csv_field(&item.emails.join(", ")),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

/// Quotes a field when it contains a comma, quote, or newline; embedded
/// quotes are doubled per RFC 4180.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use leadscout_core::Lead;
    use uuid::Uuid;

    use super::*;

    fn list_with(items: Vec<Lead>) -> SavedList {
        SavedList {
            id: Uuid::new_v4(),
            name: "Leads1".to_owned(),
            items,
            created_at: Utc::now(),
        }
    }

    fn lead() -> Lead {
        Lead {
            name: "Corner Bakery".to_owned(),
            address: "1 Main St, New York, NY 10001".to_owned(),
            distance_m: 1234.5,
            website: Some("https://corner.example".to_owned()),
            phone: Some("(212) 555-0147".to_owned()),
            maps_url: None,
            postal_code: Some("10001".to_owned()),
            emails: vec![
                "orders@corner.example".to_owned(),
                "info@corner.example".to_owned(),
            ],
        }
    }

    #[test]
    fn renders_header_for_empty_list() {
        let csv = render_csv(&list_with(vec![]));
        assert_eq!(csv, format!("{HEADER}\n"));
    }

    #[test]
    fn renders_one_row_per_item_in_order() {
        let mut second = lead();
        second.name = "Second Bakery".to_owned();
        let csv = render_csv(&list_with(vec![lead(), second]));

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("Corner Bakery,"));
        assert!(lines[2].starts_with("Second Bakery,"));
    }

    #[test]
    fn quotes_fields_containing_commas() {
        let csv = render_csv(&list_with(vec![lead()]));
        assert!(csv.contains("\"1 Main St, New York, NY 10001\""));
        assert!(csv.contains("\"orders@corner.example, info@corner.example\""));
    }

    #[test]
    fn converts_distance_to_kilometers() {
        let csv = render_csv(&list_with(vec![lead()]));
        assert!(csv.contains(",1.23,"), "expected 1234.5 m as 1.23 km: {csv}");
    }

    #[test]
    fn doubles_embedded_quotes() {
        let mut l = lead();
        l.name = "The \"Best\" Bakery".to_owned();
        let csv = render_csv(&list_with(vec![l]));
        assert!(csv.contains("\"The \"\"Best\"\" Bakery\""));
    }

    #[test]
    fn empty_optional_fields_render_as_empty_columns() {
        let mut l = lead();
        l.phone = None;
        l.website = None;
        l.postal_code = None;
        l.emails = Vec::new();
        let csv = render_csv(&list_with(vec![l]));
        let row = csv.lines().nth(1).expect("row");
        assert!(row.contains(",,"), "empty fields should stay empty: {row}");
    }
}
