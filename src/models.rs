//! Data models shared by the scraping pipeline and the outputs.
//!
//! - [`Site`]: one portal from the registry, with its column roles
//! - [`Record`]: one extracted tender row with positional columns
//! - [`SiteReport`]: what happened while scraping one portal
//!
//! Records have no fixed schema. Column meaning varies per portal and even per
//! page layout, so cells are kept in order and labelled `Col1`, `Col2`, …

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Label used for the link field in every output.
pub const LINK_FIELD: &str = "Link";
/// Label used for the source-portal field in every output.
pub const STATE_FIELD: &str = "State";

fn default_date_column() -> usize {
    2
}

fn default_title_column() -> usize {
    5
}

fn default_table_selector() -> String {
    "table".to_string()
}

/// Positional roles of a portal's results table.
///
/// Column numbers are 1-based so they line up with the `ColN` labels.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ColumnRoles {
    /// Column holding the publication date used by the date filter.
    #[serde(default = "default_date_column")]
    pub date: usize,
    /// Column rendered as the hyperlinked `Title` in the HTML table.
    #[serde(default = "default_title_column")]
    pub title: usize,
}

impl Default for ColumnRoles {
    fn default() -> Self {
        Self {
            date: default_date_column(),
            title: default_title_column(),
        }
    }
}

/// A procurement portal to scrape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Site {
    /// Display name, also stamped on every record as `State`.
    pub name: String,
    /// Search page the browser is pointed at.
    pub url: String,
    #[serde(default)]
    pub columns: ColumnRoles,
    /// CSS selector matching candidate results tables.
    #[serde(default = "default_table_selector")]
    pub table_selector: String,
}

impl Site {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            columns: ColumnRoles::default(),
            table_selector: default_table_selector(),
        }
    }
}

/// Positional label for the zero-based cell index `i`.
pub fn column_label(i: usize) -> String {
    format!("Col{}", i + 1)
}

/// One tender row extracted from a portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Cell texts in table order.
    pub cells: Vec<String>,
    /// Target of the first anchor in the row, empty when the row has none.
    pub link: String,
    /// Name of the site the row came from.
    pub state: String,
}

impl Record {
    /// Cell at a 1-based column number, as used by [`ColumnRoles`].
    pub fn column(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|i| self.cells.get(i))
            .map(String::as_str)
    }

    /// Lookup by output label (`Col3`, `Link`, `State`).
    pub fn get(&self, label: &str) -> Option<&str> {
        match label {
            LINK_FIELD => Some(&self.link),
            STATE_FIELD => Some(&self.state),
            _ => label
                .strip_prefix("Col")
                .and_then(|n| n.parse::<usize>().ok())
                .and_then(|n| self.column(n)),
        }
    }

    /// All string fields joined with spaces, the haystack for keyword search.
    pub fn searchable_text(&self) -> String {
        let mut text = self.cells.join(" ");
        text.push(' ');
        text.push_str(&self.link);
        text.push(' ');
        text.push_str(&self.state);
        text
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len() + 2))?;
        for (i, cell) in self.cells.iter().enumerate() {
            map.serialize_entry(&column_label(i), cell)?;
        }
        map.serialize_entry(LINK_FIELD, &self.link)?;
        map.serialize_entry(STATE_FIELD, &self.state)?;
        map.end()
    }
}

/// Why the pagination walker stopped on a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// No table rows, even after the retry delay.
    NoRows,
    /// No "next page" control on the last page.
    NoNextControl,
    /// Clicking "next" failed; treated as the end of the results.
    NextFailed,
    /// The page cap was reached.
    PageCap,
    /// "Next" led back to a page identical to the previous one.
    RepeatedPage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SiteStatus {
    Completed {
        records: usize,
        pages: usize,
        stop: StopReason,
    },
    Failed {
        reason: String,
        records_kept: usize,
    },
}

/// Outcome of scraping one portal, surfaced next to the results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteReport {
    pub site: String,
    #[serde(flatten)]
    pub status: SiteStatus,
}

impl SiteReport {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, SiteStatus::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record {
            cells: vec![
                "1".to_string(),
                "19-Oct-2024 10:00 AM".to_string(),
                "".to_string(),
            ],
            link: "https://example.gov.in/t/1".to_string(),
            state: "Odisha".to_string(),
        }
    }

    #[test]
    fn test_column_label_is_one_based() {
        assert_eq!(column_label(0), "Col1");
        assert_eq!(column_label(9), "Col10");
    }

    #[test]
    fn test_record_lookup_by_label() {
        let record = sample();
        assert_eq!(record.get("Col2"), Some("19-Oct-2024 10:00 AM"));
        assert_eq!(record.get("Col3"), Some(""));
        assert_eq!(record.get("Col4"), None);
        assert_eq!(record.get("Col0"), None);
        assert_eq!(record.get("Link"), Some("https://example.gov.in/t/1"));
        assert_eq!(record.get("State"), Some("Odisha"));
        assert_eq!(record.column(0), None);
    }

    #[test]
    fn test_record_serializes_positional_keys_in_order() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"Col1":"1","Col2":"19-Oct-2024 10:00 AM","Col3":"","Link":"https://example.gov.in/t/1","State":"Odisha"}"#
        );
    }

    #[test]
    fn test_site_defaults_from_yaml() {
        let site: Site = serde_yaml::from_str("name: Goa\nurl: https://eprocure.goa.gov.in\n").unwrap();
        assert_eq!(site.columns, ColumnRoles { date: 2, title: 5 });
        assert_eq!(site.table_selector, "table");
    }

    #[test]
    fn test_site_report_serialization() {
        let report = SiteReport {
            site: "Odisha".to_string(),
            status: SiteStatus::Completed {
                records: 6,
                pages: 2,
                stop: StopReason::NoNextControl,
            },
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], "completed");
        assert_eq!(value["stop"], "no_next_control");
        assert!(!report.is_failed());
    }
}
