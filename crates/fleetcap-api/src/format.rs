//! Response rendering: JSON rows, fixed-width text, or a chat message.

use axum::http::{header, HeaderMap};
use serde::Serialize;

use fleetcap_core::FamilySummary;
use fleetcap_inventory::CapacityReport;

/// Column headers after the family column, in order.
const COLUMNS: [&str; 6] = ["on demand", "spot", "emr", "reserved", "unreserved", "surplus"];

/// Output representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Text,
    Chat,
}

impl Format {
    /// Pick a representation from request headers.
    ///
    /// Form-encoded requests come from chat slash commands and get a chat
    /// message; an `accept` header naming JSON gets rows; anything else
    /// gets the text table.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header_contains = |name: header::HeaderName, needle: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.to_ascii_lowercase().contains(needle))
        };

        if header_contains(header::CONTENT_TYPE, "application/x-www-form-urlencoded") {
            Format::Chat
        } else if header_contains(header::ACCEPT, "application/json") {
            Format::Json
        } else {
            Format::Text
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "text" => Some(Format::Text),
            "chat" => Some(Format::Chat),
            _ => None,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Format::Json | Format::Chat => "application/json",
            Format::Text => "text/plain; charset=utf-8",
        }
    }
}

/// Chat-message envelope posted back to the channel.
#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub response_type: &'static str,
    pub text: String,
}

/// Render `report` in `format`.
pub fn render(report: &CapacityReport, format: Format) -> String {
    match format {
        // Plain data structs; serialization cannot fail.
        Format::Json => serde_json::to_string(&report.rows).unwrap_or_default(),
        Format::Text => render_table(&report.rows),
        Format::Chat => serde_json::to_string(&chat_message(report)).unwrap_or_default(),
    }
}

pub fn chat_message(report: &CapacityReport) -> ChatMessage {
    ChatMessage {
        response_type: "in_channel",
        text: format!(
            "Normalized capacity per instance family in {}, running vs. reserved:\n```\n{}```",
            report.region,
            render_table(&report.rows)
        ),
    }
}

/// Fixed-width table, one line per family, numbers right-aligned under
/// their column header.
pub fn render_table(rows: &[FamilySummary]) -> String {
    let family_width = rows
        .iter()
        .map(|r| r.family.len())
        .chain(std::iter::once("family".len()))
        .max()
        .unwrap_or_default();

    let mut out = format!("{:<family_width$}  {}\n", "family", COLUMNS.join("  "));

    for row in rows {
        let values = [
            row.on_demand,
            row.spot,
            row.emr,
            row.reserved,
            row.unreserved,
            row.surplus,
        ];
        let cells: Vec<String> = values
            .iter()
            .zip(COLUMNS)
            .map(|(value, header)| {
                format!("{:>width$}", format_units(*value), width = header.len())
            })
            .collect();
        out.push_str(&format!("{:<family_width$}  {}\n", row.family, cells.join("  ")));
    }

    out
}

/// Whole units without decimals, fractional units with at most two.
fn format_units(units: f64) -> String {
    if units.fract() == 0.0 {
        format!("{units:.0}")
    } else {
        let s = format!("{units:.2}");
        s.trim_end_matches('0').to_string()
    }
}
