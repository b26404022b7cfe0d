//! Table builder wrapper around comfy-table for per-source display.

use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use console::{style, StyledObject};

use crate::domain::models::{FinalStatus, SignalStatus};

/// Create a standard list table with the given headers.
///
/// Uses the NOTHING preset (no borders) for a clean CLI aesthetic.
pub fn list_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h.to_uppercase()).set_alignment(CellAlignment::Left)),
        );
    table
}

/// Returns a colored label for a per-source status.
///
/// Green safe, red unsafe, dim unknown.
pub fn colorize_status(status: SignalStatus) -> StyledObject<&'static str> {
    match status {
        SignalStatus::Safe => style(status.as_str()).green(),
        SignalStatus::Unsafe => style(status.as_str()).red().bold(),
        SignalStatus::Unknown => style(status.as_str()).dim(),
    }
}

pub fn colorize_final(status: FinalStatus) -> StyledObject<&'static str> {
    match status {
        FinalStatus::Safe => style(status.as_str()).green().bold(),
        FinalStatus::Unsafe => style(status.as_str()).red().bold(),
    }
}
