//! Table formatting for list commands

use tabled::builder::Builder;
use tabled::settings::Style;

/// Render rows under a header as a bordered table
pub fn render(header: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut builder = Builder::default();
    builder.push_record(header.iter().map(|s| s.to_string()));
    for row in rows {
        builder.push_record(row);
    }
    let mut table = builder.build();
    table.with(Style::sharp());
    table.to_string()
}
