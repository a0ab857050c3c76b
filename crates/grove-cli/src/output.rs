// crates/grove-cli/src/output.rs
//
// Output formatting utilities for the Grove CLI.
// Supports table and JSON output modes.

use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// Print a titled table, or a placeholder line when there are no rows.
pub fn print_section<T: Tabled>(title: &str, rows: &[T]) {
    println!("{}", title);
    if rows.is_empty() {
        println!("  (none)");
    } else {
        println!("{}", format_table(rows));
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Tabled, Serialize)]
    struct Row {
        #[tabled(rename = "Pool")]
        pool: u64,
        #[tabled(rename = "Strength")]
        strength: u64,
    }

    #[test]
    fn test_format_table_has_headers() {
        let table = format_table(&[Row { pool: 3, strength: 40 }]);
        assert!(table.contains("Pool"));
        assert!(table.contains("Strength"));
        assert!(table.contains("40"));
    }

    #[test]
    fn test_format_json() {
        let json = format_json(&Row { pool: 1, strength: 2 });
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["strength"], 2);
    }

    #[test]
    fn test_json_flag() {
        assert_eq!(OutputFormat::from_json_flag(true), OutputFormat::Json);
        assert_eq!(OutputFormat::from_json_flag(false), OutputFormat::Table);
    }
}
