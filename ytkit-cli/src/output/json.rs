//! JSON output formatting.

use anyhow::Result;
use ytkit_core::Table;

/// Serialize a table as an array of row objects.
pub fn format_json(table: &Table, pretty: bool) -> Result<String> {
    let value = table.to_json();
    let rendered = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_as_objects() {
        let table = Table::from_items(&[json!({"id": "a", "views": 5})]);
        let rendered = format_json(&table, false).unwrap();
        assert_eq!(rendered, r#"[{"id":"a","views":5}]"#);
    }

    #[test]
    fn test_pretty_output_is_multiline() {
        let table = Table::from_items(&[json!({"id": "a"})]);
        let rendered = format_json(&table, true).unwrap();
        assert!(rendered.contains('\n'));
    }
}
