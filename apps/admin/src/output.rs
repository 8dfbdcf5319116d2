//! Text and JSON output for command results.

use serde::Serialize;

use crate::error::ApiError;

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Prints `value` as pretty JSON, or as the text produced by `render`.
pub fn emit<T, F>(format: OutputFormat, value: &T, render: F) -> Result<(), ApiError>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => {
            let text = render(value);
            if text.ends_with('\n') {
                print!("{}", text);
            } else {
                println!("{}", text);
            }
        }
    }
    Ok(())
}

/// Aligned columns separated by two spaces, with a dash rule under the
/// header. An empty table renders as `(none)`.
pub fn table(columns: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return "(none)".to_string();
    }

    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(line(columns.to_vec()));
    let rule = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    out.push("-".repeat(rule));
    for row in rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

/// `-` for missing optional values.
pub fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_alignment() {
        let rows = vec![
            vec!["1".to_string(), "Dune".to_string()],
            vec!["12".to_string(), "Emma".to_string()],
        ];
        let text = table(&["ID", "Title"], &rows);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ID  Title");
        assert_eq!(lines[1], "---------");
        assert_eq!(lines[2], "1   Dune");
        assert_eq!(lines[3], "12  Emma");
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(table(&["ID"], &[]), "(none)");
        assert_eq!(or_dash::<i64>(None), "-");
        assert_eq!(or_dash(Some(3)), "3");
    }
}
