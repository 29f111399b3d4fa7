//! Table renderer for set logs. Pure formatting; no effect on the model.

use crate::core::SetLog;

/// Render one row per record under a header derived from the union of all
/// field names. A record missing a field gets an empty cell.
pub fn render_table(log: &SetLog) -> String {
    let keys = log.keys();
    if keys.is_empty() {
        return format!("({} log, no records)\n", log.kind);
    }

    let mut widths: Vec<usize> = keys.iter().map(|k| k.chars().count()).collect();
    for record in &log.records {
        for (i, key) in keys.iter().enumerate() {
            widths[i] = widths[i].max(record.value(key).chars().count());
        }
    }

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    let mut out = String::new();
    push_row(&mut out, &widths, keys.iter().map(String::as_str));
    push_row(&mut out, &widths, separator.iter().map(String::as_str));
    for record in &log.records {
        push_row(&mut out, &widths, keys.iter().map(|k| record.value(k)));
    }
    out
}

fn push_row<'a>(out: &mut String, widths: &[usize], cells: impl Iterator<Item = &'a str>) {
    let mut line = String::new();
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        line.push_str(cell);
        let len = cell.chars().count();
        if len < widths[i] {
            line.push_str(&" ".repeat(widths[i] - len));
        }
    }
    out.push_str(line.trim_end());
    out.push('\n');
}
