use crate::file_tree::RowView;

/// Connector glyphs drawn in front of a row's name.
///
/// Each ancestor below the root contributes `"│  "` when more siblings
/// follow it and `"   "` otherwise; the row itself ends in `"├─ "` or
/// `"└─ "`. The root row has no prefix.
pub fn row_prefix(row: &RowView) -> String {
    if row.depth == 0 {
        return String::new();
    }
    let mut prefix = String::with_capacity((row.ancestor_last.len() + 1) * 3);
    for &ancestor_is_last in &row.ancestor_last {
        prefix.push_str(if ancestor_is_last { "   " } else { "│  " });
    }
    prefix.push_str(if row.is_last { "└─ " } else { "├─ " });
    prefix
}

/// Plain-text label for a row: prefix, name, a trailing `/` for
/// directories and the note if any.
pub fn row_label(row: &RowView) -> String {
    let mut label = row_prefix(row);
    label.push_str(&row.name);
    if row.is_dir() {
        label.push('/');
    }
    if let Some(note) = &row.note {
        label.push_str("  # ");
        label.push_str(note);
    }
    label
}

pub fn render_rows(rows: &[RowView]) -> Vec<String> {
    rows.iter().map(row_label).collect()
}
