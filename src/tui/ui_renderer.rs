use super::app_logic::TuiApp;
use crate::tree_builder::row_prefix;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, HighlightSpacing, List, ListItem, ListState, Paragraph},
};

fn draw_help_block(f: &mut Frame, area: Rect) {
    let help_text_lines_content = vec![
        Line::from("Arrows/jk/Click: Nav+Select | Tab/o/Enter/▶: Fold | */a: Toggle All | q: Quit"),
        Line::from("c: Copy Row Path | C: Copy Selected | r: Rescan"),
    ];
    let help_paragraph = Paragraph::new(help_text_lines_content)
        .block(Block::default().borders(Borders::ALL).title("Treeyank"));
    f.render_widget(help_paragraph, area);
}

fn draw_selection_block(f: &mut Frame, app: &TuiApp, area: Rect) {
    let crumbs = app.tree.breadcrumb();
    let mut breadcrumb_spans = Vec::new();
    if crumbs.is_empty() {
        breadcrumb_spans.push(Span::raw("—"));
    }
    for (i, seg) in crumbs.iter().enumerate() {
        breadcrumb_spans.push(Span::styled(
            seg.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        if i != crumbs.len() - 1 {
            breadcrumb_spans.push(Span::styled(" / ", Style::default().fg(Color::DarkGray)));
        }
    }

    let status = app.status.clone().unwrap_or_default();
    let lines = vec![
        Line::from(vec![
            Span::styled("Selected: ", Style::default().fg(Color::Gray)),
            Span::styled(
                app.tree.selection().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {status}"), Style::default().fg(Color::Green)),
        ]),
        Line::from(breadcrumb_spans),
    ];
    let paragraph =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Selection"));
    f.render_widget(paragraph, area);
}

fn draw_main_list_block(f: &mut Frame, app: &mut TuiApp, area: Rect) {
    app.list_area = area;
    app.list_viewport_height = area.height.saturating_sub(2) as usize;
    let rows = app.tree.visible_rows();
    app.ensure_cursor_is_visible_in_viewport(&rows);

    let end = (app.scroll_offset + app.list_viewport_height).min(rows.len());
    let window = rows.get(app.scroll_offset..end).unwrap_or(&[]);

    let list_items: Vec<ListItem> = window
        .iter()
        .map(|row| {
            let expansion_prefix = match row.is_expanded {
                Some(true) => "▼ ",
                Some(false) => "▶ ",
                None => "  ",
            };
            let name_style = if row.is_selected {
                Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            let mut spans = vec![
                Span::styled(row_prefix(row), Style::default().fg(Color::DarkGray)),
                Span::raw(expansion_prefix),
                Span::styled(row.name.clone(), name_style),
            ];
            if let Some(note) = &row.note {
                spans.push(Span::styled(
                    format!("  {note}"),
                    Style::default().fg(Color::Gray),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list_widget = List::new(list_items)
        .block(Block::default().borders(Borders::ALL).title(app.tree.root_path()))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("❯ ")
        // Keeps row columns fixed so mouse clicks map onto the expand marker.
        .highlight_spacing(HighlightSpacing::Always);

    let mut list_state_for_view = ListState::default();
    if let Some(pos) = app.cursor_index(&rows) {
        if pos >= app.scroll_offset && pos < end {
            list_state_for_view.select(Some(pos - app.scroll_offset));
        }
    }
    f.render_stateful_widget(list_widget, area, &mut list_state_for_view);
}

pub(super) fn ui_frame(frame: &mut Frame, app: &mut TuiApp) {
    let mut area = frame.area();
    if let Some(max_width) = app.tree.config().max_width {
        area.width = area.width.min(max_width);
    }

    let help_lines = 2;
    let selection_lines = 2;
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(help_lines + 2),
            Constraint::Length(selection_lines + 2),
            Constraint::Min(0),
        ])
        .split(area);

    draw_help_block(frame, main_chunks[0]);
    draw_selection_block(frame, app, main_chunks[1]);
    draw_main_list_block(frame, app, main_chunks[2]);
}
