use super::app_state::TuiAction;
use crate::file_tree::{FileTree, RowView};
use crate::tree_builder::row_prefix;
use crate::tree_model::Node;
use anyhow::Result;
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use std::sync::Arc;

pub type Rescan = Box<dyn FnMut() -> Result<Node>>;

/// Columns taken by the highlight symbol, reserved on every row.
pub(super) const HIGHLIGHT_WIDTH: u16 = 2;
/// Columns taken by the expand marker (`▶ ` / `▼ `).
pub(super) const MARKER_WIDTH: u16 = 2;

pub struct TuiApp {
    pub(super) tree: FileTree,
    /// Path of the row under the cursor. Usually the selection, but moves
    /// to a visible ancestor when its row gets hidden.
    pub(super) cursor_path: String,
    pub(super) scroll_offset: usize,
    pub(super) list_viewport_height: usize,
    /// Where the tree list was last drawn, borders included.
    pub(super) list_area: Rect,
    pub(super) status: Option<String>,
    pub(super) quit: bool,
    rescan: Option<Rescan>,
}

impl TuiApp {
    pub fn new(tree: FileTree, rescan: Option<Rescan>) -> Self {
        let cursor_path = tree.selection().to_string();
        TuiApp {
            tree,
            cursor_path,
            scroll_offset: 0,
            list_viewport_height: 0, // Will be updated by ui_renderer
            list_area: Rect::default(),
            status: None,
            quit: false,
            rescan,
        }
    }

    pub(super) fn cursor_index(&self, rows: &[RowView]) -> Option<usize> {
        rows.iter().position(|row| row.path == self.cursor_path)
    }

    pub(super) fn apply(&mut self, action: TuiAction) {
        match action {
            TuiAction::MoveDown => self.move_cursor(1),
            TuiAction::MoveUp => self.move_cursor(-1),
            TuiAction::ToggleDir => self.toggle_cursor_dir(),
            TuiAction::ToggleAll => {
                self.tree.toggle_all();
                self.ensure_cursor_is_visible();
            }
            TuiAction::CopyRow => {
                let path = self.cursor_path.clone();
                self.tree.on_copy_click(&path);
                self.status = Some(format!("Copied {path}"));
            }
            TuiAction::CopySelected => {
                self.tree.copy_selected();
                self.status = Some(format!("Copied {}", self.tree.selection()));
            }
            TuiAction::Rescan => self.rescan(),
            TuiAction::Quit => self.quit = true,
        }
    }

    pub(super) fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.click(mouse.column, mouse.row),
            MouseEventKind::ScrollDown => self.move_cursor(1),
            MouseEventKind::ScrollUp => self.move_cursor(-1),
            _ => {}
        }
    }

    /// A click on a directory's expand marker toggles it; a click anywhere
    /// else on a row selects that row.
    pub(super) fn click(&mut self, column: u16, row: u16) {
        let inner_top = self.list_area.y + 1;
        let inner_left = self.list_area.x + 1;
        let inner_bottom = self.list_area.y + self.list_area.height.saturating_sub(1);
        let inner_right = self.list_area.x + self.list_area.width.saturating_sub(1);
        if row < inner_top || row >= inner_bottom || column < inner_left || column >= inner_right {
            return;
        }

        let rows = self.tree.visible_rows();
        let idx = self.scroll_offset + usize::from(row - inner_top);
        let Some(clicked) = rows.get(idx) else {
            return;
        };

        let marker_start =
            inner_left + HIGHLIGHT_WIDTH + row_prefix(clicked).chars().count() as u16;
        let on_marker = column >= marker_start && column < marker_start + MARKER_WIDTH;

        self.cursor_path = clicked.path.clone();
        if clicked.is_dir() && on_marker {
            self.tree.on_toggle_click(&clicked.path);
            self.ensure_cursor_is_visible();
        } else {
            self.tree.on_row_click(&clicked.path);
        }
    }

    /// Moves the cursor through the visible rows, wrapping around, and
    /// selects the row it lands on.
    fn move_cursor(&mut self, delta: i32) {
        let rows = self.tree.visible_rows();
        if rows.is_empty() {
            return;
        }
        let next = match self.cursor_index(&rows) {
            Some(pos) => (pos as i32 + delta).rem_euclid(rows.len() as i32) as usize,
            None if delta > 0 => 0,
            None => rows.len() - 1,
        };
        self.cursor_path = rows[next].path.clone();
        self.tree.on_row_click(&self.cursor_path);
    }

    fn toggle_cursor_dir(&mut self) {
        let rows = self.tree.visible_rows();
        let is_dir = self
            .cursor_index(&rows)
            .is_some_and(|pos| rows[pos].is_dir());
        if is_dir {
            let path = self.cursor_path.clone();
            self.tree.on_toggle_click(&path);
            self.ensure_cursor_is_visible();
        }
    }

    fn rescan(&mut self) {
        let Some(rescan) = self.rescan.as_mut() else {
            return;
        };
        match rescan() {
            Ok(root) => {
                self.tree.replace_tree(Arc::new(root));
                self.cursor_path = self.tree.selection().to_string();
                self.scroll_offset = 0;
                self.status = Some("Rescanned".to_string());
            }
            Err(e) => {
                log::warn!("rescan failed: {e:#}");
                self.status = Some(format!("Rescan failed: {e}"));
            }
        }
    }

    /// Walks the cursor up to the nearest visible ancestor when its row has
    /// been hidden by a collapse. The selection itself is left alone.
    pub(super) fn ensure_cursor_is_visible(&mut self) {
        let rows = self.tree.visible_rows();
        if rows.is_empty() {
            return;
        }
        let mut candidate = self.cursor_path.clone();
        loop {
            if rows.iter().any(|row| row.path == candidate) {
                self.cursor_path = candidate;
                break;
            }
            match candidate.rfind('/') {
                Some(idx) => candidate.truncate(idx),
                None => {
                    self.cursor_path = rows[0].path.clone();
                    break;
                }
            }
        }
        self.ensure_cursor_is_visible_in_viewport(&rows);
    }

    pub(super) fn ensure_cursor_is_visible_in_viewport(&mut self, rows: &[RowView]) {
        if rows.is_empty() || self.list_viewport_height == 0 {
            return;
        }
        let list_height = self.list_viewport_height;

        if let Some(pos) = self.cursor_index(rows) {
            if pos < self.scroll_offset {
                self.scroll_offset = pos;
            } else if pos >= self.scroll_offset + list_height {
                self.scroll_offset = pos.saturating_sub(list_height - 1);
            }
        }

        if rows.len() <= list_height {
            self.scroll_offset = 0;
        } else {
            self.scroll_offset = self.scroll_offset.min(rows.len() - list_height);
        }
    }
}
