use crate::clipboard::CopySink;
use crate::expand_state::ExpandMap;
use crate::path::{child_path, join_path};
use crate::selection::Selection;
use crate::tree_model::{Node, NodeKind};
use std::sync::Arc;

/// Options recognised by the tree widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeConfig {
    /// Prefix put in front of the root's name when computing paths.
    pub base_path: String,
    /// Directories at depth `<=` this start expanded (root = 0).
    pub default_expand_depth: usize,
    /// Start with every directory expanded. Only affects initialisation.
    pub expand_all: bool,
    /// Presentation-only width cap, ignored by the state core.
    pub max_width: Option<u16>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            base_path: String::new(),
            default_expand_depth: 2,
            expand_all: false,
            max_width: None,
        }
    }
}

/// What the presentation layer needs to draw one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub path: String,
    pub name: String,
    pub kind: NodeKind,
    pub depth: usize,
    /// `None` for files.
    pub is_expanded: Option<bool>,
    pub is_selected: bool,
    pub note: Option<String>,
    /// Last child of its parent.
    pub is_last: bool,
    /// `is_last` of each ancestor below the root, outermost first.
    pub ancestor_last: Vec<bool>,
}

impl RowView {
    pub fn has_note(&self) -> bool {
        self.note.is_some()
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

/// State of one tree widget: expand map and selection over a shared,
/// immutable tree.
pub struct FileTree {
    root: Arc<Node>,
    config: TreeConfig,
    expanded: ExpandMap,
    selection: Selection,
    clipboard: Box<dyn CopySink>,
}

impl FileTree {
    pub fn new(root: Arc<Node>, config: TreeConfig, clipboard: Box<dyn CopySink>) -> Self {
        let expanded = initial_expand_map(&root, &config);
        let selection = Selection::new(root_path_of(&root, &config));
        log::debug!(
            "tree widget initialised: {} directories, selection {:?}",
            expanded.len(),
            selection.path()
        );
        FileTree {
            root,
            config,
            expanded,
            selection,
            clipboard,
        }
    }

    pub fn root(&self) -> &Arc<Node> {
        &self.root
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn root_path(&self) -> String {
        root_path_of(&self.root, &self.config)
    }

    pub fn expand_map(&self) -> &ExpandMap {
        &self.expanded
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.is_expanded(path)
    }

    pub fn selection(&self) -> &str {
        self.selection.path()
    }

    pub fn breadcrumb(&self) -> Vec<String> {
        self.selection.breadcrumb()
    }

    pub fn on_row_click(&mut self, path: &str) {
        self.selection.select(path);
    }

    pub fn on_toggle_click(&mut self, path: &str) {
        self.expanded = self.expanded.toggled(path);
    }

    pub fn on_copy_click(&self, path: &str) {
        self.clipboard.copy(path);
    }

    pub fn copy_selected(&self) {
        self.clipboard.copy(self.selection.path());
    }

    pub fn toggle_all(&mut self) {
        self.expanded = self.expanded.toggled_all(
            &self.root,
            &self.config.base_path,
            self.config.default_expand_depth,
        );
    }

    /// Swaps in a new tree. State is re-derived from scratch when the tree
    /// is a different allocation; the same `Arc` again changes nothing.
    pub fn replace_tree(&mut self, root: Arc<Node>) {
        if Arc::ptr_eq(&self.root, &root) {
            return;
        }
        self.expanded = initial_expand_map(&root, &self.config);
        self.selection = Selection::new(root_path_of(&root, &self.config));
        self.root = root;
        log::debug!("tree replaced, {} directories", self.expanded.len());
    }

    /// Rows in display order. Children of collapsed directories are hidden.
    pub fn visible_rows(&self) -> Vec<RowView> {
        let mut rows = Vec::new();
        let mut stack: Vec<(&Node, String, usize, bool, Vec<bool>)> =
            vec![(&self.root, self.root_path(), 0, true, Vec::new())];

        while let Some((node, path, depth, is_last, ancestor_last)) = stack.pop() {
            let is_expanded = node.is_dir().then(|| self.expanded.is_expanded(&path));

            if is_expanded == Some(true) {
                let children = node.traversable_children();
                let mut child_ancestors = ancestor_last.clone();
                if depth > 0 {
                    child_ancestors.push(is_last);
                }
                for (idx, child) in children.iter().enumerate().rev() {
                    stack.push((
                        child,
                        child_path(&path, &child.name),
                        depth + 1,
                        idx + 1 == children.len(),
                        child_ancestors.clone(),
                    ));
                }
            }

            rows.push(RowView {
                is_selected: self.selection.is_selected(&path),
                path,
                name: node.name.clone(),
                kind: node.kind,
                depth,
                is_expanded,
                note: node.note.clone(),
                is_last,
                ancestor_last,
            });
        }
        rows
    }
}

fn root_path_of(root: &Node, config: &TreeConfig) -> String {
    join_path([config.base_path.as_str(), root.name.as_str()])
}

fn initial_expand_map(root: &Node, config: &TreeConfig) -> ExpandMap {
    ExpandMap::build(
        root,
        &config.base_path,
        config.default_expand_depth,
        config.expand_all,
    )
}
