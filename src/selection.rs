/// The single selected path of a tree widget.
///
/// Any string is accepted; only the initial value (the root path) is
/// guaranteed to name a node of the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    path: String,
}

impl Selection {
    pub fn new(path: impl Into<String>) -> Self {
        Selection { path: path.into() }
    }

    pub fn select(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_selected(&self, path: &str) -> bool {
        self.path == path
    }

    pub fn breadcrumb(&self) -> Vec<String> {
        breadcrumb(&self.path)
    }
}

/// Splits a path into name segments after dropping one leading `/`.
/// An empty path has no segments.
pub fn breadcrumb(path: &str) -> Vec<String> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split('/').map(str::to_string).collect()
}
