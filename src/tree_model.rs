#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
}

/// One entry of the browsed hierarchy.
///
/// Only directories are descended into; a file carrying children is treated
/// as a plain leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub children: Vec<Node>,
    pub note: Option<String>,
}

impl Node {
    pub fn file(name: impl Into<String>) -> Self {
        Node {
            name: name.into(),
            kind: NodeKind::File,
            children: Vec::new(),
            note: None,
        }
    }

    pub fn dir(name: impl Into<String>, children: Vec<Node>) -> Self {
        Node {
            name: name.into(),
            kind: NodeKind::Directory,
            children,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// Children that a traversal should visit. Always empty for files.
    pub fn traversable_children(&self) -> &[Node] {
        if self.is_dir() {
            self.children.as_slice()
        } else {
            &[]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_never_expose_children() {
        let mut malformed = Node::file("a.txt");
        malformed.children.push(Node::dir("ghost", vec![]));
        assert!(malformed.traversable_children().is_empty());
    }

    #[test]
    fn empty_directory_is_still_a_directory() {
        let empty = Node::dir("empty", vec![]);
        assert!(empty.is_dir());
        assert!(empty.traversable_children().is_empty());
    }

    #[test]
    fn note_is_attached() {
        let node = Node::file("main.rs").with_note("entry point");
        assert_eq!(node.note.as_deref(), Some("entry point"));
    }
}
