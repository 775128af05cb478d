use crate::path::child_path;
use crate::tree_model::Node;
use std::collections::BTreeMap;

/// Visits every directory reachable from `root` in pre-order, passing its
/// path and depth (root = 0). Files are skipped and never descended into.
///
/// Uses an explicit stack so arbitrarily deep trees cannot overflow.
pub fn walk_directories<F>(root: &Node, base_path: &str, mut visit: F)
where
    F: FnMut(&str, usize),
{
    let mut stack: Vec<(&Node, String, usize)> = vec![(root, child_path(base_path, &root.name), 0)];
    while let Some((node, path, depth)) = stack.pop() {
        if !node.is_dir() {
            continue;
        }
        visit(&path, depth);
        // Reverse so the first child is popped first.
        for child in node.traversable_children().iter().rev() {
            let child_p = child_path(&path, &child.name);
            stack.push((child, child_p, depth + 1));
        }
    }
}

/// Directory path -> expanded flag.
///
/// Holds exactly one entry per directory reachable from the tree it was
/// built from. Transitions never mutate `self`; they return a new map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandMap {
    entries: BTreeMap<String, bool>,
}

impl ExpandMap {
    /// Initial expand state: a directory at depth `d` is expanded when
    /// `expand_all` is set or `d <= default_expand_depth`.
    pub fn build(root: &Node, base_path: &str, default_expand_depth: usize, expand_all: bool) -> Self {
        let mut entries = BTreeMap::new();
        walk_directories(root, base_path, |path, depth| {
            entries.insert(path.to_string(), expand_all || depth <= default_expand_depth);
        });
        ExpandMap { entries }
    }

    fn fully_expanded(root: &Node, base_path: &str) -> Self {
        let mut entries = BTreeMap::new();
        walk_directories(root, base_path, |path, _| {
            entries.insert(path.to_string(), true);
        });
        ExpandMap { entries }
    }

    pub fn get(&self, path: &str) -> Option<bool> {
        self.entries.get(path).copied()
    }

    /// Unknown paths read as collapsed.
    pub fn is_expanded(&self, path: &str) -> bool {
        self.get(path).unwrap_or(false)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(path, open)| (path.as_str(), *open))
    }

    /// True when every entry is expanded (vacuously true for an empty map).
    pub fn all_expanded(&self) -> bool {
        self.entries.values().all(|open| *open)
    }

    /// Flips the entry at `path`. Paths that are not known directories are
    /// ignored and the returned map equals `self`.
    pub fn toggled(&self, path: &str) -> Self {
        let mut next = self.clone();
        if let Some(open) = next.entries.get_mut(path) {
            *open = !*open;
        } else {
            log::debug!("ignoring toggle of unknown directory path {:?}", path);
        }
        next
    }

    /// Bistable expand/collapse of the whole tree.
    ///
    /// A fully expanded map collapses back to the default depth; anything
    /// else becomes fully expanded. A hand-built partial state is never
    /// restored.
    pub fn toggled_all(&self, root: &Node, base_path: &str, default_expand_depth: usize) -> Self {
        if self.all_expanded() {
            Self::build(root, base_path, default_expand_depth, false)
        } else {
            Self::fully_expanded(root, base_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_of(pairs: &[(&str, bool)]) -> Vec<(String, bool)> {
        pairs.iter().map(|(p, o)| (p.to_string(), *o)).collect()
    }

    fn entries(map: &ExpandMap) -> Vec<(String, bool)> {
        map.iter().map(|(p, o)| (p.to_string(), o)).collect()
    }

    fn nested() -> Node {
        Node::dir("root", vec![Node::dir("a", vec![Node::dir("b", vec![])])])
    }

    fn mixed() -> Node {
        Node::dir(
            "root",
            vec![
                Node::dir(
                    "src",
                    vec![
                        Node::dir("app", vec![Node::file("page.tsx"), Node::dir("deep", vec![])]),
                        Node::file("lib.rs"),
                    ],
                ),
                Node::file("README.md"),
                Node::dir("empty", vec![]),
            ],
        )
    }

    #[test]
    fn single_directory_with_file() {
        let root = Node::dir("root", vec![Node::file("a.txt")]);
        let map = ExpandMap::build(&root, "", 2, false);
        assert_eq!(entries(&map), map_of(&[("root", true)]));
    }

    #[test]
    fn toggle_root_collapses_it() {
        let root = Node::dir("root", vec![Node::file("a.txt")]);
        let map = ExpandMap::build(&root, "", 2, false).toggled("root");
        assert_eq!(entries(&map), map_of(&[("root", false)]));
    }

    #[test]
    fn default_depth_is_inclusive() {
        let map = ExpandMap::build(&nested(), "", 1, false);
        assert_eq!(
            entries(&map),
            map_of(&[("root", true), ("root/a", true), ("root/a/b", false)])
        );
    }

    #[test]
    fn expand_all_overrides_depth() {
        let map = ExpandMap::build(&nested(), "", 1, true);
        assert_eq!(
            entries(&map),
            map_of(&[("root", true), ("root/a", true), ("root/a/b", true)])
        );
    }

    #[test]
    fn toggle_all_is_bistable() {
        let root = nested();
        let expanded = ExpandMap::build(&root, "", 1, true);
        let collapsed = expanded.toggled_all(&root, "", 1);
        assert_eq!(collapsed, ExpandMap::build(&root, "", 1, false));
        let again = collapsed.toggled_all(&root, "", 1);
        assert_eq!(again, expanded);
    }

    #[test]
    fn toggle_all_from_partial_state_expands_everything() {
        let root = mixed();
        let partial = ExpandMap::build(&root, "", 0, false).toggled("root/src");
        let next = partial.toggled_all(&root, "", 0);
        assert!(next.all_expanded());
        assert_eq!(next.len(), partial.len());
    }

    #[test]
    fn keys_are_exactly_the_directory_paths() {
        let map = ExpandMap::build(&mixed(), "", 2, false);
        let keys: Vec<&str> = map.iter().map(|(p, _)| p).collect();
        assert_eq!(
            keys,
            vec!["root", "root/empty", "root/src", "root/src/app", "root/src/app/deep"]
        );
        assert!(!map.contains("root/README.md"));
        assert!(!map.contains("root/src/lib.rs"));
    }

    #[test]
    fn collapsed_ancestors_still_record_descendants() {
        let map = ExpandMap::build(&mixed(), "", 0, false);
        assert_eq!(map.get("root"), Some(true));
        assert_eq!(map.get("root/src"), Some(false));
        assert_eq!(map.get("root/src/app/deep"), Some(false));
    }

    #[test]
    fn base_path_prefixes_every_key() {
        let map = ExpandMap::build(&nested(), "/apps/web/", 2, false);
        assert_eq!(map.get("apps/web/root/a/b"), Some(true));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn toggle_changes_exactly_one_entry() {
        let before = ExpandMap::build(&mixed(), "", 1, false);
        let after = before.toggled("root/src/app");
        let changed: Vec<&str> = before
            .iter()
            .zip(after.iter())
            .filter(|(b, a)| b != a)
            .map(|(b, _)| b.0)
            .collect();
        assert_eq!(changed, vec!["root/src/app"]);
        // The original value is untouched.
        assert_eq!(before.get("root/src/app"), Some(false));
        assert_eq!(after.get("root/src/app"), Some(true));
    }

    #[test]
    fn toggling_unknown_or_file_path_is_a_no_op() {
        let before = ExpandMap::build(&mixed(), "", 1, false);
        assert_eq!(before.toggled("root/nope"), before);
        assert_eq!(before.toggled("root/README.md"), before);
        assert!(!before.toggled("root/nope").contains("root/nope"));
    }

    #[test]
    fn all_file_tree_has_an_empty_map_and_toggle_all_keeps_it_empty() {
        let root = Node::file("lonely.txt");
        let map = ExpandMap::build(&root, "", 2, false);
        assert!(map.is_empty());
        assert!(map.all_expanded());
        assert!(map.toggled_all(&root, "", 2).is_empty());
    }

    #[test]
    fn nameless_root_degrades_to_empty_path() {
        let root = Node::dir("", vec![Node::dir("a", vec![])]);
        let map = ExpandMap::build(&root, "", 2, false);
        assert_eq!(map.get(""), Some(true));
        assert_eq!(map.get("a"), Some(true));
    }

    #[test]
    fn deep_trees_do_not_overflow() {
        let mut node = Node::dir("leaf", vec![]);
        for i in 0..2_000 {
            node = Node::dir(format!("d{i}"), vec![node]);
        }
        let map = ExpandMap::build(&node, "", 2, false);
        assert_eq!(map.len(), 2_001);
        assert_eq!(map.iter().filter(|(_, open)| *open).count(), 3);
    }
}
