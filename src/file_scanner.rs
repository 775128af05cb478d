use crate::tree_model::Node;
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::collections::{BTreeMap, HashMap};
use std::ffi::OsStr;
use std::path::{Component, Path};

#[derive(Default)]
struct DirEntries {
    children: BTreeMap<String, Entry>,
}

enum Entry {
    File,
    Dir(DirEntries),
}

impl DirEntries {
    fn insert(&mut self, rel: &Path, is_dir: bool) {
        let names: Vec<String> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        let Some((last, parents)) = names.split_last() else {
            return;
        };

        let mut current = self;
        for name in parents {
            let entry = current
                .children
                .entry(name.clone())
                .or_insert_with(|| Entry::Dir(DirEntries::default()));
            if let Entry::File = entry {
                *entry = Entry::Dir(DirEntries::default());
            }
            current = match entry {
                Entry::Dir(dir) => dir,
                Entry::File => return,
            };
        }

        let leaf = if is_dir {
            Entry::Dir(DirEntries::default())
        } else {
            Entry::File
        };
        current.children.entry(last.clone()).or_insert(leaf);
    }

    fn into_node(self, name: String, rel: &str, notes: &HashMap<String, String>) -> Node {
        let children = self
            .children
            .into_iter()
            .map(|(child_name, entry)| {
                let child_rel = if rel.is_empty() {
                    child_name.clone()
                } else {
                    format!("{rel}/{child_name}")
                };
                match entry {
                    Entry::File => attach_note(Node::file(child_name), &child_rel, notes),
                    Entry::Dir(dir) => dir.into_node(child_name, &child_rel, notes),
                }
            })
            .collect();
        attach_note(Node::dir(name, children), rel, notes)
    }
}

fn attach_note(node: Node, rel: &str, notes: &HashMap<String, String>) -> Node {
    match notes.get(rel) {
        Some(note) => node.with_note(note.clone()),
        None => node,
    }
}

/// Name shown for the scanned root: its last path component, or empty for
/// a filesystem root.
fn root_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Scans `root` into a tree. Children are ordered by name.
///
/// `notes` maps `/`-separated paths relative to `root` to annotations; the
/// empty key annotates the root itself.
pub fn scan_tree(
    root: &Path,
    types_filter: &[String],
    include_ignored: bool,
    notes: &HashMap<String, String>,
) -> Result<Node> {
    let root = root
        .canonicalize()
        .with_context(|| format!("cannot open {}", root.display()))?;
    let name = root_name(&root);

    if !root.is_dir() {
        return Ok(attach_note(Node::file(name), "", notes));
    }

    let mut walker = WalkBuilder::new(&root);
    if include_ignored {
        walker.git_ignore(false).ignore(false);
    }

    let mut entries = DirEntries::default();
    let mut scanned = 0usize;
    for result in walker.build() {
        let dirent = match result {
            Ok(v) => v,
            Err(e) => {
                log::warn!("skipping entry during scan: {}", e);
                continue;
            }
        };

        let path = dirent.path();
        if path == root.as_path() {
            continue;
        }
        let Ok(rel) = path.strip_prefix(&root) else {
            continue;
        };

        // Symlinked directories are not descended into, so they list as files.
        let is_dir = dirent.file_type().is_some_and(|t| t.is_dir());
        if !types_filter.is_empty() && !is_dir {
            let keep = types_filter
                .iter()
                .any(|ext_filter_str| path.extension() == Some(OsStr::new(ext_filter_str)));
            if !keep {
                continue;
            }
        }
        entries.insert(rel, is_dir);
        scanned += 1;
    }

    log::info!("scanned {} entries under {}", scanned, root.display());
    Ok(entries.into_node(name, "", notes))
}

/// Parses `rel/path=text` annotations. Entries without `=` are rejected.
pub fn parse_notes(raw: &[String]) -> Result<HashMap<String, String>> {
    raw.iter()
        .map(|entry| {
            let (path, note) = entry
                .split_once('=')
                .with_context(|| format!("note {entry:?} is not of the form PATH=TEXT"))?;
            Ok((path.trim_matches('/').to_string(), note.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree_model::NodeKind;
    use std::fs;

    fn names(node: &Node) -> Vec<&str> {
        node.children.iter().map(|c| c.name.as_str()).collect()
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::Builder::new().prefix("treeyank").tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/app")).unwrap();
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();
        fs::write(dir.path().join("src/app/page.tsx"), "").unwrap();
        fs::write(dir.path().join("README.md"), "# hi").unwrap();
        dir
    }

    #[test]
    fn builds_sorted_tree() {
        let dir = fixture();
        let tree = scan_tree(dir.path(), &[], true, &HashMap::new()).unwrap();
        assert_eq!(tree.kind, NodeKind::Directory);
        assert_eq!(names(&tree), vec!["README.md", "empty", "src"]);

        let src = &tree.children[2];
        assert!(src.is_dir());
        assert_eq!(names(src), vec!["app", "main.rs"]);
        assert!(tree.children[1].is_dir());
        assert!(tree.children[1].children.is_empty());
    }

    #[test]
    fn type_filter_keeps_directories() {
        let dir = fixture();
        let tree = scan_tree(dir.path(), &["rs".to_string()], true, &HashMap::new()).unwrap();
        assert_eq!(names(&tree), vec!["empty", "src"]);
        assert_eq!(names(&tree.children[1]), vec!["app", "main.rs"]);
        assert!(tree.children[1].children[0].children.is_empty());
    }

    #[test]
    fn notes_are_attached_by_relative_path() {
        let dir = fixture();
        let notes = parse_notes(&["src/main.rs=entry point".into(), "/src/=sources".into()]).unwrap();
        let tree = scan_tree(dir.path(), &[], true, &notes).unwrap();
        let src = &tree.children[2];
        assert_eq!(src.note.as_deref(), Some("sources"));
        assert_eq!(src.children[1].note.as_deref(), Some("entry point"));
        assert_eq!(tree.note, None);
    }

    #[test]
    fn root_name_is_the_directory_name() {
        let dir = fixture();
        let tree = scan_tree(dir.path(), &[], true, &HashMap::new()).unwrap();
        let expected = dir.path().canonicalize().unwrap();
        assert_eq!(tree.name, expected.file_name().unwrap().to_string_lossy());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_is_not_an_empty_folder() {
        let dir = fixture();
        std::os::unix::fs::symlink(dir.path().join("src"), dir.path().join("link")).unwrap();
        let tree = scan_tree(dir.path(), &[], true, &HashMap::new()).unwrap();
        let link = tree.children.iter().find(|c| c.name == "link").unwrap();
        assert_eq!(link.kind, NodeKind::File);
        assert!(link.children.is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_tree(&dir.path().join("nope"), &[], true, &HashMap::new()).is_err());
    }

    #[test]
    fn malformed_note_is_rejected() {
        assert!(parse_notes(&["no-separator".into()]).is_err());
    }
}
