/// Joins path segments with `/`.
///
/// Leading and trailing slashes are stripped from every segment and empty
/// segments are dropped, so the result never starts or ends with `/` and
/// never contains `//`. Joining nothing yields an empty string.
pub fn join_path<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for segment in segments {
        let cleaned = segment.as_ref().trim_matches('/');
        if cleaned.is_empty() {
            continue;
        }
        if !joined.is_empty() {
            joined.push('/');
        }
        joined.push_str(cleaned);
    }
    joined
}

/// Path of a child named `name` under `parent`.
pub fn child_path(parent: &str, name: &str) -> String {
    join_path([parent, name])
}
