//! Pure path arithmetic over `/`-joined namespace paths.
//!
//! Every subtree match in vtree goes through [`is_within`], which compares
//! whole path segments. A raw `starts_with` would put `root/a2` inside
//! `root/a`; these helpers never do.

/// The path separator.
pub const SEPARATOR: char = '/';

/// Join a parent path and a single name.
pub fn join(parent: &str, name: &str) -> String {
    format!("{parent}{SEPARATOR}{name}")
}

/// The containing folder of `path`, or `None` for a single-segment path.
pub fn parent_of(path: &str) -> Option<&str> {
    path.rsplit_once(SEPARATOR).map(|(parent, _)| parent)
}

/// The last segment of `path`.
pub fn last_segment(path: &str) -> &str {
    match path.rsplit_once(SEPARATOR) {
        Some((_, name)) => name,
        None => path,
    }
}

/// Returns `true` if `candidate` is `prefix` itself or lies below it.
pub fn is_within(candidate: &str, prefix: &str) -> bool {
    match candidate.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
        None => false,
    }
}

/// Returns `true` if `candidate` lies strictly below `prefix`.
pub fn is_strictly_within(candidate: &str, prefix: &str) -> bool {
    candidate.len() > prefix.len() && is_within(candidate, prefix)
}

/// Replace the leading `old_prefix` of `path` with `new_prefix`.
///
/// Only the leading occurrence is replaced; the remainder of the path is
/// copied verbatim even if it happens to contain `old_prefix` again.
/// Returns `None` when `path` is not within `old_prefix`.
pub fn rebase(path: &str, old_prefix: &str, new_prefix: &str) -> Option<String> {
    if !is_within(path, old_prefix) {
        return None;
    }
    let mut rebased = String::with_capacity(path.len() - old_prefix.len() + new_prefix.len());
    rebased.push_str(new_prefix);
    rebased.push_str(&path[old_prefix.len()..]);
    Some(rebased)
}

/// The path of `path` relative to `root`, without a leading separator.
///
/// Returns `None` when `path` is not strictly below `root`.
pub fn relative_to<'a>(path: &'a str, root: &str) -> Option<&'a str> {
    if !is_strictly_within(path, root) {
        return None;
    }
    Some(&path[root.len() + SEPARATOR.len_utf8()..])
}
