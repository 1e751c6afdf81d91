//! Path normalization, join, parent/basename, prefix tests, and composite-key
//! namespacing (spec §4.x "Path utilities", C2).
//!
//! Keys inside a backend are stored without a leading slash (`"a/b"`, not
//! `"/a/b"`); the empty string denotes the implicit root directory. Mount
//! prefixes (spec §4.5, §6) are a distinct, slash-leading syntax and are
//! normalized with [`normalize_mount_prefix`] instead.

/// `':'` is reserved by the composite-key format and may not appear in a
/// namespace.
pub const NAMESPACE_SEPARATOR: char = ':';

/// Collapse repeated separators and strip a leading/trailing `/`, yielding
/// the canonical backend-relative key form. `""` and `"/"` both normalize to
/// `""` (the implicit root).
pub fn normalize(path: &str) -> String {
    path.split('/').filter(|seg| !seg.is_empty()).collect::<Vec<_>>().join("/")
}

/// Join a parent key and a child segment, normalizing the result.
pub fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        normalize(child)
    } else {
        normalize(&format!("{parent}/{child}"))
    }
}

/// The parent of `key`, computed by trimming the final `/`-delimited
/// segment (spec §3 invariant 6). Returns `""` (root) for any top-level key,
/// and `None` only for the root itself, which has no parent.
pub fn parent(key: &str) -> Option<String> {
    let key = normalize(key);
    if key.is_empty() {
        return None;
    }
    match key.rfind('/') {
        Some(idx) => Some(key[..idx].to_string()),
        None => Some(String::new()),
    }
}

/// The final path segment of `key` (the part after the last `/`).
pub fn basename(key: &str) -> &str {
    let key = key.trim_end_matches('/');
    match key.rfind('/') {
        Some(idx) => &key[idx + 1..],
        None => key,
    }
}

/// True if `prefix` is a prefix of `path` at a path-segment boundary, i.e.
/// `path == prefix` or `path` starts with `prefix + "/"`. The root prefix
/// (`""`) is a segment-boundary prefix of every path.
pub fn is_prefix(prefix: &str, path: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    path == prefix || path.starts_with(&format!("{prefix}/"))
}

/// The first path segment of `path` below `prefix`, i.e. what would appear
/// as a direct child's name when listing `prefix`. `path` must satisfy
/// [`is_prefix`] for `prefix`; returns `None` if `path == prefix` (no
/// segment below it).
pub fn first_segment_below<'a>(prefix: &str, path: &'a str) -> Option<&'a str> {
    let rest = if prefix.is_empty() {
        path
    } else if path == prefix {
        return None;
    } else {
        path.strip_prefix(prefix)?.strip_prefix('/')?
    };
    if rest.is_empty() {
        return None;
    }
    Some(match rest.find('/') {
        Some(idx) => &rest[..idx],
        None => rest,
    })
}

/// Build the composite key used as a path-index key in multi-tenant
/// backends: `namespace + ":" + key` when `namespace` is non-empty, else
/// `key` verbatim (spec §6).
pub fn composite_key(namespace: &str, key: &str) -> String {
    if namespace.is_empty() {
        key.to_string()
    } else {
        format!("{namespace}{NAMESPACE_SEPARATOR}{key}")
    }
}

/// Normalize a mount prefix: ensure a single leading `/`, and no trailing
/// `/` except for the root mount `/` itself (spec §4.5, §6).
pub fn normalize_mount_prefix(prefix: &str) -> String {
    let trimmed = normalize(prefix);
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_and_trims_slashes() {
        assert_eq!(normalize("/a//b/"), "a/b");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("/"), "");
    }

    #[test]
    fn join_handles_root_parent() {
        assert_eq!(join("", "a"), "a");
        assert_eq!(join("a", "b"), "a/b");
        assert_eq!(join("a/", "/b/"), "a/b");
    }

    #[test]
    fn parent_of_top_level_is_root() {
        assert_eq!(parent("a"), Some(String::new()));
        assert_eq!(parent("a/b"), Some("a".to_string()));
        assert_eq!(parent(""), None);
    }

    #[test]
    fn basename_returns_final_segment() {
        assert_eq!(basename("a/b/c"), "c");
        assert_eq!(basename("a"), "a");
        assert_eq!(basename(""), "");
    }

    #[test]
    fn is_prefix_respects_segment_boundaries() {
        assert!(is_prefix("", "a/b"));
        assert!(is_prefix("a", "a/b"));
        assert!(is_prefix("a", "a"));
        assert!(!is_prefix("a", "ab/c"));
    }

    #[test]
    fn first_segment_below_extracts_direct_child_name() {
        assert_eq!(first_segment_below("", "a/b"), Some("a"));
        assert_eq!(first_segment_below("a", "a/b/c"), Some("b"));
        assert_eq!(first_segment_below("a", "a"), None);
    }

    #[test]
    fn composite_key_uses_colon_separator_only_when_namespaced() {
        assert_eq!(composite_key("", "a/b"), "a/b");
        assert_eq!(composite_key("tenant1", "a/b"), "tenant1:a/b");
    }

    #[test]
    fn mount_prefix_normalizes_to_single_leading_slash() {
        assert_eq!(normalize_mount_prefix(""), "/");
        assert_eq!(normalize_mount_prefix("/"), "/");
        assert_eq!(normalize_mount_prefix("/data/"), "/data");
        assert_eq!(normalize_mount_prefix("data"), "/data");
    }
}
