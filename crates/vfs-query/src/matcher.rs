/// Match a content-type filter pattern against an actual content type
/// (spec §4.4 step 2). `"*"` and `"*/*"` match everything. Otherwise both
/// sides are split into `type/subtype`; each part matches literally or via
/// a `*` wildcard, and the number of parts must agree.
pub fn content_type_matches(pattern: &str, actual: &str) -> bool {
    if pattern == "*" || pattern == "*/*" {
        return true;
    }
    let pattern_parts: Vec<&str> = pattern.splitn(2, '/').collect();
    let actual_parts: Vec<&str> = actual.splitn(2, '/').collect();
    if pattern_parts.len() != actual_parts.len() {
        return false;
    }
    pattern_parts
        .iter()
        .zip(actual_parts.iter())
        .all(|(p, a)| *p == "*" || p == a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_matches_everything() {
        assert!(content_type_matches("*", "image/png"));
        assert!(content_type_matches("*/*", "text/plain"));
    }

    #[test]
    fn subtype_wildcard_matches_family() {
        assert!(content_type_matches("image/*", "image/png"));
        assert!(!content_type_matches("image/*", "text/plain"));
    }

    #[test]
    fn exact_match_required_without_wildcard() {
        assert!(content_type_matches("text/plain", "text/plain"));
        assert!(!content_type_matches("text/plain", "text/html"));
    }

    #[test]
    fn mismatched_part_count_never_matches() {
        assert!(!content_type_matches("image/png", "image"));
    }
}
