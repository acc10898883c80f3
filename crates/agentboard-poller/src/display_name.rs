//! Display-name derivation and uniqueness (§I2: "`displayName` is unique
//! across all live Sessions").

/// Derive a base display name for a freshly discovered session: its slug if
/// it has one, otherwise the session id itself.
pub fn base_display_name(session_id: &str, slug: Option<&str>) -> String {
    slug.map(str::to_string).unwrap_or_else(|| session_id.to_string())
}

/// Find the first name in the sequence `base`, `base (2)`, `base (3)`, … not
/// already present in `existing`.
pub fn unique_display_name(base: &str, existing: &[String]) -> String {
    if !existing.iter().any(|n| n == base) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base} ({n})");
        if !existing.iter().any(|name| name == &candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_prefers_slug() {
        assert_eq!(base_display_name("sess-1", Some("starry-leaping-orbit")), "starry-leaping-orbit");
        assert_eq!(base_display_name("sess-1", None), "sess-1");
    }

    #[test]
    fn unique_name_passes_through_when_free() {
        assert_eq!(unique_display_name("alpha", &[]), "alpha");
    }

    #[test]
    fn unique_name_suffixes_on_collision() {
        let existing = vec!["alpha".to_string()];
        assert_eq!(unique_display_name("alpha", &existing), "alpha (2)");
    }

    #[test]
    fn unique_name_finds_next_free_suffix() {
        let existing = vec!["alpha".to_string(), "alpha (2)".to_string()];
        assert_eq!(unique_display_name("alpha", &existing), "alpha (3)");
    }
}
