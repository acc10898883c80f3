//! Project-path encoding for Claude's `projects/<encoded-project-path>/` layout
//! (§4.1). `/` encodes to `-`; decoding is the inverse with best-effort
//! reconstruction, since the encoding is lossy when the original path itself
//! contains a literal `-`.

/// Encode a POSIX project path into Claude's directory-name form.
pub fn encode_project_path(path: &str) -> String {
    path.replace('/', "-")
}

/// Decode a Claude-encoded directory name back into a POSIX path.
///
/// Best-effort: every `-` is treated as a former `/`, which round-trips cleanly for
/// paths with no literal hyphens in their segments. A leading encoded path always
/// started with `/`, so the result always starts with `/`.
pub fn decode_project_path(encoded: &str) -> String {
    let decoded = encoded.replace('-', "/");
    if decoded.starts_with('/') {
        decoded
    } else {
        format!("/{decoded}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_replaces_slashes() {
        assert_eq!(encode_project_path("/tmp/alpha/beta"), "-tmp-alpha-beta");
    }

    #[test]
    fn decode_is_inverse_for_hyphen_free_paths() {
        let original = "/tmp/alpha/beta";
        let encoded = encode_project_path(original);
        assert_eq!(decode_project_path(&encoded), original);
    }

    #[test]
    fn decode_adds_leading_slash_if_missing() {
        assert_eq!(decode_project_path("tmp-alpha"), "/tmp/alpha");
    }

    #[test]
    fn round_trip_property_for_generated_paths() {
        for segments in [
            vec!["tmp", "a"],
            vec!["home", "user", "project", "src"],
            vec!["var"],
        ] {
            let original = format!("/{}", segments.join("/"));
            let encoded = encode_project_path(&original);
            assert_eq!(decode_project_path(&encoded), original);
        }
    }
}
