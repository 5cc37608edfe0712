//! Path normalization for secondary content lookups.
//!
//! Content records are keyed by `id`, but the read path also resolves
//! them by URL path. Every path that enters the store (via upsert) or a
//! lookup (via `get_by_path`) goes through [`normalize`] first so both
//! sides agree on a single canonical form.

/// Canonicalizes a raw path into the form stored alongside content
/// records: exactly one leading and one trailing slash.
///
/// ```
/// use content_relay::domain::path::normalize;
///
/// assert_eq!(normalize("foo/bar"), "/foo/bar/");
/// assert_eq!(normalize("/foo/bar/"), "/foo/bar/");
/// assert_eq!(normalize("/"), "/");
/// ```
///
/// Query strings and fragments are stripped before normalization. Input
/// that cannot be read as a path (empty, or containing whitespace or
/// control characters) yields an empty string; callers treat an empty
/// normalized path as "matches nothing" rather than an error.
///
/// The function is idempotent: `normalize(normalize(p)) == normalize(p)`
/// for every input.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let stripped = raw.split(['?', '#']).next().unwrap_or("");

    if stripped.is_empty()
        || stripped
            .chars()
            .any(|c| c.is_control() || c.is_whitespace())
    {
        tracing::warn!(path = raw, "path could not be normalized");
        return String::new();
    }

    let core = stripped.trim_matches('/');
    if core.is_empty() {
        return "/".to_string();
    }

    format!("/{core}/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn adds_missing_slashes() {
        assert_eq!(normalize("foo/bar"), "/foo/bar/");
        assert_eq!(normalize("foo/bar/"), "/foo/bar/");
        assert_eq!(normalize("/foo/bar"), "/foo/bar/");
    }

    #[test]
    fn collapses_redundant_outer_slashes() {
        assert_eq!(normalize("//foo/bar///"), "/foo/bar/");
    }

    #[test]
    fn root_stays_root() {
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("///"), "/");
    }

    #[test]
    fn strips_query_and_fragment() {
        assert_eq!(normalize("/foo?page=2"), "/foo/");
        assert_eq!(normalize("/foo#section"), "/foo/");
    }

    #[test]
    fn unparseable_input_yields_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("foo bar"), "");
        assert_eq!(normalize("foo\nbar"), "");
    }

    #[test]
    fn idempotent_for_arbitrary_inputs() {
        for input in [
            "",
            "/",
            "foo",
            "/foo/",
            "//foo//bar//",
            "foo?x=1",
            "a b",
            "/deep/nested/path",
        ] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input:?}");
        }
    }
}
