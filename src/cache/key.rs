//! Cache key derivation.
//!
//! A request path maps to a flat file stem: every `/` becomes `_`, then
//! leading and trailing underscores are trimmed. `/blog/post-1` and
//! `/blog/post-1/` therefore share the stem `blog_post-1`, and the root
//! path `/` collapses to the empty stem. The query string plays no part in
//! the key; `/page?a=1` and `/page?a=2` are the same entry.
//!
//! Artifact names are relative to the store root and always live under one
//! subdirectory, so a cache root can be shared with other data without the
//! entries mixing in.

/// Subdirectory of the store root that holds every cache artifact.
pub(crate) const CACHE_DIR: &str = "fscache";

/// Derives the file stem for a request path.
pub fn stem(path: &str) -> String {
    path.replace('/', "_").trim_matches('_').to_owned()
}

/// Builds the store-relative artifact name for a request path and extension.
///
/// # Examples
///
/// ```
/// use fscache::cache::key::artifact_name;
///
/// assert_eq!(artifact_name("/blog/post-1", "html"), "fscache/blog_post-1.html");
/// assert_eq!(artifact_name("/blog/post-1", "json"), "fscache/blog_post-1.json");
/// ```
pub fn artifact_name(path: &str, ext: &str) -> String {
    format!("{CACHE_DIR}/{}.{ext}", stem(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_path_flattens_to_underscores() {
        assert_eq!(stem("/blog/post-1"), "blog_post-1");
        assert_eq!(stem("/a/b/c"), "a_b_c");
    }

    #[test]
    fn trailing_slash_collapses_to_same_stem() {
        assert_eq!(stem("/a/b"), stem("/a/b/"));
    }

    #[test]
    fn root_path_yields_empty_stem() {
        assert_eq!(stem("/"), "");
        assert_eq!(artifact_name("/", "html"), "fscache/.html");
    }

    #[test]
    fn interior_underscores_survive_trimming() {
        assert_eq!(stem("/snake_case/page"), "snake_case_page");
        // Underscores that were already at the edges are trimmed along with
        // the ones substituted for slashes.
        assert_eq!(stem("/_private/"), "private");
    }

    #[test]
    fn artifact_names_pair_up() {
        assert_eq!(artifact_name("/blog/post-1", "html"), "fscache/blog_post-1.html");
        assert_eq!(artifact_name("/blog/post-1/", "json"), "fscache/blog_post-1.json");
    }
}
