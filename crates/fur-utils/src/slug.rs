use std::sync::LazyLock;

use regex::Regex;

static ILLEGAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[<>:"/\\|?*\x00-\x1F]"#).expect("unable to compile illegal path char regex")
});

static UNDERSCORE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_{2,}").expect("unable to compile underscore run regex"));

/// Derives a filesystem-safe directory name from a package name.
///
/// Characters that are illegal in path segments become `_`, runs of `_` are
/// collapsed into one, and leading/trailing `_` are trimmed. Distinct names may
/// map to the same slug; callers that need uniqueness must check for it.
///
/// # Examples
///
/// ```
/// use fur_utils::slug::sanitize;
///
/// assert_eq!(sanitize("acme/web:framework"), "acme_web_framework");
/// assert_eq!(sanitize(sanitize("//a??b//").as_str()), "a_b");
/// ```
pub fn sanitize(name: &str) -> String {
    let replaced = ILLEGAL_RE.replace_all(name, "_");
    let collapsed = UNDERSCORE_RUN_RE.replace_all(&replaced, "_");
    collapsed.trim_matches('_').to_string()
}

/// Whether `slug` can be used as a single directory below the registry root.
pub fn is_usable(slug: &str) -> bool {
    !slug.is_empty() && slug != "." && slug != ".."
}
