//! Query preprocessing: pull a reference URL out of free-form text.
//!
//! A URL is `http://` or `https://`, a dotted host (percent-escapes allowed),
//! an optional `:port`, and an optional path/query/fragment. Trailing sentence
//! punctuation (`.`, `,`, `)`, `!`, ...) is not part of the match.
//!
//! Every matched URL is deleted from the text verbatim. Surrounding whitespace
//! is left alone, so `"Analyze https://a.com/x and summarize"` becomes
//! `"Analyze  and summarize"` (two spaces); only the ends are trimmed.

use std::sync::OnceLock;

use regex::Regex;

const URL_PATTERN: &str = concat!(
    r"https?://",
    r"(?:[-\w]|%[0-9A-Fa-f]{2})+(?:\.(?:[-\w]|%[0-9A-Fa-f]{2})+)*",
    r"(?::\d+)?",
    r"(?:[/?#](?:[-\w.~:/?#\[\]@!$&'()*+,;=%]*[-\w~/#=&%+@$*])?)?",
);

fn url_regex() -> &'static Regex {
    static URL_RE: OnceLock<Regex> = OnceLock::new();
    URL_RE.get_or_init(|| Regex::new(URL_PATTERN).expect("URL pattern is a valid regex"))
}

/// Split `query` into the first referenced URL and the query with all URLs removed.
pub fn extract_reference(query: &str) -> (Option<String>, String) {
    let re = url_regex();
    let url = re.find(query).map(|m| m.as_str().to_string());

    let mut clean = query.to_string();
    // A deletion can splice fragments into a new URL; repeat until none remain.
    while re.is_match(&clean) {
        clean = re.replace_all(&clean, "").into_owned();
    }

    (url, clean.trim().to_string())
}

/// All URLs referenced in `query`, in order of appearance.
pub fn find_references(query: &str) -> Vec<String> {
    url_regex()
        .find_iter(query)
        .map(|m| m.as_str().to_string())
        .collect()
}
