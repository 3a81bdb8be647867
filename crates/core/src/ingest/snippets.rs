use regex::Regex;
use std::sync::LazyLock;

static LIST_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*•]+|\d{1,3}[.)])\s+").expect("static regex must compile")
});

static CITATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\d+\]").expect("static regex must compile"));

/// Removes Markdown code fences (```lang ... ```) around a model answer.
pub fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    let mut inner = trimmed;
    if let Some(after_first) = inner.splitn(2, '\n').nth(1) {
        inner = after_first;
    } else {
        return "";
    }
    if let Some(end) = inner.rfind("```") {
        inner = &inner[..end];
    }
    inner.trim()
}

/// Splits a free-text answer into at most `max` news snippets.
///
/// Lines lose bullet/numbering prefixes and `[n]` citation markers, then each line is
/// split into sentences on `". "`. Blank pieces are dropped.
pub fn split_snippets(text: &str, max: usize) -> Vec<String> {
    strip_fences(text)
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .map(|line| LIST_MARKER_RE.replace(line, ""))
        .map(|line| CITATION_RE.replace_all(&line, "").into_owned())
        .flat_map(|line| {
            line.split(". ")
                .map(|s| s.trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|s| !s.is_empty())
        .take(max)
        .collect()
}
