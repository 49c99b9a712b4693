use regex::{Captures, Regex};
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// A cleaned title/year pair, attempted against the external lookup in
/// rank order (lower rank first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub query_title: String,
    pub query_year: Option<i32>,
    pub rank: usize,
}

// Trailing release year: "Title (1995)"
static RE_TRAILING_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\((\d{4})\)\s*$").unwrap());

// Trailing article: "Name, The" / "Name, A" / "Name, An"
static RE_TRAILING_ARTICLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.*),\s*(The|A|An)$").unwrap());

// Any parenthetical group; content is checked against RE_YEAR_ONLY before
// removal so year suffixes survive this stage.
static RE_PAREN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\(([^)]*)\)\s*").unwrap());
static RE_YEAR_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}$").unwrap());

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Collapse runs of whitespace and trim.
fn tidy(s: &str) -> String {
    RE_WHITESPACE.replace_all(s, " ").trim().to_string()
}

/// Extract the trailing parenthesized year, if any.
pub fn extract_year(raw_title: &str) -> Option<i32> {
    RE_TRAILING_YEAR
        .captures(raw_title)
        .and_then(|c| c[1].parse().ok())
}

/// Remove the trailing parenthesized year.
fn strip_year(title: &str) -> String {
    tidy(&RE_TRAILING_YEAR.replace(title, ""))
}

/// Rewrite "Name, The" to "The Name".
fn move_trailing_article(title: &str) -> String {
    match RE_TRAILING_ARTICLE.captures(title) {
        Some(c) => tidy(&format!("{} {}", &c[2], &c[1])),
        None => title.to_string(),
    }
}

/// Remove parenthetical alternate-title annotations, e.g. "(a.k.a. ...)".
/// Parentheticals holding a bare 4-digit year are left alone.
fn strip_alternates(title: &str) -> String {
    let stripped = RE_PAREN.replace_all(title, |caps: &Captures| {
        if RE_YEAR_ONLY.is_match(&caps[1]) {
            caps[0].to_string()
        } else {
            " ".to_string()
        }
    });
    tidy(&stripped)
}

/// Strip surrounding quote characters.
fn strip_quotes(title: &str) -> String {
    tidy(title.trim_matches(['"', '\'']))
}

/// Fold Unicode diacritics to their ASCII base letters ('Cité' -> 'Cite').
/// Characters without a base letter pass through unchanged.
fn fold_diacritics(title: &str) -> String {
    title.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Pull a short alternate title out of parentheses, e.g.
/// "Léon (The Professional)" -> "The Professional". Long or comma-bearing
/// parentheticals are annotations, not titles.
fn extract_alternate(title: &str) -> Option<String> {
    let caps = RE_PAREN.captures(title)?;
    let inside = tidy(&caps[1]);
    if inside.is_empty()
        || inside.len() > 30
        || inside.contains(',')
        || RE_YEAR_ONLY.is_match(&inside)
    {
        return None;
    }
    Some(inside)
}

/// Fully cleaned form of a raw title, used as the persisted title.
pub fn canonical_title(raw_title: &str) -> String {
    let t = strip_year(&tidy(raw_title));
    let t = move_trailing_article(&t);
    let t = strip_alternates(&t);
    let t = strip_quotes(&t);
    tidy(&fold_diacritics(&t))
}

/// Generate the ordered, deduplicated list of lookup candidates for one raw
/// title. Each cleaning stage feeds the next and contributes its own
/// candidate, so partially cleaned forms are tried too; the raw title itself
/// comes last. Pure and deterministic.
pub fn generate_candidates(raw_title: &str, hinted_year: Option<i32>) -> Vec<Candidate> {
    let raw = tidy(raw_title);
    let query_year = hinted_year.or_else(|| extract_year(&raw));

    let yearless = strip_year(&raw);
    let articled = move_trailing_article(&yearless);
    let no_alternates = strip_alternates(&articled);
    let unquoted = strip_quotes(&no_alternates);
    let folded = tidy(&fold_diacritics(&unquoted));

    let mut titles = vec![yearless.clone(), articled, no_alternates, unquoted, folded];
    if let Some(alt) = extract_alternate(&yearless) {
        titles.push(alt);
    }
    titles.push(raw);

    let mut seen = Vec::new();
    for title in titles {
        if !title.is_empty() && !seen.contains(&title) {
            seen.push(title);
        }
    }

    seen.into_iter()
        .enumerate()
        .map(|(rank, query_title)| Candidate {
            query_title,
            query_year,
            rank,
        })
        .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
