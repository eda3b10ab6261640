//! Title normalization for concatenated camelCase chapter titles.
//!
//! PDF extraction frequently drops the spaces inside chapter titles
//! ("OnceUponaTime", "CarolOfTheBells"). Normalization re-inserts word
//! boundaries through an ordered sequence of pure `&str -> String` passes.
//! The order is a contract, not an accident: each pass assumes the ones
//! before it have already run, and reordering them produces wrong splits
//! (see the per-pass notes below).

use once_cell::sync::Lazy;
use regex::Regex;

/// Compound connectors must be handled before single connectors, or
/// "ofthe" would be split as two separate matches with wrong spacing.
/// Order within the list follows match priority.
const COMPOUND_CONNECTORS: &[(&str, &str)] = &[
    ("ofthe", "of the"),
    ("inthe", "in the"),
    ("onthe", "on the"),
    ("tothe", "to the"),
    ("forthe", "for the"),
    ("andthe", "and the"),
    ("atthe", "at the"),
    ("uponthe", "upon the"),
    ("ofmy", "of my"),
    ("inmy", "in my"),
    ("tomy", "to my"),
];

/// Single connector words recognized between a lowercase letter and an
/// uppercase letter. "a" needs no case boundary of its own, which is what
/// makes "OnceUponaTime" → "Once Upon a Time" work.
const SINGLE_CONNECTORS: &[&str] = &[
    "of", "the", "and", "for", "in", "a", "to", "upon", "with", "at", "on",
];

static ACRONYM_BOUNDARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z])([A-Z][a-z])").unwrap());

static COMPOUND_RES: Lazy<Vec<(Regex, String)>> = Lazy::new(|| {
    COMPOUND_CONNECTORS
        .iter()
        .map(|(compound, replacement)| {
            let re = Regex::new(&format!("([a-z])((?i:{}))([A-Z])", compound)).unwrap();
            (re, format!("$1 {} $3", replacement))
        })
        .collect()
});

static SINGLE_RES: Lazy<Vec<(Regex, String)>> = Lazy::new(|| {
    SINGLE_CONNECTORS
        .iter()
        .map(|connector| {
            let re = Regex::new(&format!("([a-z])({})([A-Z])", connector)).unwrap();
            (re, format!("$1 {} $3", connector))
        })
        .collect()
});

static CAMEL_BOUNDARY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z])([A-Z])").unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Pass 1: space between an uppercase letter and a following
/// uppercase+lowercase pair ("ANewFamily" → "A NewFamily").
///
/// Must run before the generic camel pass, which only sees
/// lowercase→uppercase boundaries and would leave "ANew" intact.
fn split_acronym_boundaries(text: &str) -> String {
    ACRONYM_BOUNDARY_RE.replace_all(text, "$1 $2").into_owned()
}

/// Pass 2: force a space after a leading "into" followed by an uppercase
/// letter ("IntoAdulthood" → "Into Adulthood").
///
/// Must run before the single-connector pass, whose "to" rule would
/// otherwise split this as "In to Adulthood".
fn space_leading_into(text: &str) -> String {
    let bytes = text.as_bytes();
    if bytes.len() > 4
        && text[..4].eq_ignore_ascii_case("into")
        && bytes[4].is_ascii_uppercase()
    {
        format!("{} {}", &text[..4], &text[4..])
    } else {
        text.to_string()
    }
}

/// Pass 3: compound multi-word connectors ("CarolOfTheBells" →
/// "Carol of the Bells").
fn split_compound_connectors(text: &str) -> String {
    let mut result = text.to_string();
    for (re, replacement) in COMPOUND_RES.iter() {
        result = re.replace_all(&result, replacement.as_str()).into_owned();
    }
    result
}

/// Pass 4: single connector words in `[a-z]connector[A-Z]` context.
fn split_single_connectors(text: &str) -> String {
    let mut result = text.to_string();
    for (re, replacement) in SINGLE_RES.iter() {
        result = re.replace_all(&result, replacement.as_str()).into_owned();
    }
    result
}

/// Pass 5: generic camelCase boundary ("MyFirst" → "My First"). Runs last
/// among the splitting passes so the connector rules see original
/// boundaries.
fn split_camel_boundaries(text: &str) -> String {
    CAMEL_BOUNDARY_RE.replace_all(text, "$1 $2").into_owned()
}

/// Pass 6: collapse whitespace runs and trim.
fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Split a concatenated camelCase title into a human-readable phrase.
///
/// Deterministic and pure; applies the ordered passes above. Text that
/// already contains spaces passes through unchanged apart from whitespace
/// collapsing, so the function is stable under re-application.
pub fn normalize_title(text: &str) -> String {
    let passes: &[fn(&str) -> String] = &[
        split_acronym_boundaries,
        space_leading_into,
        split_compound_connectors,
        split_single_connectors,
        split_camel_boundaries,
        collapse_whitespace,
    ];
    passes.iter().fold(text.to_string(), |s, pass| pass(&s))
}

/// Fold text into the form used for comparisons: lowercase, single-spaced,
/// trimmed. Applied to both TOC titles and candidate body lines so the two
/// sides compare symmetrically.
pub fn fold_for_comparison(text: &str) -> String {
    WHITESPACE_RE
        .replace_all(&text.to_lowercase(), " ")
        .trim()
        .to_string()
}
