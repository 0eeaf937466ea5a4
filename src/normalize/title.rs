//! Canonical movie-name resolution.
//!
//! Report titles arrive uppercased, wrapped in language tags, sometimes with
//! a digit standing in for a letter ("Z0NE"). Both sides are normalized
//! through the same pipeline and compared with a token-set ratio; the
//! first canonical entry reaching the best score wins.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Minimum token-set score for replacing an observed title.
pub const MATCH_THRESHOLD: u32 = 80;

static BRACKET_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]|\([^)]*\)").unwrap());

/// Lowercase, strip bracketed tags, fold `0` used as a letter, map
/// punctuation to spaces, collapse whitespace and drop a leading article.
pub fn normalize_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let untagged = BRACKET_TAG_RE.replace_all(&lowered, " ");

    let mut folded = String::with_capacity(untagged.len());
    let chars: Vec<char> = untagged.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c == '0' {
            let prev_alpha = i > 0 && chars[i - 1].is_alphabetic();
            let next_alpha = chars.get(i + 1).map(|n| n.is_alphabetic()).unwrap_or(false);
            if prev_alpha || next_alpha {
                folded.push('o');
                continue;
            }
        }
        if c.is_alphanumeric() {
            folded.push(c);
        } else {
            folded.push(' ');
        }
    }

    let mut words: Vec<&str> = folded.split_whitespace().collect();
    if matches!(words.first(), Some(&"the") | Some(&"al")) {
        words.remove(0);
    }
    words.join(" ")
}

/// Token-set similarity in 0..=100. Order-insensitive: shared tokens are
/// compared against each side's full sorted token string and the best of
/// the three pairings is kept.
pub fn similarity(a: &str, b: &str) -> u32 {
    let ta: BTreeSet<&str> = a.split_whitespace().collect();
    let tb: BTreeSet<&str> = b.split_whitespace().collect();
    if ta.is_empty() && tb.is_empty() {
        return 100;
    }
    if ta.is_empty() || tb.is_empty() {
        return 0;
    }

    let inter: Vec<&str> = ta.intersection(&tb).copied().collect();
    let only_a: Vec<&str> = ta.difference(&tb).copied().collect();
    let only_b: Vec<&str> = tb.difference(&ta).copied().collect();

    let joined = |base: &[&str], extra: &[&str]| -> String {
        let mut parts: Vec<&str> = base.to_vec();
        parts.extend_from_slice(extra);
        parts.join(" ")
    };

    let sect = inter.join(" ");
    let combined_a = joined(&inter, &only_a);
    let combined_b = joined(&inter, &only_b);

    ratio(&sect, &combined_a)
        .max(ratio(&sect, &combined_b))
        .max(ratio(&combined_a, &combined_b))
}

/// Levenshtein-based ratio in 0..=100.
fn ratio(a: &str, b: &str) -> u32 {
    let la = a.chars().count();
    let lb = b.chars().count();
    if la + lb == 0 {
        return 100;
    }
    let dist = levenshtein(a, b);
    (((la + lb - dist) * 100 + (la + lb) / 2) / (la + lb)) as u32
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Resolve an observed title against the canonical list. Returns the
/// replacement title and the winning score; below the threshold the
/// observed title passes through unchanged.
pub fn resolve_title(observed: &str, canonical: &[String]) -> (String, u32) {
    let norm_observed = normalize_title(observed);
    let mut best: Option<(&String, u32)> = None;
    for candidate in canonical {
        let norm_candidate = normalize_title(candidate);
        let score = if norm_candidate == norm_observed {
            100
        } else {
            similarity(&norm_observed, &norm_candidate)
        };
        // Strictly-greater keeps the earliest candidate on ties.
        if best.map(|(_, s)| score > s).unwrap_or(true) {
            best = Some((candidate, score));
        }
        if score == 100 {
            break;
        }
    }
    match best {
        Some((winner, score)) if score >= MATCH_THRESHOLD => (winner.clone(), score),
        Some((_, score)) => (observed.to_string(), score),
        None => (observed.to_string(), 0),
    }
}
