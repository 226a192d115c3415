//! Fuzzy matching algorithms.
//!
//! Character-level edit distances plus the percentage ratios the scorer
//! blends together. All ratios are integer percentages in `0..=100`,
//! rounded half-to-even.

use std::collections::BTreeSet;

/// Calculate Levenshtein edit distance between two strings.
///
/// # Arguments
/// * `a` - First string
/// * `b` - Second string
///
/// # Returns
/// Number of single-character edits needed to transform a into b
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 { return n; }
    if n == 0 { return m; }

    // Use two rows for space optimization
    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Length of the longest common subsequence of two character slices.
pub fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let n = b.len();
    let mut prev = vec![0usize; n + 1];
    let mut curr = vec![0usize; n + 1];

    for &ca in a {
        for j in 1..=n {
            curr[j] = if ca == b[j - 1] {
                prev[j - 1] + 1
            } else {
                prev[j].max(curr[j - 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Insertions plus deletions needed to turn `a` into `b`.
#[inline]
pub fn indel_distance(a: &[char], b: &[char]) -> usize {
    a.len() + b.len() - 2 * lcs_len(a, b)
}

/// Indel similarity normalized to [0, 1]. Two empty inputs are identical.
pub fn normalized_indel_similarity(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    1.0 - indel_distance(a, b) as f64 / total as f64
}

#[inline]
fn to_percent(similarity: f64) -> u8 {
    (similarity * 100.0).round_ties_even().clamp(0.0, 100.0) as u8
}

fn ratio_chars(a: &[char], b: &[char]) -> u8 {
    to_percent(normalized_indel_similarity(a, b))
}

/// Overall similarity of two strings as a percentage.
///
/// No preprocessing is applied; callers lower-case as needed.
pub fn ratio(a: &str, b: &str) -> u8 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    ratio_chars(&a_chars, &b_chars)
}

/// Best `ratio` of the shorter string against any alignment of the longer.
///
/// Windows slide across the longer string, including the partial windows
/// that hang off its start and end. Equal-length inputs are tried in both
/// directions. Every window is tried even for long needles, so inputs over
/// 64 characters can score above rapidfuzz's block-seeded search.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() || b_chars.is_empty() {
        return if a_chars.len() == b_chars.len() { 100 } else { 0 };
    }

    if a_chars.len() == b_chars.len() {
        return best_window(&a_chars, &b_chars).max(best_window(&b_chars, &a_chars));
    }

    if a_chars.len() < b_chars.len() {
        best_window(&a_chars, &b_chars)
    } else {
        best_window(&b_chars, &a_chars)
    }
}

fn best_window(needle: &[char], haystack: &[char]) -> u8 {
    let len1 = needle.len();
    let len2 = haystack.len();
    let mut best = 0u8;

    let mut consider = |window: &[char]| {
        best = best.max(ratio_chars(needle, window));
        best == 100
    };

    // Prefixes shorter than the needle
    for end in 1..len1.min(len2) {
        if consider(&haystack[..end]) {
            return 100;
        }
    }

    // Full-length windows
    for start in 0..=len2.saturating_sub(len1) {
        let end = (start + len1).min(len2);
        if consider(&haystack[start..end]) {
            return 100;
        }
    }

    // Suffixes shorter than the needle
    for start in (len2.saturating_sub(len1) + 1)..len2 {
        if consider(&haystack[start..]) {
            return 100;
        }
    }

    best
}

/// Normalizes a string for token comparisons.
///
/// With `force_ascii`, code points U+0080..=U+00FF are dropped. Every
/// character that is neither alphanumeric nor `_` becomes a space; the
/// result is lower-cased and trimmed.
pub fn full_process(s: &str, force_ascii: bool) -> String {
    let replaced: String = s
        .chars()
        .filter(|c| !(force_ascii && ('\u{80}'..='\u{ff}').contains(c)))
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect();

    replaced.to_lowercase().trim().to_string()
}

fn sorted_tokens(processed: &str) -> String {
    let mut tokens: Vec<&str> = processed.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// `ratio` after processing both strings and sorting their tokens.
pub fn token_sort_ratio(a: &str, b: &str, force_ascii: bool) -> u8 {
    let a_sorted = sorted_tokens(&full_process(a, force_ascii));
    let b_sorted = sorted_tokens(&full_process(b, force_ascii));
    ratio(&a_sorted, &b_sorted)
}

/// Similarity based on the overlap of the processed token sets.
pub fn token_set_ratio(a: &str, b: &str, force_ascii: bool) -> u8 {
    let a_processed = full_process(a, force_ascii);
    let b_processed = full_process(b, force_ascii);

    if a_processed.is_empty() || b_processed.is_empty() {
        return 0;
    }

    let a_tokens: BTreeSet<&str> = a_processed.split_whitespace().collect();
    let b_tokens: BTreeSet<&str> = b_processed.split_whitespace().collect();

    let intersection: Vec<&str> = a_tokens.intersection(&b_tokens).copied().collect();
    let diff_ab: Vec<&str> = a_tokens.difference(&b_tokens).copied().collect();
    let diff_ba: Vec<&str> = b_tokens.difference(&a_tokens).copied().collect();

    if !intersection.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100;
    }

    let sect = intersection.join(" ");
    let combined_ab = join_nonempty(&sect, &diff_ab.join(" "));
    let combined_ba = join_nonempty(&sect, &diff_ba.join(" "));

    let mut best = ratio(&combined_ab, &combined_ba);
    if !sect.is_empty() {
        best = best
            .max(ratio(&sect, &combined_ab))
            .max(ratio(&sect, &combined_ba));
    }
    best
}

fn join_nonempty(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (false, true) => head.to_string(),
        (false, false) => format!("{} {}", head, tail),
    }
}
