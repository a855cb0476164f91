//! Spelling suggestions for misspelled keywords.
//!
//! When statement parsing fails on a line that began with an identifier, the
//! error message offers the closest keyword (`fnc` -> `func`) if one is
//! within a small edit distance.

use veld_scanner::KEYWORDS;

/// Find the keyword closest to `name`, if any is close enough to be a
/// plausible typo.
///
/// Candidates whose length differs by more than a third of the name's length
/// are skipped; candidates shorter than 3 characters only match on
/// case-insensitive equality. The distance budget scales with the name
/// length.
pub fn get_spelling_suggestion<'a>(name: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let name_len = name.len();
    let max_length_diff = (name_len * 34 / 100).max(1);
    let mut best_distance = name_len / 3 + 1;
    let mut best_candidate: Option<&str> = None;

    for &candidate in candidates {
        if candidate == name {
            continue;
        }
        if name_len.abs_diff(candidate.len()) > max_length_diff {
            continue;
        }
        if candidate.len() < 3 {
            if candidate.eq_ignore_ascii_case(name) {
                return Some(candidate);
            }
            continue;
        }
        if let Some(distance) = levenshtein_with_max(name, candidate, best_distance) {
            if distance < best_distance || best_candidate.is_none() {
                best_distance = distance;
                best_candidate = Some(candidate);
            }
        }
    }

    best_candidate
}

/// Keyword suggestion for an identifier, or `None` when nothing is close.
pub fn suggest_keyword(text: &str) -> Option<String> {
    if veld_scanner::text_to_keyword(text).is_some() {
        return None;
    }
    get_spelling_suggestion(text, KEYWORDS).map(str::to_string)
}

/// Levenshtein distance with early termination once the distance exceeds
/// `max`. Case-only substitutions count as free.
fn levenshtein_with_max(s1: &str, s2: &str, max: usize) -> Option<usize> {
    let s1: Vec<u8> = s1.bytes().collect();
    let s2: Vec<u8> = s2.bytes().collect();

    let mut previous: Vec<usize> = (0..=s2.len()).collect();
    let mut current = vec![0usize; s2.len() + 1];

    for (i, &c1) in s1.iter().enumerate() {
        current[0] = i + 1;
        let mut row_min = current[0];
        for (j, &c2) in s2.iter().enumerate() {
            let substitution_cost = if c1 == c2 || c1.eq_ignore_ascii_case(&c2) {
                0
            } else {
                1
            };
            let dist = (previous[j] + substitution_cost)
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
            current[j + 1] = dist;
            row_min = row_min.min(dist);
        }
        if row_min > max {
            return None;
        }
        std::mem::swap(&mut previous, &mut current);
    }

    let result = previous[s2.len()];
    if result > max {
        None
    } else {
        Some(result)
    }
}
