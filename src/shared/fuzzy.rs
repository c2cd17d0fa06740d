use std::{cmp, mem::swap};

/// Levenshtein edit distance over chars, two rolling rows.
pub(crate) fn distance(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return cmp::max(a.len(), b.len());
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];
    for (i, ac) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, bc) in b.iter().enumerate() {
            let sub_cost = if ac == bc { 0 } else { 1 };
            current[j + 1] = cmp::min(
                cmp::min(previous[j + 1] + 1, current[j] + 1),
                previous[j] + sub_cost,
            );
        }
        swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// Scores how well `needle` matches `hay`, both already lowercased.
/// Each needle token is matched against its best hay token; a token that is a
/// prefix of a hay token counts as a full match so partially typed names rank well.
pub(crate) fn score(needle: &str, hay: &str) -> f64 {
    let hay_tokens: Vec<_> = hay.split_whitespace().collect();
    let needle_tokens: Vec<_> = needle.split_whitespace().collect();
    if needle_tokens.is_empty() || hay_tokens.is_empty() {
        return 0.0;
    }

    let total: f64 = needle_tokens
        .iter()
        .map(|token| {
            hay_tokens
                .iter()
                .map(|hay_token| token_score(token, hay_token))
                .fold(0.0, f64::max)
        })
        .sum();
    total / needle_tokens.len() as f64
}

fn token_score(token: &str, hay_token: &str) -> f64 {
    if hay_token.starts_with(token) {
        return 1.0;
    }
    let longest = cmp::max(token.chars().count(), hay_token.chars().count());
    1.0 - distance(token, hay_token) as f64 / longest as f64
}

#[test]
fn fuzzy_empty_vs_nonempty() {
    assert_eq!(distance("", "abc"), 3);
    assert_eq!(distance("abc", ""), 3);
}

#[test]
fn fuzzy_substitution() {
    assert_eq!(distance("cat", "cut"), 1);
}

#[test]
fn fuzzy_insertion_deletion() {
    assert_eq!(distance("cat", "cart"), 1);
    assert_eq!(distance("cart", "cat"), 1);
}

#[test]
fn fuzzy_unicode() {
    assert_eq!(distance("café", "cafe"), 1);
}

#[test]
fn fuzzy_longer_sequence() {
    assert_eq!(distance("intention", "execution"), 5);
}

#[test]
fn score_prefix_is_full_match() {
    assert_eq!(score("kand", "kandy bus stand"), 1.0);
}

#[test]
fn score_token_order_does_not_matter() {
    assert_eq!(score("stand kandy", "kandy bus stand"), 1.0);
}
