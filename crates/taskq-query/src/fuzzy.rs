//! Fuzzy string matching.
//!
//! A pattern matches a text when its characters appear in the text in order
//! (a subsequence). How good the match is depends on where the characters
//! landed: a contiguous run at the start of a short text scores near 100, the
//! same characters scattered across a long text score much lower.
//!
//! Scores are integers in `0..=100`.

use serde::Serialize;

/// Score of an exact (case-insensitive) match.
pub const MAX_SCORE: u8 = 100;

/// Every subsequence match starts here before adjustments.
const BASE_SCORE: f64 = 50.0;

/// Characters that start a new word for the word-boundary bonus.
const WORD_SEPARATORS: [char; 4] = [' ', '-', '_', '/'];

/// A text that passed the threshold in [`match_many`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub text: String,
    pub score: u8,
    /// Index of the text in the input.
    pub index: usize,
}

/// Scores how well `pattern` matches `text`, from 0 (no match) to 100.
///
/// Matching ignores case. An exact match is 100; an empty pattern, an empty
/// text, or a pattern longer than the text is 0.
///
/// # Example
///
/// ```
/// use taskq_query::fuzzy::fuzzy_score;
///
/// assert_eq!(fuzzy_score("Backend", "backend"), 100);
/// assert!(fuzzy_score("bknd", "backend") > fuzzy_score("bknd", "bank and dock"));
/// assert_eq!(fuzzy_score("xyz", "backend"), 0);
/// ```
pub fn fuzzy_score(pattern: &str, text: &str) -> u8 {
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    let text: Vec<char> = text.to_lowercase().chars().collect();

    if pattern == text {
        return MAX_SCORE;
    }
    if pattern.is_empty() || text.is_empty() || pattern.len() > text.len() {
        return 0;
    }

    let Some(positions) = match_positions(&pattern, &text) else {
        return 0;
    };

    // Truncation, not rounding
    score_positions(&positions, &text).clamp(0.0, f64::from(MAX_SCORE)) as u8
}

/// Scores every text and keeps those scoring at least `threshold`, best
/// first.
///
/// Texts with equal scores keep their input order.
pub fn match_many<I, S>(pattern: &str, texts: I, threshold: u8) -> Vec<MatchResult>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut results: Vec<MatchResult> = texts
        .into_iter()
        .enumerate()
        .filter_map(|(index, text)| {
            let text = text.as_ref();
            let score = fuzzy_score(pattern, text);
            (score >= threshold).then(|| MatchResult {
                text: text.to_string(),
                score,
                index,
            })
        })
        .collect();

    // sort_by is stable, which is what keeps ties in input order
    results.sort_by(|a, b| b.score.cmp(&a.score));
    results
}

/// Greedy leftmost subsequence match.
///
/// Returns the text index of each pattern character, or `None` if the
/// pattern is not a subsequence of the text.
fn match_positions(pattern: &[char], text: &[char]) -> Option<Vec<usize>> {
    let mut positions = Vec::with_capacity(pattern.len());
    let mut wanted = pattern.iter().peekable();

    for (index, c) in text.iter().enumerate() {
        match wanted.peek() {
            Some(&p) if p == c => {
                positions.push(index);
                wanted.next();
            }
            Some(_) => {}
            None => break,
        }
    }

    (positions.len() == pattern.len()).then_some(positions)
}

/// Length of the longest run of adjacent positions.
fn longest_run(positions: &[usize]) -> usize {
    let mut longest = 1;
    let mut current = 1;
    for pair in positions.windows(2) {
        if pair[1] == pair[0] + 1 {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 1;
        }
    }
    longest
}

/// Applies the scoring heuristics to a successful match. The result is not
/// clamped.
fn score_positions(positions: &[usize], text: &[char]) -> f64 {
    let pattern_len = positions.len();
    let p = pattern_len as f64;
    let t = text.len() as f64;
    let starts_at_zero = positions[0] == 0;
    let run = longest_run(positions);

    let mut score = BASE_SCORE;

    // Share of the text covered by the pattern
    score += if pattern_len == text.len() {
        30.0
    } else {
        25.0 * p / t
    };

    if starts_at_zero {
        score += 12.0;
    }

    // Consecutive characters, damped for short patterns
    let mut run_bonus = 20.0 * run as f64 / p;
    if pattern_len < 3 {
        run_bonus *= 0.6;
    } else if pattern_len < 5 {
        run_bonus *= 0.8;
    }
    score += run_bonus;

    // Scatter
    score -= 4.0 * (pattern_len - run) as f64;
    if run == 1 {
        score -= 10.0;
    }

    // Earlier matches are better
    let average = positions.iter().sum::<usize>() as f64 / p;
    score += 10.0 * (1.0 - average / t);

    let after_non_alnum = positions
        .iter()
        .filter(|&&i| i == 0 || !text[i - 1].is_alphanumeric())
        .count();
    if after_non_alnum * 2 > pattern_len {
        score += 10.0;
    }

    let word_starts = positions
        .iter()
        .filter(|&&i| i == 0 || WORD_SEPARATORS.contains(&text[i - 1]))
        .count();
    if word_starts as f64 >= 0.3 * p {
        score += 8.0;
    }

    // Whole pattern as a prefix
    if starts_at_zero && run == pattern_len {
        score += if pattern_len == text.len() {
            20.0
        } else if pattern_len * 2 >= text.len() {
            10.0
        } else {
            5.0
        };
    }

    // Unmatched length
    let rate = if pattern_len < 3 {
        1.0
    } else if pattern_len < 5 {
        0.7
    } else {
        0.5
    };
    score -= (text.len() - pattern_len) as f64 * rate;

    score
}
