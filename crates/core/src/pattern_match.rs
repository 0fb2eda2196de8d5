//! Pattern matching for the LIKE operator.
//!
//! SQL LIKE with two wildcards:
//! - `%` matches zero or more characters
//! - `_` matches exactly one character
//!
//! Matching is **case-sensitive**, anchored at both ends, and operates on
//! Unicode scalar values.

use alloc::vec::Vec;

/// SQL LIKE pattern matching.
///
/// ```
/// use roster_core::pattern_match::like;
/// assert!(like("hello", "h%o"));
/// assert!(like("hello", "_ello"));
/// assert!(!like("Hello", "hello"));
/// ```
pub fn like(value: &str, pattern: &str) -> bool {
    let v: Vec<char> = value.chars().collect();
    let p: Vec<char> = pattern.chars().collect();

    // Greedy scan with a single backtrack point at the most recent `%`.
    let (mut vi, mut pi) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while vi < v.len() {
        if pi < p.len() && p[pi] == '%' {
            backtrack = Some((pi, vi));
            pi += 1;
        } else if pi < p.len() && (p[pi] == '_' || p[pi] == v[vi]) {
            vi += 1;
            pi += 1;
        } else if let Some((star_pi, star_vi)) = backtrack {
            // Let the last `%` swallow one more character.
            pi = star_pi + 1;
            vi = star_vi + 1;
            backtrack = Some((star_pi, star_vi + 1));
        } else {
            return false;
        }
    }

    p[pi..].iter().all(|&c| c == '%')
}
