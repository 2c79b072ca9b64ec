use crate::text::normalize;

/// Ratcliff/Obershelp ratio of the normalized inputs, in `[0, 1]`.
///
/// Returns 0.0 when either side normalizes to the empty string. The greedy
/// longest-run split depends on argument order, so both orders are scored and
/// the larger ratio is kept.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = normalize(a).chars().collect();
    let b: Vec<char> = normalize(b).chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let matched = matching_chars(&a, &b, 0, a.len(), 0, b.len())
        .max(matching_chars(&b, &a, 0, b.len(), 0, a.len()));
    2.0 * matched as f64 / (a.len() + b.len()) as f64
}

/// Total size of the matching blocks within `a[alo..ahi]` and `b[blo..bhi]`.
fn matching_chars(a: &[char], b: &[char], alo: usize, ahi: usize, blo: usize, bhi: usize) -> usize {
    let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
    if k == 0 {
        return 0;
    }
    let mut total = k;
    if alo < i && blo < j {
        total += matching_chars(a, b, alo, i, blo, j);
    }
    if i + k < ahi && j + k < bhi {
        total += matching_chars(a, b, i + k, ahi, j + k, bhi);
    }
    total
}

/// Longest common run; ties go to the earliest start in `a`, then in `b`.
fn longest_match(a: &[char], b: &[char], alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    for i in alo..ahi {
        for j in blo..bhi {
            let mut k = 0;
            while i + k < ahi && j + k < bhi && a[i + k] == b[j + k] {
                k += 1;
            }
            if k > best_k {
                (best_i, best_j, best_k) = (i, j, k);
            }
        }
    }
    (best_i, best_j, best_k)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "John Doe", "Jon Doe", "Anna Smith", "Ana Smith", "Smith", "abcd", "bcda",
        "Müller", "Thomas Müller-Lüdenscheidt", "", "x",
    ];

    #[test]
    fn identical_is_one() {
        assert_eq!(similarity("Jane Doe", "jane   DOE"), 1.0);
        assert_eq!(similarity("x", "x"), 1.0);
    }

    #[test]
    fn empty_side_is_zero() {
        assert_eq!(similarity("Jane", ""), 0.0);
        assert_eq!(similarity("", "Jane"), 0.0);
        assert_eq!(similarity("...", "Jane"), 0.0);
    }

    #[test]
    fn symmetric_on_samples() {
        for a in SAMPLES {
            for b in SAMPLES {
                assert_eq!(similarity(a, b), similarity(b, a), "{:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn bounded() {
        for a in SAMPLES {
            for b in SAMPLES {
                let s = similarity(a, b);
                assert!((0.0..=1.0).contains(&s), "{} out of range", s);
            }
        }
    }

    #[test]
    fn known_ratios() {
        // "john" vs "jon": "jo" + "n" = 3 matched chars out of 7
        assert!((similarity("john", "jon") - 6.0 / 7.0).abs() < 1e-12);
        // "ana" vs "anna": "an" + "a" = 3 of 7
        assert!((similarity("ana", "anna") - 6.0 / 7.0).abs() < 1e-12);
        assert_eq!(similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn misspelling_scores_above_unrelated() {
        assert!(similarity("Jon Doe", "John Doe") > similarity("Jon Doe", "Mary Major"));
    }
}
