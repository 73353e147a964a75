//! Patch-wise text similarity.
//!
//! Both texts are cut into fixed-size patches and every source patch is
//! compared with every candidate patch. The score is the best single pair, so
//! a passage quoted anywhere inside a long page still scores high.
//!
//! Cost is `P_source * P_candidate` ratio computations, each up to quadratic
//! in the patch length. Callers on an async runtime run it on the blocking
//! pool (see `SourceFinder`).

use std::collections::HashMap;

pub const DEFAULT_PATCH_SIZE: usize = 380;
pub const DEFAULT_MINIMUM_TAIL_PATCH: usize = 140;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchSettings {
    /// Length of each patch, in characters. Also the stride between patches.
    pub patch_size: usize,
    /// No patch starts within this many characters of the end of the text.
    pub minimum_tail_patch: usize,
}

impl Default for PatchSettings {
    fn default() -> Self {
        Self {
            patch_size: DEFAULT_PATCH_SIZE,
            minimum_tail_patch: DEFAULT_MINIMUM_TAIL_PATCH,
        }
    }
}

/// Split `text` into patches. Offsets run from 0 in steps of `patch_size` and
/// stay strictly below `len - minimum_tail_patch`; the last patch may be short.
/// Texts no longer than `minimum_tail_patch` produce no patches.
pub fn patches<'a>(text: &'a [char], settings: &PatchSettings) -> Vec<&'a [char]> {
    let step = settings.patch_size.max(1);
    let last_start = text.len().saturating_sub(settings.minimum_tail_patch);
    (0..last_start)
        .step_by(step)
        .map(|offset| &text[offset..(offset + step).min(text.len())])
        .collect()
}

/// Best patch-pair similarity between `source` and `candidate`, in `[0, 1]`.
///
/// A non-empty text too short to be patched is compared whole.
pub fn source_score(source: &str, candidate: &str, settings: &PatchSettings) -> f64 {
    let source: Vec<char> = source.chars().collect();
    let candidate: Vec<char> = candidate.chars().collect();

    let source_patches = patches_or_whole(&source, settings);
    let candidate_patches = patches_or_whole(&candidate, settings);

    let mut best = 0.0_f64;
    for &a in &source_patches {
        for &b in &candidate_patches {
            let ratio = sequence_ratio(a, b);
            if ratio > best {
                best = ratio;
                if best >= 1.0 {
                    return 1.0;
                }
            }
        }
    }
    best
}

fn patches_or_whole<'a>(text: &'a [char], settings: &PatchSettings) -> Vec<&'a [char]> {
    let cut = patches(text, settings);
    if cut.is_empty() {
        vec![text]
    } else {
        cut
    }
}

/// Similarity of two whole texts: `2 * matched / (len_a + len_b)`.
pub fn duplicate_score(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    sequence_ratio(&a, &b)
}

/// Ratcliff/Obershelp ratio. `matched` is the total length of the matching
/// blocks found by taking the longest common run, then recursing on the
/// pieces to its left and right. Two empty sequences are identical (1.0).
pub fn sequence_ratio<T: Eq + std::hash::Hash>(a: &[T], b: &[T]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matched_len(a, b);
    2.0 * matched as f64 / total as f64
}

fn matched_len<T: Eq + std::hash::Hash>(a: &[T], b: &[T]) -> usize {
    let mut b_positions: HashMap<&T, Vec<usize>> = HashMap::new();
    for (j, item) in b.iter().enumerate() {
        b_positions.entry(item).or_default().push(j);
    }

    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let (i, j, k) = longest_match(a, &b_positions, a_lo, a_hi, b_lo, b_hi);
        if k == 0 {
            continue;
        }
        matched += k;
        if a_lo < i && b_lo < j {
            pending.push((a_lo, i, b_lo, j));
        }
        if i + k < a_hi && j + k < b_hi {
            pending.push((i + k, a_hi, j + k, b_hi));
        }
    }
    matched
}

/// Longest run `a[i..i+k] == b[j..j+k]` inside the given windows. Ties go to
/// the earliest `i`, then the earliest `j`.
fn longest_match<T: Eq + std::hash::Hash>(
    a: &[T],
    b_positions: &HashMap<&T, Vec<usize>>,
    a_lo: usize,
    a_hi: usize,
    b_lo: usize,
    b_hi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (a_lo, b_lo, 0);
    // run length of the match ending at b[j], for the previous row of `a`
    let mut run_ending_at: HashMap<usize, usize> = HashMap::new();

    for (i, item) in a.iter().enumerate().take(a_hi).skip(a_lo) {
        let mut next_runs = HashMap::new();
        if let Some(positions) = b_positions.get(item) {
            for &j in positions {
                if j < b_lo {
                    continue;
                }
                if j >= b_hi {
                    break;
                }
                let previous = if j > 0 {
                    run_ending_at.get(&(j - 1)).copied().unwrap_or(0)
                } else {
                    0
                };
                let k = previous + 1;
                next_runs.insert(j, k);
                if k > best_k {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_k = k;
                }
            }
        }
        run_ending_at = next_runs;
    }

    (best_i, best_j, best_k)
}
