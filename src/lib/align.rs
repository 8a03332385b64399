//! Local alignment of a marker sequence against a read.
//!
//! The splitter only needs four numbers from the aligner: the inclusive span of the
//! best local match on the read, its score, and the best score found away from that
//! match. The last one is what makes the confidence filter work: a marker that matches
//! two places equally well is ambiguous, and a marker that is absent tends to produce a
//! best and second-best score of similar size.
//!
//! [`SmithWaterman`] follows the conventions of the Striped Smith-Waterman library
//! used by PacBio tooling:
//!
//! - penalties are given as positive magnitudes; a gap of length `k` costs
//!   `gap_open + (k - 1) * gap_extend`
//! - bases are compared case-insensitively and anything other than `ACGT` scores zero
//! - the second-best score is the highest column maximum outside a window of
//!   `max(marker_len / 2, 15)` reference positions around the end of the best match

use serde::{Deserialize, Serialize};

/// Code used for any base other than A, C, G or T.
const AMBIGUOUS_CODE: u8 = 4;

/// Number of distinct base codes (A, C, G, T, other).
const ALPHABET_SIZE: usize = 5;

/// Smallest window masked around the best match when looking for the second-best score.
const MIN_MASK_LEN: usize = 15;

/// Score used for impossible gap states; far enough from `i32::MIN` to subtract from.
const NEG_INF: i32 = i32::MIN / 2;

/// Maps ASCII bases to 0..=4 (A, C, G, T, other), ignoring case.
const BASE_CODES: [u8; 256] = {
    let mut codes = [AMBIGUOUS_CODE; 256];
    codes[b'A' as usize] = 0;
    codes[b'a' as usize] = 0;
    codes[b'C' as usize] = 1;
    codes[b'c' as usize] = 1;
    codes[b'G' as usize] = 2;
    codes[b'g' as usize] = 2;
    codes[b'T' as usize] = 3;
    codes[b't' as usize] = 3;
    codes
};

/// Largest match score or penalty accepted on the command line.
pub const MAX_SCORING_VALUE: i32 = 1000;

/// Scoring scheme for local alignment. All values are positive magnitudes.
///
/// Scores saturate at the `i32` bounds instead of overflowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoring {
    /// Score added for a matching base.
    pub match_score: i32,
    /// Penalty subtracted for a mismatching base.
    pub mismatch_penalty: i32,
    /// Penalty for the first base of a gap.
    pub gap_open_penalty: i32,
    /// Penalty for each additional base of a gap.
    pub gap_extend_penalty: i32,
}

impl Default for Scoring {
    fn default() -> Self {
        Self { match_score: 2, mismatch_penalty: 2, gap_open_penalty: 3, gap_extend_penalty: 1 }
    }
}

/// The best local match of a query within a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Alignment {
    /// 0-based position of the first reference base in the match.
    pub ref_begin: usize,
    /// 0-based position of the last reference base in the match (inclusive).
    pub ref_end: usize,
    /// Score of the best match.
    pub score: i32,
    /// Best score found outside the masked window around `ref_end`.
    pub second_best_score: i32,
}

impl Alignment {
    /// Difference between the best and second-best scores.
    #[must_use]
    pub fn margin(&self) -> i32 {
        self.score - self.second_best_score
    }
}

/// A local alignment engine.
///
/// Implementations may keep scratch state between calls, so each worker thread owns
/// its own instance.
pub trait LocalAligner {
    /// Aligns `query` locally against `reference`.
    ///
    /// Returns `None` if no positively scoring match exists.
    fn align(&mut self, query: &[u8], reference: &[u8]) -> Option<Alignment>;
}

/// Scalar affine-gap Smith-Waterman aligner.
///
/// Reuses its dynamic-programming rows and encoding buffers across calls.
#[derive(Debug, Clone)]
pub struct SmithWaterman {
    matrix: [i32; ALPHABET_SIZE * ALPHABET_SIZE],
    gap_open: i32,
    gap_extend: i32,
    query_codes: Vec<u8>,
    reference_codes: Vec<u8>,
    h: Vec<i32>,
    h_begin: Vec<usize>,
    e: Vec<i32>,
    e_begin: Vec<usize>,
    column_max: Vec<i32>,
}

impl SmithWaterman {
    /// Creates an aligner for the given scoring scheme.
    #[must_use]
    pub fn new(scoring: Scoring) -> Self {
        let mut matrix = [0; ALPHABET_SIZE * ALPHABET_SIZE];
        for a in 0..ALPHABET_SIZE - 1 {
            for b in 0..ALPHABET_SIZE - 1 {
                matrix[a * ALPHABET_SIZE + b] = if a == b {
                    scoring.match_score
                } else {
                    scoring.mismatch_penalty.saturating_neg()
                };
            }
        }

        Self {
            matrix,
            gap_open: scoring.gap_open_penalty,
            gap_extend: scoring.gap_extend_penalty,
            query_codes: Vec::new(),
            reference_codes: Vec::new(),
            h: Vec::new(),
            h_begin: Vec::new(),
            e: Vec::new(),
            e_begin: Vec::new(),
            column_max: Vec::new(),
        }
    }

    #[inline]
    fn substitution(&self, query_code: u8, reference_code: u8) -> i32 {
        self.matrix[usize::from(query_code) * ALPHABET_SIZE + usize::from(reference_code)]
    }

    /// Best column maximum outside `(ref_end - mask_len, ref_end + mask_len]`.
    fn second_best(&self, ref_end: usize, mask_len: usize) -> i32 {
        let len = self.column_max.len();
        let lower = ref_end.saturating_sub(mask_len);
        let upper = (ref_end + mask_len).min(len);

        let before = self.column_max[..lower].iter().copied().max().unwrap_or(0);
        let after =
            self.column_max.get(upper + 1..).and_then(|c| c.iter().copied().max()).unwrap_or(0);
        before.max(after)
    }
}

impl LocalAligner for SmithWaterman {
    fn align(&mut self, query: &[u8], reference: &[u8]) -> Option<Alignment> {
        if query.is_empty() || reference.is_empty() {
            return None;
        }

        self.query_codes.clear();
        self.query_codes.extend(query.iter().map(|&b| BASE_CODES[usize::from(b)]));
        self.reference_codes.clear();
        self.reference_codes.extend(reference.iter().map(|&b| BASE_CODES[usize::from(b)]));

        let rows = query.len();
        self.h.clear();
        self.h.resize(rows + 1, 0);
        self.h_begin.clear();
        self.h_begin.resize(rows + 1, 0);
        self.e.clear();
        self.e.resize(rows + 1, NEG_INF);
        self.e_begin.clear();
        self.e_begin.resize(rows + 1, 0);
        self.column_max.clear();
        self.column_max.resize(reference.len(), 0);

        let mut best = Alignment::default();

        // Columns walk the reference; `h`/`e` hold the previous column until overwritten.
        for j in 0..reference.len() {
            let reference_code = self.reference_codes[j];

            let mut diag: i32 = 0;
            let mut diag_begin = j;
            let mut up: i32 = 0;
            let mut up_begin = j;
            let mut f = NEG_INF;
            let mut f_begin = j;
            let mut column_best = 0;
            let mut column_best_begin = j;

            for i in 1..=rows {
                // Gap in the query: extends along the reference from the previous column.
                let e_open = self.h[i].saturating_sub(self.gap_open);
                let e_extend = self.e[i].saturating_sub(self.gap_extend);
                if e_open >= e_extend {
                    self.e[i] = e_open;
                    self.e_begin[i] = self.h_begin[i];
                } else {
                    self.e[i] = e_extend;
                }

                // Gap in the reference: extends down the current column.
                let f_open = up.saturating_sub(self.gap_open);
                let f_extend = f.saturating_sub(self.gap_extend);
                if f_open >= f_extend {
                    f = f_open;
                    f_begin = up_begin;
                } else {
                    f = f_extend;
                }

                let mut h =
                    diag.saturating_add(self.substitution(self.query_codes[i - 1], reference_code));
                let mut begin = if diag == 0 { j } else { diag_begin };
                if self.e[i] > h {
                    h = self.e[i];
                    begin = self.e_begin[i];
                }
                if f > h {
                    h = f;
                    begin = f_begin;
                }
                if h <= 0 {
                    h = 0;
                    begin = j;
                }

                diag = self.h[i];
                diag_begin = self.h_begin[i];
                self.h[i] = h;
                self.h_begin[i] = begin;
                up = h;
                up_begin = begin;

                if h > column_best {
                    column_best = h;
                    column_best_begin = begin;
                }
            }

            self.column_max[j] = column_best;
            if column_best > best.score {
                best.score = column_best;
                best.ref_begin = column_best_begin;
                best.ref_end = j;
            }
        }

        if best.score == 0 {
            return None;
        }

        let mask_len = (query.len() / 2).max(MIN_MASK_LEN);
        best.second_best_score = self.second_best(best.ref_end, mask_len);
        Some(best)
    }
}
