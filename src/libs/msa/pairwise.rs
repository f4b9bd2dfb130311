use super::GAP;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairwiseParams {
    pub match_score: i32,
    pub mismatch_score: i32,
    pub gap_score: i32,
}

impl Default for PairwiseParams {
    fn default() -> Self {
        Self {
            match_score: 2,
            mismatch_score: -4,
            gap_score: -4,
        }
    }
}

const DIAG: u8 = 0;
const UP: u8 = 1;
const LEFT: u8 = 2;

/// Needleman-Wunsch global alignment with a linear gap score.
///
/// Scores are kept for two rows only; the traceback matrix holds one byte
/// per cell. Ties prefer a diagonal step, then a gap in `b`, then a gap in
/// `a`.
///
/// ```
/// # use gar::libs::msa::{global_align, PairwiseParams};
/// let (a, b) = global_align(b"ACGTACGT", b"ACGACGT", &PairwiseParams::default());
/// assert_eq!(a, b"ACGTACGT".to_vec());
/// assert_eq!(b, b"ACG-ACGT".to_vec());
/// ```
pub fn global_align(a: &[u8], b: &[u8], params: &PairwiseParams) -> (Vec<u8>, Vec<u8>) {
    let n = a.len();
    let m = b.len();
    let width = m + 1;

    let mut trace = vec![DIAG; (n + 1) * width];
    let mut prev: Vec<i32> = (0..=m as i32).map(|j| j * params.gap_score).collect();
    let mut curr = vec![0i32; width];

    for j in 1..=m {
        trace[j] = LEFT;
    }

    for i in 1..=n {
        curr[0] = i as i32 * params.gap_score;
        trace[i * width] = UP;
        for j in 1..=m {
            let sub = if a[i - 1].eq_ignore_ascii_case(&b[j - 1]) {
                params.match_score
            } else {
                params.mismatch_score
            };
            let diag = prev[j - 1] + sub;
            let up = prev[j] + params.gap_score;
            let left = curr[j - 1] + params.gap_score;

            let (score, dir) = if diag >= up && diag >= left {
                (diag, DIAG)
            } else if up >= left {
                (up, UP)
            } else {
                (left, LEFT)
            };
            curr[j] = score;
            trace[i * width + j] = dir;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let mut row_a = Vec::with_capacity(n + m);
    let mut row_b = Vec::with_capacity(n + m);
    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        match trace[i * width + j] {
            DIAG if i > 0 && j > 0 => {
                row_a.push(a[i - 1]);
                row_b.push(b[j - 1]);
                i -= 1;
                j -= 1;
            }
            UP if i > 0 => {
                row_a.push(a[i - 1]);
                row_b.push(GAP);
                i -= 1;
            }
            _ => {
                row_a.push(GAP);
                row_b.push(b[j - 1]);
                j -= 1;
            }
        }
    }
    row_a.reverse();
    row_b.reverse();

    (row_a, row_b)
}
