//! Set-overlap similarity between equal-length fingerprints.
//!
//! Both metrics are symmetric, bounded to [0, 1] for well-formed inputs,
//! and defined only for fingerprints of identical bit length. The length
//! gate runs before either metric; comparing fingerprints of different
//! lengths is an error, not a degenerate score.

use crate::bitstring::BitString;
use crate::error::{ChemError, Result};

/// Tanimoto coefficient: |a AND b| / |a OR b|.
///
/// Two all-zero fingerprints score 0.0.
pub fn tanimoto(a: &BitString, b: &BitString) -> Result<f64> {
    let (and_count, or_count) = overlap_counts(a, b)?;
    if or_count == 0 {
        return Ok(0.0);
    }
    Ok(f64::from(and_count) / f64::from(or_count))
}

/// Dice coefficient: 2 |a AND b| / (|a| + |b|).
///
/// Two all-zero fingerprints score 0.0.
pub fn dice(a: &BitString, b: &BitString) -> Result<f64> {
    let (and_count, _) = overlap_counts(a, b)?;
    let total = a.weight() + b.weight();
    if total == 0 {
        return Ok(0.0);
    }
    Ok(2.0 * f64::from(and_count) / f64::from(total))
}

/// Word-wise intersection and union popcounts, after the length gate.
fn overlap_counts(a: &BitString, b: &BitString) -> Result<(u32, u32)> {
    if a.len() != b.len() {
        return Err(ChemError::LengthMismatch(a.len(), b.len()));
    }
    let (wa, wb) = (a.words(), b.words());
    if wa.len() != wb.len() {
        // Equal bit lengths imply equal word counts; anything else means the
        // underlying vectors are inconsistent.
        return Err(ChemError::ComputeError(
            "bit vectors disagree on their backing width".to_string(),
        ));
    }
    let mut and_count = 0u32;
    let mut or_count = 0u32;
    for (x, y) in wa.iter().zip(wb.iter()) {
        and_count += (x & y).count_ones();
        or_count += (x | y).count_ones();
    }
    Ok((and_count, or_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bits(nbits: usize, set: &[usize]) -> BitString {
        let mut bs = BitString::new(nbits);
        for &pos in set {
            bs.set(pos);
        }
        bs
    }

    #[test]
    fn known_overlaps() {
        let a = bits(64, &[0, 1, 2, 3]);
        let b = bits(64, &[2, 3, 4, 5]);
        // intersection 2, union 6.
        assert_relative_eq!(tanimoto(&a, &b).unwrap(), 2.0 / 6.0, epsilon = 1e-12);
        // 2 * 2 / (4 + 4).
        assert_relative_eq!(dice(&a, &b).unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn metrics_are_symmetric() {
        let a = bits(128, &[1, 17, 64, 100]);
        let b = bits(128, &[1, 2, 64, 127]);
        assert_eq!(tanimoto(&a, &b).unwrap(), tanimoto(&b, &a).unwrap());
        assert_eq!(dice(&a, &b).unwrap(), dice(&b, &a).unwrap());
    }

    #[test]
    fn self_similarity_is_one() {
        let a = bits(256, &[7, 70, 200]);
        assert_relative_eq!(tanimoto(&a, &a).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(dice(&a, &a).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn scores_stay_in_bounds() {
        let a = bits(64, &[0, 5, 9, 33]);
        let b = bits(64, &[2, 5, 62]);
        for score in [
            tanimoto(&a, &b).unwrap(),
            dice(&a, &b).unwrap(),
        ] {
            assert!((0.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn zero_vectors_score_zero() {
        let a = bits(64, &[]);
        let b = bits(64, &[]);
        assert_eq!(tanimoto(&a, &b).unwrap(), 0.0);
        assert_eq!(dice(&a, &b).unwrap(), 0.0);
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let a = bits(64, &[1]);
        let b = bits(128, &[1]);
        assert!(matches!(
            tanimoto(&a, &b),
            Err(ChemError::LengthMismatch(64, 128))
        ));
        assert!(matches!(
            dice(&b, &a),
            Err(ChemError::LengthMismatch(128, 64))
        ));
    }
}
