//! Fingerprint generation behind a single algorithm-selector pipeline.
//!
//! One generic entry point replaces a per-algorithm function family: the
//! selector names the algorithm (and carries the radius for the circular
//! family), and [`generate`] runs the toolkit generator it selects. Toolkit
//! failures surface as `GenerationError`, never anything else.

use crate::bitstring::BitString;
use crate::error::{ChemError, Result};
use crate::toolkit::{fingerprints, Molecule};

/// Selects a fingerprint generation algorithm.
///
/// The circular (Morgan) variants carry the raw radius received from the
/// host. Out-of-range values are intentionally not pre-validated here; the
/// toolkit's own rejection surfaces as `GenerationError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerprintKind {
    /// Layered path fingerprint (1024 bits).
    Layered,
    /// Toolkit-native path-enumeration fingerprint (2048 bits).
    Path,
    /// Hashed atom-pair fingerprint (2048 bits).
    AtomPairs,
    /// Topological-torsion fingerprint (2048 bits).
    TopologicalTorsion,
    /// MACCS-style keyed fingerprint (166 bits).
    Maccs,
    /// Circular fingerprint with connectivity invariants (1024 bits).
    Morgan {
        /// Neighborhood radius, passed through to the toolkit.
        radius: i64,
    },
    /// Circular fingerprint with pharmacophoric invariants (1024 bits).
    FeatureMorgan {
        /// Neighborhood radius, passed through to the toolkit.
        radius: i64,
    },
    /// Substructure-screening signature (2048 bits).
    Signature,
}

/// Generate the selected fingerprint for a molecule.
pub fn generate(mol: &Molecule, kind: FingerprintKind) -> Result<BitString> {
    let result = match kind {
        FingerprintKind::Layered => Ok(fingerprints::layered(mol)),
        FingerprintKind::Path => Ok(fingerprints::path_based(mol)),
        FingerprintKind::AtomPairs => Ok(fingerprints::atom_pairs(mol)),
        FingerprintKind::TopologicalTorsion => Ok(fingerprints::topological_torsion(mol)),
        FingerprintKind::Maccs => Ok(fingerprints::maccs(mol)),
        FingerprintKind::Morgan { radius } => fingerprints::morgan(mol, radius),
        FingerprintKind::FeatureMorgan { radius } => fingerprints::feature_morgan(mol, radius),
        FingerprintKind::Signature => Ok(fingerprints::signature(mol)),
    };
    result.map_err(|e| ChemError::GenerationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mol;

    #[test]
    fn every_kind_generates_its_width() {
        let m = mol::parse("CC(=O)Oc1ccccc1C(=O)O", false).unwrap();
        let cases = [
            (FingerprintKind::Layered, fingerprints::LAYERED_FP_SIZE),
            (FingerprintKind::Path, fingerprints::PATH_FP_SIZE),
            (FingerprintKind::AtomPairs, fingerprints::HASHED_PAIR_FP_SIZE),
            (
                FingerprintKind::TopologicalTorsion,
                fingerprints::TORSION_FP_SIZE,
            ),
            (FingerprintKind::Maccs, fingerprints::MACCS_FP_SIZE),
            (FingerprintKind::Morgan { radius: 2 }, fingerprints::MORGAN_FP_SIZE),
            (
                FingerprintKind::FeatureMorgan { radius: 2 },
                fingerprints::MORGAN_FP_SIZE,
            ),
            (FingerprintKind::Signature, fingerprints::SIGNATURE_FP_SIZE),
        ];
        for (kind, width) in cases {
            let fp = generate(&m, kind).unwrap();
            assert_eq!(fp.len(), width, "kind {:?}", kind);
            assert!(fp.weight() > 0, "kind {:?}", kind);
        }
    }

    #[test]
    fn bad_radius_surfaces_as_generation_error() {
        let m = mol::parse("CCO", false).unwrap();
        let err = generate(&m, FingerprintKind::Morgan { radius: -3 }).unwrap_err();
        assert!(matches!(err, ChemError::GenerationError(_)));
        let err = generate(&m, FingerprintKind::FeatureMorgan { radius: 99 }).unwrap_err();
        assert!(matches!(err, ChemError::GenerationError(_)));
    }
}
