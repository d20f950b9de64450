//! Structure comparison and the scalar descriptor façade.
//!
//! The comparator provides the ordering used by hosts for sorting and
//! equality. The descriptor functions are direct, side-effect-free reads
//! over a successfully parsed molecule; they cannot fail.

use std::cmp::Ordering;

use crate::toolkit::{descriptors, substruct, Molecule};

/// True when `needle` occurs as a substructure of `haystack`.
pub fn is_substructure(needle: &Molecule, haystack: &Molecule) -> bool {
    substruct::matches(haystack, needle)
}

/// True when `a` contains `b`; the mirror of [`is_substructure`].
pub fn is_superstructure(a: &Molecule, b: &Molecule) -> bool {
    is_substructure(b, a)
}

/// Order two structures for sorting and equality.
///
/// Priority chain, each step short-circuiting on the first difference:
/// atom count, bond count, rounded molecular weight difference, ring count,
/// then containment (`a` contains `b` reads as equal).
///
/// The containment step is NOT a true total order: when every count ties and
/// neither structure contains the other, both argument orders return `Less`.
/// Persisted sort orders depend on this behavior, so it is kept as-is.
pub fn compare(a: &Molecule, b: &Molecule) -> Ordering {
    let diff = a.atom_count() as i64 - b.atom_count() as i64;
    if diff != 0 {
        return diff.cmp(&0);
    }

    let diff = a.bond_count() as i64 - b.bond_count() as i64;
    if diff != 0 {
        return diff.cmp(&0);
    }

    // Truncating cast after the +0.5 shift, matching the host convention
    // for integer-rounded weight differences.
    let diff = (descriptors::amw(a) - descriptors::amw(b) + 0.5) as i64;
    if diff != 0 {
        return diff.cmp(&0);
    }

    let diff = i64::from(a.ring_count()) - i64::from(b.ring_count());
    if diff != 0 {
        return diff.cmp(&0);
    }

    if is_superstructure(a, b) {
        Ordering::Equal
    } else {
        Ordering::Less
    }
}

// ---------------------------------------------------------------------------
// Descriptor read-throughs
// ---------------------------------------------------------------------------

/// Molecular weight in Daltons.
pub fn mw(mol: &Molecule) -> f64 {
    descriptors::amw(mol)
}

/// Topological polar surface area.
pub fn tpsa(mol: &Molecule) -> f64 {
    descriptors::tpsa(mol)
}

/// Crippen-style logP estimate.
pub fn logp(mol: &Molecule) -> f64 {
    descriptors::logp(mol)
}

/// Lipinski hydrogen-bond acceptor count.
pub fn hba(mol: &Molecule) -> i64 {
    i64::from(descriptors::lipinski_hba(mol))
}

/// Lipinski hydrogen-bond donor count.
pub fn hbd(mol: &Molecule) -> i64 {
    i64::from(descriptors::lipinski_hbd(mol))
}

/// Rotatable bond count.
pub fn num_rotatable_bonds(mol: &Molecule) -> i64 {
    i64::from(descriptors::num_rotatable_bonds(mol))
}

/// Heteroatom count.
pub fn num_heteroatoms(mol: &Molecule) -> i64 {
    i64::from(descriptors::num_heteroatoms(mol))
}

/// Ring count.
pub fn num_rings(mol: &Molecule) -> i64 {
    i64::from(descriptors::num_rings(mol))
}

/// Total atom count, hydrogens included.
pub fn num_atoms(mol: &Molecule) -> i64 {
    mol.total_atom_count() as i64
}

/// Heavy-atom count.
pub fn num_heavy_atoms(mol: &Molecule) -> i64 {
    mol.atom_count() as i64
}

/// Zero-order valence connectivity index.
pub fn chi0v(mol: &Molecule) -> f64 {
    descriptors::chi0v(mol)
}

/// First-order valence connectivity index.
pub fn chi1v(mol: &Molecule) -> f64 {
    descriptors::chi1v(mol)
}

/// Second-order valence connectivity index.
pub fn chi2v(mol: &Molecule) -> f64 {
    descriptors::chi2v(mol)
}

/// Zero-order simple connectivity index.
pub fn chi0n(mol: &Molecule) -> f64 {
    descriptors::chi0n(mol)
}

/// First-order simple connectivity index.
pub fn chi1n(mol: &Molecule) -> f64 {
    descriptors::chi1n(mol)
}

/// Second-order simple connectivity index.
pub fn chi2n(mol: &Molecule) -> f64 {
    descriptors::chi2n(mol)
}

/// First-order kappa shape index.
pub fn kappa1(mol: &Molecule) -> f64 {
    descriptors::kappa1(mol)
}

/// Second-order kappa shape index.
pub fn kappa2(mol: &Molecule) -> f64 {
    descriptors::kappa2(mol)
}

/// Third-order kappa shape index.
pub fn kappa3(mol: &Molecule) -> f64 {
    descriptors::kappa3(mol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mol;

    #[test]
    fn substructure_mirror_equality() {
        let aspirin = mol::parse("CC(=O)Oc1ccccc1C(=O)O", false).unwrap();
        let benzene = mol::parse("c1ccccc1", false).unwrap();
        assert!(is_substructure(&benzene, &aspirin));
        assert!(is_superstructure(&aspirin, &benzene));
        assert_eq!(
            is_substructure(&benzene, &aspirin),
            is_superstructure(&aspirin, &benzene)
        );
        assert!(!is_substructure(&aspirin, &benzene));
    }

    #[test]
    fn atom_count_decides_first() {
        let small = mol::parse("CCO", false).unwrap();
        let large = mol::parse("CCCCO", false).unwrap();
        assert_eq!(compare(&small, &large), Ordering::Less);
        assert_eq!(compare(&large, &small), Ordering::Greater);
    }

    #[test]
    fn equal_structures_compare_equal() {
        let a = mol::parse("CC(=O)Oc1ccccc1C(=O)O", false).unwrap();
        let b = mol::parse("CC(=O)Oc1ccccc1C(=O)O", false).unwrap();
        assert_eq!(compare(&a, &b), Ordering::Equal);
    }

    #[test]
    fn pickle_round_trip_compares_equal() {
        for input in ["CCO", "c1ccccc1", "CC(=O)Oc1ccccc1C(=O)O", "C1CC1CC#N"] {
            let m = mol::parse(input, false).unwrap();
            let back = mol::decode(&mol::encode(&m).unwrap()).unwrap();
            assert_eq!(compare(&m, &back), Ordering::Equal, "input {}", input);
        }
    }

    #[test]
    fn containment_step_is_asymmetric_by_design() {
        // n-Butane and isobutane: same formula, same atom, bond and ring
        // counts, neither contains the other. Both orders answer Less.
        let butane = mol::parse("CCCC", false).unwrap();
        let isobutane = mol::parse("CC(C)C", false).unwrap();
        assert_eq!(compare(&butane, &isobutane), Ordering::Less);
        assert_eq!(compare(&isobutane, &butane), Ordering::Less);
    }

    #[test]
    fn weight_difference_uses_truncating_round() {
        // Propane vs ethylamine: C3H8 (44.097) vs C2H7N (45.085). Atom and
        // bond counts tie. One way the shifted difference truncates to 0 and
        // the decision falls through to containment; the other way it
        // truncates to 1 and decides immediately.
        let propane = mol::parse("CCC", false).unwrap();
        let ethylamine = mol::parse("CCN", false).unwrap();
        assert_eq!(compare(&propane, &ethylamine), Ordering::Less);
        assert_eq!(compare(&ethylamine, &propane), Ordering::Greater);
    }

    #[test]
    fn descriptor_facade_reads_through() {
        let ethanol = mol::parse("CCO", false).unwrap();
        assert_eq!(hba(&ethanol), 1);
        assert_eq!(hbd(&ethanol), 1);
        assert_eq!(num_atoms(&ethanol), 9);
        assert_eq!(num_heavy_atoms(&ethanol), 3);
        assert_eq!(num_rings(&ethanol), 0);
        assert!(mw(&ethanol) > 46.0 && mw(&ethanol) < 46.2);
    }
}
