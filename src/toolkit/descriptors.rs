//! Scalar physicochemical and topological descriptors.
//!
//! All routines are pure reads over a successfully parsed molecule: atom
//! contribution tables for molecular weight, polar surface area and logP,
//! Lipinski hydrogen-bond counts, and the classic Kier–Hall connectivity
//! (chi) and kappa shape indices computed from the hydrogen-suppressed
//! graph.

use super::{atomic_weight, Molecule};

/// Average molecular weight in Daltons, implicit hydrogens included.
pub fn amw(mol: &Molecule) -> f64 {
    let heavy: f64 = mol.atoms().iter().map(|a| atomic_weight(a.atomic_num)).sum();
    let hydrogens: u32 = (0..mol.atom_count()).map(|i| mol.hydrogen_count(i)).sum();
    heavy + f64::from(hydrogens) * atomic_weight(1)
}

/// Topological polar surface area (Ertl-style N/O contributions), in A^2.
pub fn tpsa(mol: &Molecule) -> f64 {
    let mut area = 0.0;
    for i in 0..mol.atom_count() {
        let atom = &mol.atoms()[i];
        let h = mol.hydrogen_count(i);
        let has_double = mol
            .neighbors(i)
            .iter()
            .any(|&(_, bi)| mol.bonds()[bi].order == super::BondOrder::Double);
        area += match atom.atomic_num {
            8 => {
                if atom.aromatic {
                    13.14
                } else if has_double {
                    17.07
                } else if h >= 1 {
                    20.23
                } else {
                    9.23
                }
            }
            7 => {
                if atom.aromatic {
                    if h >= 1 {
                        15.79
                    } else {
                        12.89
                    }
                } else if h >= 2 {
                    26.02
                } else if h == 1 {
                    12.03
                } else if has_double {
                    12.36
                } else {
                    3.24
                }
            }
            _ => 0.0,
        };
    }
    area
}

/// Lipinski hydrogen-bond donor count: hydrogens on nitrogen or oxygen.
pub fn lipinski_hbd(mol: &Molecule) -> u32 {
    (0..mol.atom_count())
        .filter(|&i| matches!(mol.atoms()[i].atomic_num, 7 | 8))
        .map(|i| mol.hydrogen_count(i))
        .sum()
}

/// Lipinski hydrogen-bond acceptor count: nitrogen and oxygen atoms.
pub fn lipinski_hba(mol: &Molecule) -> u32 {
    mol.atoms()
        .iter()
        .filter(|a| matches!(a.atomic_num, 7 | 8))
        .count() as u32
}

/// Rotatable bonds: acyclic single bonds between two non-terminal atoms.
pub fn num_rotatable_bonds(mol: &Molecule) -> u32 {
    let ring_bonds = mol.ring_bonds();
    mol.bonds()
        .iter()
        .enumerate()
        .filter(|&(bi, bond)| {
            bond.order == super::BondOrder::Single
                && !ring_bonds[bi]
                && mol.degree(bond.a) >= 2
                && mol.degree(bond.b) >= 2
        })
        .count() as u32
}

/// Heteroatom count: heavy atoms other than carbon.
pub fn num_heteroatoms(mol: &Molecule) -> u32 {
    mol.atoms()
        .iter()
        .filter(|a| !a.wildcard && !matches!(a.atomic_num, 1 | 6))
        .count() as u32
}

/// Ring count (smallest-set-equivalent cyclomatic number).
pub fn num_rings(mol: &Molecule) -> u32 {
    mol.ring_count()
}

// ---------------------------------------------------------------------------
// Kier-Hall connectivity and shape indices
// ---------------------------------------------------------------------------

/// Valence electron count used for the chi-v deltas.
fn valence_electrons(atomic_num: u8) -> f64 {
    match atomic_num {
        1 => 1.0,
        5 => 3.0,
        6 => 4.0,
        7 => 5.0,
        8 => 6.0,
        9 => 7.0,
        14 => 4.0,
        15 => 5.0,
        16 => 6.0,
        17 => 7.0,
        35 => 7.0,
        53 => 7.0,
        _ => 4.0,
    }
}

fn delta_simple(mol: &Molecule, i: usize) -> f64 {
    mol.degree(i) as f64
}

fn delta_valence(mol: &Molecule, i: usize) -> f64 {
    valence_electrons(mol.atoms()[i].atomic_num) - f64::from(mol.hydrogen_count(i))
}

fn chi0(mol: &Molecule, delta: fn(&Molecule, usize) -> f64) -> f64 {
    (0..mol.atom_count())
        .map(|i| delta(mol, i))
        .filter(|&d| d > 0.0)
        .map(|d| 1.0 / d.sqrt())
        .sum()
}

fn chi1(mol: &Molecule, delta: fn(&Molecule, usize) -> f64) -> f64 {
    mol.bonds()
        .iter()
        .map(|b| delta(mol, b.a) * delta(mol, b.b))
        .filter(|&p| p > 0.0)
        .map(|p| 1.0 / p.sqrt())
        .sum()
}

fn chi2(mol: &Molecule, delta: fn(&Molecule, usize) -> f64) -> f64 {
    let mut total = 0.0;
    for j in 0..mol.atom_count() {
        let nbrs = mol.neighbors(j);
        for x in 0..nbrs.len() {
            for y in x + 1..nbrs.len() {
                let (i, _) = nbrs[x];
                let (k, _) = nbrs[y];
                let p = delta(mol, i) * delta(mol, j) * delta(mol, k);
                if p > 0.0 {
                    total += 1.0 / p.sqrt();
                }
            }
        }
    }
    total
}

/// Zero-order valence connectivity index.
pub fn chi0v(mol: &Molecule) -> f64 {
    chi0(mol, delta_valence)
}

/// First-order valence connectivity index.
pub fn chi1v(mol: &Molecule) -> f64 {
    chi1(mol, delta_valence)
}

/// Second-order valence connectivity index.
pub fn chi2v(mol: &Molecule) -> f64 {
    chi2(mol, delta_valence)
}

/// Zero-order simple connectivity index.
pub fn chi0n(mol: &Molecule) -> f64 {
    chi0(mol, delta_simple)
}

/// First-order simple connectivity index (the Randic index).
pub fn chi1n(mol: &Molecule) -> f64 {
    chi1(mol, delta_simple)
}

/// Second-order simple connectivity index.
pub fn chi2n(mol: &Molecule) -> f64 {
    chi2(mol, delta_simple)
}

/// Number of simple paths spanning `nbonds` bonds, each counted once.
fn count_paths(mol: &Molecule, nbonds: usize) -> u64 {
    fn extend(mol: &Molecule, path: &mut Vec<usize>, remaining: usize, count: &mut u64) {
        if remaining == 0 {
            // Count each undirected path once.
            if path[0] < path[path.len() - 1] {
                *count += 1;
            }
            return;
        }
        let last = path[path.len() - 1];
        for &(v, _) in mol.neighbors(last) {
            if path.contains(&v) {
                continue;
            }
            path.push(v);
            extend(mol, path, remaining - 1, count);
            path.pop();
        }
    }

    let mut count = 0u64;
    for start in 0..mol.atom_count() {
        let mut path = vec![start];
        extend(mol, &mut path, nbonds, &mut count);
    }
    count
}

/// First-order kappa shape index.
pub fn kappa1(mol: &Molecule) -> f64 {
    let a = mol.atom_count() as f64;
    let p1 = mol.bond_count() as f64;
    if p1 <= 0.0 {
        return 0.0;
    }
    a * (a - 1.0) * (a - 1.0) / (p1 * p1)
}

/// Second-order kappa shape index.
pub fn kappa2(mol: &Molecule) -> f64 {
    let a = mol.atom_count() as f64;
    let p2 = count_paths(mol, 2) as f64;
    if p2 <= 0.0 {
        return 0.0;
    }
    (a - 1.0) * (a - 2.0) * (a - 2.0) / (p2 * p2)
}

/// Third-order kappa shape index.
pub fn kappa3(mol: &Molecule) -> f64 {
    let a = mol.atom_count() as f64;
    let p3 = count_paths(mol, 3) as f64;
    if p3 <= 0.0 {
        return 0.0;
    }
    if mol.atom_count() % 2 == 0 {
        (a - 3.0) * (a - 2.0) * (a - 2.0) / (p3 * p3)
    } else {
        (a - 1.0) * (a - 3.0) * (a - 3.0) / (p3 * p3)
    }
}

// ---------------------------------------------------------------------------
// logP
// ---------------------------------------------------------------------------

/// Crippen-style atom-contribution logP.
///
/// Atom classes are a condensed version of the published contribution table;
/// hydrogens contribute by the element they sit on.
pub fn logp(mol: &Molecule) -> f64 {
    let mut total = 0.0;
    for i in 0..mol.atom_count() {
        let atom = &mol.atoms()[i];
        let h = f64::from(mol.hydrogen_count(i));
        if atom.wildcard {
            continue;
        }
        let has_double = mol
            .neighbors(i)
            .iter()
            .any(|&(_, bi)| mol.bonds()[bi].order == super::BondOrder::Double);
        let (atom_part, h_part) = match atom.atomic_num {
            6 => {
                if atom.aromatic {
                    (0.1581, 0.1230)
                } else {
                    (0.1441, 0.1230)
                }
            }
            7 => {
                if atom.aromatic {
                    (-0.3239, 0.2142)
                } else {
                    (-1.0190, 0.2142)
                }
            }
            8 => {
                if atom.aromatic {
                    (0.1552, -0.2677)
                } else if has_double {
                    (-0.1526, -0.2677)
                } else {
                    (-0.2893, -0.2677)
                }
            }
            9 => (0.4202, 0.0),
            15 => (0.8612, 0.1125),
            16 => (0.6482, 0.1125),
            17 => (0.6895, 0.0),
            35 => (0.8456, 0.0),
            53 => (0.8857, 0.0),
            _ => (0.0, 0.1125),
        };
        total += atom_part + h * h_part;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::super::smiles::parse;
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ethanol_molecular_weight() {
        let mol = parse("CCO", false).unwrap();
        // C2H6O with average atomic weights.
        assert_relative_eq!(amw(&mol), 46.069, epsilon = 1e-3);
    }

    #[test]
    fn benzene_molecular_weight() {
        let mol = parse("c1ccccc1", false).unwrap();
        assert_relative_eq!(amw(&mol), 78.114, epsilon = 1e-3);
    }

    #[test]
    fn tpsa_matches_published_contributions() {
        // Ethanol: one hydroxyl oxygen.
        let ethanol = parse("CCO", false).unwrap();
        assert_relative_eq!(tpsa(&ethanol), 20.23, epsilon = 1e-6);
        // Aspirin: two carbonyls, one ester oxygen, one hydroxyl.
        let aspirin = parse("CC(=O)Oc1ccccc1C(=O)O", false).unwrap();
        assert_relative_eq!(tpsa(&aspirin), 63.60, epsilon = 1e-6);
        // Hexane has no polar atoms at all.
        let hexane = parse("CCCCCC", false).unwrap();
        assert_relative_eq!(tpsa(&hexane), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn lipinski_counts() {
        let ethanol = parse("CCO", false).unwrap();
        assert_eq!(lipinski_hbd(&ethanol), 1);
        assert_eq!(lipinski_hba(&ethanol), 1);

        let aspirin = parse("CC(=O)Oc1ccccc1C(=O)O", false).unwrap();
        assert_eq!(lipinski_hbd(&aspirin), 1);
        assert_eq!(lipinski_hba(&aspirin), 4);
    }

    #[test]
    fn rotatable_and_heteroatom_counts() {
        let ethanol = parse("CCO", false).unwrap();
        assert_eq!(num_rotatable_bonds(&ethanol), 1);
        assert_eq!(num_heteroatoms(&ethanol), 1);

        let aspirin = parse("CC(=O)Oc1ccccc1C(=O)O", false).unwrap();
        assert_eq!(num_rotatable_bonds(&aspirin), 3);
        assert_eq!(num_heteroatoms(&aspirin), 4);
        assert_eq!(num_rings(&aspirin), 1);

        let benzene = parse("c1ccccc1", false).unwrap();
        assert_eq!(num_rotatable_bonds(&benzene), 0);
    }

    #[test]
    fn connectivity_indices_ethanol() {
        let mol = parse("CCO", false).unwrap();
        // Simple deltas: 1, 2, 1.
        assert_relative_eq!(chi0n(&mol), 2.0 + 1.0 / 2.0f64.sqrt(), epsilon = 1e-9);
        assert_relative_eq!(chi1n(&mol), 2.0 / 2.0f64.sqrt(), epsilon = 1e-9);
        // Valence deltas: 1, 2, 5.
        assert_relative_eq!(
            chi0v(&mol),
            1.0 + 1.0 / 2.0f64.sqrt() + 1.0 / 5.0f64.sqrt(),
            epsilon = 1e-9
        );
        // One two-bond path: C-C-O.
        assert_relative_eq!(chi2n(&mol), 1.0 / 2.0f64.sqrt(), epsilon = 1e-9);
        assert_relative_eq!(chi2v(&mol), 1.0 / 10.0f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn kappa_indices_small_molecules() {
        let ethanol = parse("CCO", false).unwrap();
        assert_relative_eq!(kappa1(&ethanol), 3.0, epsilon = 1e-9);
        assert_relative_eq!(kappa2(&ethanol), 2.0, epsilon = 1e-9);
        assert_relative_eq!(kappa3(&ethanol), 0.0, epsilon = 1e-12);

        // n-Butane: A=4, P1=3, P2=2, P3=1.
        let butane = parse("CCCC", false).unwrap();
        assert_relative_eq!(kappa1(&butane), 4.0 * 9.0 / 9.0, epsilon = 1e-9);
        assert_relative_eq!(kappa2(&butane), 3.0 * 4.0 / 4.0, epsilon = 1e-9);
        assert_relative_eq!(kappa3(&butane), 1.0 * 4.0 / 1.0, epsilon = 1e-9);
    }

    #[test]
    fn logp_benzene_matches_contribution_sum() {
        let benzene = parse("c1ccccc1", false).unwrap();
        assert_relative_eq!(logp(&benzene), 6.0 * (0.1581 + 0.1230), epsilon = 1e-9);
        // More carbons, more grease: hexane should beat ethanol.
        let hexane = parse("CCCCCC", false).unwrap();
        let ethanol = parse("CCO", false).unwrap();
        assert!(logp(&hexane) > logp(&ethanol));
    }
}
