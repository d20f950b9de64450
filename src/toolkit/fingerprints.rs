//! Fingerprint generation algorithms.
//!
//! Every generator is a pure function of the molecular graph and produces a
//! [`BitString`] of an algorithm-fixed width. Bit positions come from FNV-1a
//! hashes folded onto the width, so fingerprints are stable across processes
//! and releases — a requirement for values persisted in a database.

use crate::bitstring::BitString;

use super::{BondOrder, Molecule, ToolkitError};

/// Width of the layered (path-layer) fingerprint.
pub const LAYERED_FP_SIZE: usize = 1024;
/// Width of the native path-enumeration fingerprint.
pub const PATH_FP_SIZE: usize = 2048;
/// Width of the hashed atom-pair fingerprint.
pub const HASHED_PAIR_FP_SIZE: usize = 2048;
/// Width of the topological-torsion fingerprint.
pub const TORSION_FP_SIZE: usize = 2048;
/// Width of the MACCS-style keyed fingerprint.
pub const MACCS_FP_SIZE: usize = 166;
/// Width of the circular (Morgan) fingerprint family.
pub const MORGAN_FP_SIZE: usize = 1024;
/// Signature width, in bytes, of the substructure-screening fingerprint.
pub const SIGNATURE_BYTES: usize = 256;
/// Bit width of the substructure-screening fingerprint.
pub const SIGNATURE_FP_SIZE: usize = 8 * SIGNATURE_BYTES;
/// Largest accepted circular-fingerprint radius.
pub const MAX_MORGAN_RADIUS: i64 = 8;

/// Maximum topological distance recorded by the atom-pair fingerprint.
const MAX_PAIR_DISTANCE: u32 = 30;

// ---------------------------------------------------------------------------
// FNV-1a hashing
// ---------------------------------------------------------------------------

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(values: &[u64]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &value in values {
        for byte in value.to_le_bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }
    hash
}

fn fold(hash: u64, nbits: usize) -> usize {
    (hash % nbits as u64) as usize
}

/// Stable per-atom code: element, degree, aromaticity.
fn atom_code(mol: &Molecule, i: usize) -> u64 {
    let atom = &mol.atoms()[i];
    fnv1a(&[
        u64::from(atom.atomic_num),
        mol.degree(i) as u64,
        u64::from(atom.aromatic),
    ])
}

// ---------------------------------------------------------------------------
// Path enumeration
// ---------------------------------------------------------------------------

/// Visit every simple bond path of 1..=`max_bonds` bonds. Paths are visited
/// in both directions; hashes taken as min(forward, reverse) make the two
/// visits indistinguishable.
fn for_each_path<F: FnMut(&[usize], &[usize])>(mol: &Molecule, max_bonds: usize, f: &mut F) {
    fn extend<F: FnMut(&[usize], &[usize])>(
        mol: &Molecule,
        atoms: &mut Vec<usize>,
        bonds: &mut Vec<usize>,
        max_bonds: usize,
        f: &mut F,
    ) {
        let last = atoms[atoms.len() - 1];
        for &(v, bi) in mol.neighbors(last) {
            if atoms.contains(&v) {
                continue;
            }
            atoms.push(v);
            bonds.push(bi);
            f(atoms.as_slice(), bonds.as_slice());
            if bonds.len() < max_bonds {
                extend(mol, atoms, bonds, max_bonds, f);
            }
            atoms.pop();
            bonds.pop();
        }
    }

    for start in 0..mol.atom_count() {
        let mut atoms = vec![start];
        let mut bonds = Vec::new();
        extend(mol, &mut atoms, &mut bonds, max_bonds, f);
    }
}

/// Direction-independent hash of a path under the given atom encoder.
fn path_hash(
    mol: &Molecule,
    atoms: &[usize],
    bonds: &[usize],
    encode_atom: impl Fn(&Molecule, usize) -> u64,
) -> u64 {
    let mut forward: Vec<u64> = Vec::with_capacity(atoms.len() * 2);
    for (pos, &a) in atoms.iter().enumerate() {
        forward.push(encode_atom(mol, a));
        if pos < bonds.len() {
            forward.push(u64::from(mol.bonds()[bonds[pos]].order.tag()));
        }
    }
    let mut reverse: Vec<u64> = Vec::with_capacity(forward.len());
    for (pos, &a) in atoms.iter().enumerate().rev() {
        reverse.push(encode_atom(mol, a));
        if pos > 0 {
            reverse.push(u64::from(mol.bonds()[bonds[pos - 1]].order.tag()));
        }
    }
    fnv1a(&forward).min(fnv1a(&reverse))
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Layered path fingerprint: each path sets one bit per abstraction layer
/// (bond orders only; elements and orders; elements, aromaticity and orders).
pub fn layered(mol: &Molecule) -> BitString {
    let mut fp = BitString::new(LAYERED_FP_SIZE);
    for_each_path(mol, 6, &mut |atoms, bonds| {
        let orders_only = path_hash(mol, atoms, bonds, |_, _| 1);
        let elements = path_hash(mol, atoms, bonds, |m, i| u64::from(m.atoms()[i].atomic_num));
        let full = path_hash(mol, atoms, bonds, |m, i| {
            fnv1a(&[
                u64::from(m.atoms()[i].atomic_num),
                u64::from(m.atoms()[i].aromatic),
            ])
        });
        fp.set(fold(fnv1a(&[1, orders_only]), LAYERED_FP_SIZE));
        fp.set(fold(fnv1a(&[2, elements]), LAYERED_FP_SIZE));
        fp.set(fold(fnv1a(&[3, full]), LAYERED_FP_SIZE));
    });
    fp
}

/// Native path-enumeration fingerprint, two bits per hashed path.
pub fn path_based(mol: &Molecule) -> BitString {
    let mut fp = BitString::new(PATH_FP_SIZE);
    for_each_path(mol, 7, &mut |atoms, bonds| {
        let h = path_hash(mol, atoms, bonds, atom_code);
        fp.set(fold(h, PATH_FP_SIZE));
        fp.set(fold(h.rotate_left(32).wrapping_mul(FNV_PRIME), PATH_FP_SIZE));
    });
    fp
}

/// Hashed atom-pair fingerprint over topological distances.
pub fn atom_pairs(mol: &Molecule) -> BitString {
    let mut fp = BitString::new(HASHED_PAIR_FP_SIZE);
    let dist = mol.distance_matrix();
    for i in 0..mol.atom_count() {
        for j in i + 1..mol.atom_count() {
            let d = dist[i][j];
            if d == 0 || d > MAX_PAIR_DISTANCE {
                continue;
            }
            let (lo, hi) = {
                let ci = atom_code(mol, i);
                let cj = atom_code(mol, j);
                (ci.min(cj), ci.max(cj))
            };
            fp.set(fold(fnv1a(&[lo, u64::from(d), hi]), HASHED_PAIR_FP_SIZE));
        }
    }
    fp
}

/// Topological-torsion fingerprint: hashed linear four-atom fragments.
pub fn topological_torsion(mol: &Molecule) -> BitString {
    let mut fp = BitString::new(TORSION_FP_SIZE);
    for_each_path(mol, 3, &mut |atoms, bonds| {
        if bonds.len() != 3 {
            return;
        }
        fp.set(fold(path_hash(mol, atoms, bonds, atom_code), TORSION_FP_SIZE));
    });
    fp
}

/// MACCS-style keyed fingerprint (condensed subset of the public key set).
pub fn maccs(mol: &Molecule) -> BitString {
    let mut fp = BitString::new(MACCS_FP_SIZE);
    let ring_atoms = mol.ring_atoms();

    for i in 0..mol.atom_count() {
        let atom = &mol.atoms()[i];
        let h = mol.hydrogen_count(i);
        match atom.atomic_num {
            5 => fp.set(18),
            15 => fp.set(29),
            16 => fp.set(88),
            9 => fp.set(134),
            17 => fp.set(103),
            35 => fp.set(46),
            53 => fp.set(27),
            7 => {
                fp.set(135);
                if h >= 1 {
                    fp.set(150);
                }
            }
            8 => {
                fp.set(140);
                if h >= 1 {
                    fp.set(139);
                }
            }
            _ => {}
        }
        if atom.charge != 0 {
            fp.set(131);
        }
        if atom.aromatic {
            fp.set(162);
        }
        if ring_atoms[i] {
            fp.set(163);
            if !matches!(atom.atomic_num, 6) {
                fp.set(121);
            }
        }
        if mol.degree(i) >= 4 {
            fp.set(155);
        }
    }

    for bond in mol.bonds() {
        match bond.order {
            BondOrder::Triple => fp.set(12),
            BondOrder::Double => {
                fp.set(93);
                let o_end = mol.atoms()[bond.a].atomic_num == 8
                    || mol.atoms()[bond.b].atomic_num == 8;
                if o_end {
                    fp.set(154);
                }
            }
            _ => {}
        }
    }

    if mol.ring_count() >= 1 {
        fp.set(165);
    }
    if mol.ring_count() >= 2 {
        fp.set(145);
    }
    fp
}

/// Circular (Morgan) fingerprint with standard connectivity invariants.
pub fn morgan(mol: &Molecule, radius: i64) -> Result<BitString, ToolkitError> {
    circular(mol, radius, false)
}

/// Circular fingerprint seeded with pharmacophoric feature invariants.
pub fn feature_morgan(mol: &Molecule, radius: i64) -> Result<BitString, ToolkitError> {
    circular(mol, radius, true)
}

fn circular(mol: &Molecule, radius: i64, features: bool) -> Result<BitString, ToolkitError> {
    if !(0..=MAX_MORGAN_RADIUS).contains(&radius) {
        return Err(ToolkitError::Fingerprint(format!(
            "radius {} outside the supported range 0..={}",
            radius, MAX_MORGAN_RADIUS
        )));
    }
    let radius = radius as usize;
    let n = mol.atom_count();
    let ring_atoms = mol.ring_atoms();

    let mut identifiers: Vec<u64> = (0..n)
        .map(|i| {
            if features {
                feature_invariant(mol, i)
            } else {
                let atom = &mol.atoms()[i];
                fnv1a(&[
                    u64::from(atom.atomic_num),
                    mol.degree(i) as u64,
                    u64::from(mol.hydrogen_count(i)),
                    atom.charge as u64,
                    u64::from(ring_atoms[i]),
                    u64::from(atom.aromatic),
                ])
            }
        })
        .collect();

    let mut fp = BitString::new(MORGAN_FP_SIZE);
    for &id in &identifiers {
        fp.set(fold(id, MORGAN_FP_SIZE));
    }

    for _ in 0..radius {
        let mut next = Vec::with_capacity(n);
        for i in 0..n {
            let mut environment: Vec<(u64, u64)> = mol
                .neighbors(i)
                .iter()
                .map(|&(v, bi)| (u64::from(mol.bonds()[bi].order.tag()), identifiers[v]))
                .collect();
            environment.sort_unstable();

            let mut material = vec![identifiers[i]];
            for (order, id) in environment {
                material.push(order);
                material.push(id);
            }
            let id = fnv1a(&material);
            next.push(id);
            fp.set(fold(id, MORGAN_FP_SIZE));
        }
        identifiers = next;
    }

    Ok(fp)
}

/// Pharmacophoric seed invariant: donor, acceptor, aromatic, halogen, charge.
fn feature_invariant(mol: &Molecule, i: usize) -> u64 {
    let atom = &mol.atoms()[i];
    let h = mol.hydrogen_count(i);
    let donor = matches!(atom.atomic_num, 7 | 8) && h >= 1;
    let acceptor = matches!(atom.atomic_num, 7 | 8);
    let halogen = matches!(atom.atomic_num, 9 | 17 | 35 | 53);
    fnv1a(&[
        u64::from(donor),
        u64::from(acceptor),
        u64::from(atom.aromatic),
        u64::from(halogen),
        u64::from(atom.charge > 0),
        u64::from(atom.charge < 0),
    ])
}

/// Substructure-screening signature: atoms plus all paths up to six bonds.
pub fn signature(mol: &Molecule) -> BitString {
    let mut fp = BitString::new(SIGNATURE_FP_SIZE);
    for i in 0..mol.atom_count() {
        fp.set(fold(
            fnv1a(&[u64::from(mol.atoms()[i].atomic_num), u64::from(mol.atoms()[i].aromatic)]),
            SIGNATURE_FP_SIZE,
        ));
    }
    for_each_path(mol, 6, &mut |atoms, bonds| {
        let h = path_hash(mol, atoms, bonds, |m, i| {
            fnv1a(&[
                u64::from(m.atoms()[i].atomic_num),
                u64::from(m.atoms()[i].aromatic),
            ])
        });
        fp.set(fold(h, SIGNATURE_FP_SIZE));
    });
    fp
}
