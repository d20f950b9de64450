//! The chemistry toolkit: molecular graphs and the algorithms over them.
//!
//! Everything in this module family is internal capability the codec and
//! pipeline layers call into. Failures are reported as [`ToolkitError`] and
//! are always translated into the host-visible taxonomy at the boundary;
//! `ToolkitError` itself never crosses the crate's public function surface.

pub mod descriptors;
pub mod fingerprints;
pub mod pickle;
pub mod smiles;
pub mod substruct;

use thiserror::Error;

/// Internal failures raised by the toolkit.
#[derive(Debug, Error)]
pub enum ToolkitError {
    /// A textual notation was rejected by the parser.
    #[error("parse error: {0}")]
    Parse(String),

    /// A molecule could not be rendered to text.
    #[error("write error: {0}")]
    Write(String),

    /// A pickle buffer could not be decoded, or a molecule not encoded.
    #[error("pickle error: {0}")]
    Pickle(String),

    /// A fingerprint algorithm rejected its input.
    #[error("fingerprint error: {0}")]
    Fingerprint(String),
}

/// Bond order in the molecular graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondOrder {
    /// A single bond.
    Single,
    /// A double bond.
    Double,
    /// A triple bond.
    Triple,
    /// An aromatic (delocalized ring) bond.
    Aromatic,
}

impl BondOrder {
    /// Contribution to an atom's bond order sum.
    pub fn order_value(self) -> f64 {
        match self {
            BondOrder::Single => 1.0,
            BondOrder::Double => 2.0,
            BondOrder::Triple => 3.0,
            BondOrder::Aromatic => 1.5,
        }
    }

    pub(crate) fn tag(self) -> u8 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Aromatic => 4,
        }
    }

    pub(crate) fn from_tag(tag: u8) -> Option<BondOrder> {
        match tag {
            1 => Some(BondOrder::Single),
            2 => Some(BondOrder::Double),
            3 => Some(BondOrder::Triple),
            4 => Some(BondOrder::Aromatic),
            _ => None,
        }
    }
}

/// An atom in the hydrogen-suppressed molecular graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    /// Atomic number (6 = carbon, 8 = oxygen, ...); 0 for a wildcard.
    pub atomic_num: u8,
    /// True for atoms written in aromatic (lowercase) form.
    pub aromatic: bool,
    /// Formal charge.
    pub charge: i8,
    /// Hydrogen count given explicitly in a bracket atom, overriding the
    /// valence-derived implicit count.
    pub explicit_h: Option<u8>,
    /// True for the `*` wildcard in pattern notation.
    pub wildcard: bool,
}

/// A bond between two atoms, by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bond {
    /// First endpoint.
    pub a: usize,
    /// Second endpoint.
    pub b: usize,
    /// Bond order.
    pub order: BondOrder,
}

/// An owned, in-memory parsed molecule: atoms, bonds, ring membership.
///
/// A `Molecule` only ever results from a successful parse or pickle decode,
/// is never mutated afterwards, and is dropped by its single owner when the
/// operation that needed it completes.
#[derive(Debug, Clone)]
pub struct Molecule {
    pub(crate) atoms: Vec<Atom>,
    pub(crate) bonds: Vec<Bond>,
    pub(crate) adjacency: Vec<Vec<(usize, usize)>>,
    pub(crate) pattern: bool,
}

impl Molecule {
    /// Assemble a molecule from parsed parts, building the adjacency list.
    pub(crate) fn assemble(atoms: Vec<Atom>, bonds: Vec<Bond>, pattern: bool) -> Molecule {
        let mut adjacency = vec![Vec::new(); atoms.len()];
        for (bi, bond) in bonds.iter().enumerate() {
            adjacency[bond.a].push((bond.b, bi));
            adjacency[bond.b].push((bond.a, bi));
        }
        Molecule {
            atoms,
            bonds,
            adjacency,
            pattern,
        }
    }

    /// Number of heavy (non-hydrogen) atoms.
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Number of bonds.
    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    /// True when this molecule was parsed as a query pattern.
    pub fn is_pattern(&self) -> bool {
        self.pattern
    }

    /// Atoms slice.
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Bonds slice.
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// Graph degree (heavy neighbor count) of atom `i`.
    pub fn degree(&self, i: usize) -> usize {
        self.adjacency[i].len()
    }

    /// Neighbors of atom `i` as `(neighbor index, bond index)` pairs.
    pub fn neighbors(&self, i: usize) -> &[(usize, usize)] {
        &self.adjacency[i]
    }

    /// Sum of bond orders incident to atom `i` (aromatic counts 1.5).
    pub fn bond_order_sum(&self, i: usize) -> f64 {
        self.adjacency[i]
            .iter()
            .map(|&(_, bi)| self.bonds[bi].order.order_value())
            .sum()
    }

    /// Hydrogen count of atom `i`: the explicit bracket count when present,
    /// otherwise derived from the element's default valence, formal charge,
    /// and incident bond orders. Wildcards carry no hydrogens.
    pub fn hydrogen_count(&self, i: usize) -> u32 {
        let atom = &self.atoms[i];
        if atom.wildcard {
            return 0;
        }
        if let Some(h) = atom.explicit_h {
            return h as u32;
        }
        let valence = default_valence(atom.atomic_num);
        if valence == 0 {
            return 0;
        }
        let effective = valence as f64 + atom.charge as f64;
        let free = effective - self.bond_order_sum(i);
        if free > 0.0 {
            free.floor() as u32
        } else {
            0
        }
    }

    /// Total atom count, implicit and explicit hydrogens included.
    pub fn total_atom_count(&self) -> usize {
        let hydrogens: u32 = (0..self.atoms.len()).map(|i| self.hydrogen_count(i)).sum();
        self.atoms.len() + hydrogens as usize
    }

    /// Number of connected components.
    pub fn component_count(&self) -> usize {
        let n = self.atoms.len();
        let mut seen = vec![false; n];
        let mut components = 0;
        for start in 0..n {
            if seen[start] {
                continue;
            }
            components += 1;
            let mut stack = vec![start];
            seen[start] = true;
            while let Some(u) = stack.pop() {
                for &(v, _) in &self.adjacency[u] {
                    if !seen[v] {
                        seen[v] = true;
                        stack.push(v);
                    }
                }
            }
        }
        components
    }

    /// Number of rings (cyclomatic: bonds - atoms + components).
    pub fn ring_count(&self) -> u32 {
        (self.bonds.len() + self.component_count()).saturating_sub(self.atoms.len()) as u32
    }

    /// Per-bond ring membership: a bond is in a ring iff it is not a bridge.
    pub fn ring_bonds(&self) -> Vec<bool> {
        let n = self.atoms.len();
        let mut in_ring = vec![true; self.bonds.len()];
        if n == 0 {
            return in_ring;
        }

        // Iterative bridge-finding DFS (Tarjan low-link).
        let mut disc = vec![usize::MAX; n];
        let mut low = vec![0usize; n];
        let mut timer = 0usize;
        // (node, parent bond, neighbor cursor)
        let mut stack: Vec<(usize, usize, usize)> = Vec::new();

        for root in 0..n {
            if disc[root] != usize::MAX {
                continue;
            }
            disc[root] = timer;
            low[root] = timer;
            timer += 1;
            stack.push((root, usize::MAX, 0));

            loop {
                let Some(frame) = stack.last_mut() else {
                    break;
                };
                let (u, pbond, cursor) = *frame;
                if cursor < self.adjacency[u].len() {
                    frame.2 += 1;
                    let (v, bi) = self.adjacency[u][cursor];
                    if bi == pbond {
                        continue;
                    }
                    if disc[v] == usize::MAX {
                        disc[v] = timer;
                        low[v] = timer;
                        timer += 1;
                        stack.push((v, bi, 0));
                    } else {
                        low[u] = low[u].min(disc[v]);
                    }
                } else {
                    stack.pop();
                    if let Some(&(parent, _, _)) = stack.last() {
                        low[parent] = low[parent].min(low[u]);
                        if low[u] > disc[parent] {
                            in_ring[pbond] = false;
                        }
                    }
                }
            }
        }
        in_ring
    }

    /// Per-atom ring membership: incident to at least one ring bond.
    pub fn ring_atoms(&self) -> Vec<bool> {
        let ring_bonds = self.ring_bonds();
        let mut in_ring = vec![false; self.atoms.len()];
        for (bi, bond) in self.bonds.iter().enumerate() {
            if ring_bonds[bi] {
                in_ring[bond.a] = true;
                in_ring[bond.b] = true;
            }
        }
        in_ring
    }

    /// All-pairs topological distances over the heavy-atom graph.
    ///
    /// Unreachable pairs keep a large sentinel distance.
    pub fn distance_matrix(&self) -> Vec<Vec<u32>> {
        const FAR: u32 = 1_000_000;
        let n = self.atoms.len();
        let mut dist = vec![vec![FAR; n]; n];
        for i in 0..n {
            dist[i][i] = 0;
            for &(j, _) in &self.adjacency[i] {
                dist[i][j] = 1;
            }
        }
        for k in 0..n {
            for i in 0..n {
                for j in 0..n {
                    let through = dist[i][k].saturating_add(dist[k][j]);
                    if through < dist[i][j] {
                        dist[i][j] = through;
                    }
                }
            }
        }
        dist
    }
}

/// Default valence used to derive implicit hydrogen counts.
pub(crate) fn default_valence(atomic_num: u8) -> u32 {
    match atomic_num {
        1 => 1,       // H
        5 => 3,       // B
        6 => 4,       // C
        7 => 3,       // N
        8 => 2,       // O
        9 => 1,       // F
        15 => 3,      // P
        16 => 2,      // S
        17 => 1,      // Cl
        35 => 1,      // Br
        53 => 1,      // I
        _ => 0,
    }
}

/// Element symbol for an atomic number; `*` for wildcards.
pub(crate) fn element_symbol(atomic_num: u8) -> &'static str {
    match atomic_num {
        0 => "*",
        1 => "H",
        3 => "Li",
        5 => "B",
        6 => "C",
        7 => "N",
        8 => "O",
        9 => "F",
        11 => "Na",
        12 => "Mg",
        14 => "Si",
        15 => "P",
        16 => "S",
        17 => "Cl",
        19 => "K",
        20 => "Ca",
        26 => "Fe",
        29 => "Cu",
        30 => "Zn",
        34 => "Se",
        35 => "Br",
        53 => "I",
        _ => "?",
    }
}

/// Atomic number for an element symbol.
pub(crate) fn symbol_to_atomic_num(symbol: &str) -> Option<u8> {
    Some(match symbol {
        "H" => 1,
        "Li" => 3,
        "B" => 5,
        "C" => 6,
        "N" => 7,
        "O" => 8,
        "F" => 9,
        "Na" => 11,
        "Mg" => 12,
        "Si" => 14,
        "P" => 15,
        "S" => 16,
        "Cl" => 17,
        "K" => 19,
        "Ca" => 20,
        "Fe" => 26,
        "Cu" => 29,
        "Zn" => 30,
        "Se" => 34,
        "Br" => 35,
        "I" => 53,
        _ => return None,
    })
}

/// Average atomic weight, in Daltons.
pub(crate) fn atomic_weight(atomic_num: u8) -> f64 {
    match atomic_num {
        1 => 1.008,
        3 => 6.941,
        5 => 10.811,
        6 => 12.011,
        7 => 14.007,
        8 => 15.999,
        9 => 18.998,
        11 => 22.990,
        12 => 24.305,
        14 => 28.086,
        15 => 30.974,
        16 => 32.06,
        17 => 35.453,
        19 => 39.098,
        20 => 40.078,
        26 => 55.845,
        29 => 63.546,
        30 => 65.38,
        34 => 78.971,
        35 => 79.904,
        53 => 126.904,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::smiles::parse;
    use super::*;

    #[test]
    fn benzene_ring_membership() {
        let mol = parse("c1ccccc1", false).unwrap();
        assert_eq!(mol.atom_count(), 6);
        assert_eq!(mol.bond_count(), 6);
        assert_eq!(mol.ring_count(), 1);
        assert!(mol.ring_atoms().iter().all(|&r| r));
        assert!(mol.ring_bonds().iter().all(|&r| r));
    }

    #[test]
    fn toluene_methyl_is_acyclic() {
        let mol = parse("Cc1ccccc1", false).unwrap();
        assert_eq!(mol.ring_count(), 1);
        let ring_atoms = mol.ring_atoms();
        assert!(!ring_atoms[0]);
        assert_eq!(ring_atoms.iter().filter(|&&r| r).count(), 6);
        let ring_bonds = mol.ring_bonds();
        assert_eq!(ring_bonds.iter().filter(|&&r| r).count(), 6);
    }

    #[test]
    fn hydrogen_counts_follow_valence() {
        let mol = parse("CCO", false).unwrap();
        assert_eq!(mol.hydrogen_count(0), 3);
        assert_eq!(mol.hydrogen_count(1), 2);
        assert_eq!(mol.hydrogen_count(2), 1);
        assert_eq!(mol.total_atom_count(), 9);
    }

    #[test]
    fn aromatic_carbons_carry_one_hydrogen() {
        let mol = parse("c1ccccc1", false).unwrap();
        for i in 0..6 {
            assert_eq!(mol.hydrogen_count(i), 1);
        }
    }

    #[test]
    fn bracket_atoms_carry_their_hydrogen_counts() {
        let mol = parse("[NH4+]", false).unwrap();
        assert_eq!(mol.hydrogen_count(0), 4);
        let mol = parse("[O-]C", false).unwrap();
        assert_eq!(mol.hydrogen_count(0), 0);
    }

    #[test]
    fn distance_matrix_linear_chain() {
        let mol = parse("CCCC", false).unwrap();
        let d = mol.distance_matrix();
        assert_eq!(d[0][3], 3);
        assert_eq!(d[1][2], 1);
        assert_eq!(d[2][2], 0);
    }
}
