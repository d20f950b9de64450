//! Subgraph matching for substructure queries.
//!
//! A backtracking isomorphism search mapping every query atom onto a
//! distinct target atom with compatible bonds. Exact graph-match semantics:
//! no partial or approximate matches. Query molecules parsed in pattern mode
//! get pattern bond behavior: an unqualified single bond also matches an
//! aromatic target bond, and wildcard atoms match any target atom.

use super::{Bond, BondOrder, Molecule};

/// True when `query` occurs as a subgraph of `target`.
pub fn matches(target: &Molecule, query: &Molecule) -> bool {
    if query.atom_count() == 0 {
        return false;
    }
    if query.atom_count() > target.atom_count() || query.bond_count() > target.bond_count() {
        return false;
    }

    let order = search_order(query);
    let mut mapping: Vec<Option<usize>> = vec![None; query.atom_count()];
    let mut used: Vec<bool> = vec![false; target.atom_count()];
    try_assign(target, query, &order, 0, &mut mapping, &mut used)
}

/// Query atoms ordered so each atom (after the first of its component)
/// neighbors an earlier one; keeps the search anchored.
fn search_order(query: &Molecule) -> Vec<usize> {
    let n = query.atom_count();
    let mut order = Vec::with_capacity(n);
    let mut placed = vec![false; n];

    for seed in 0..n {
        if placed[seed] {
            continue;
        }
        placed[seed] = true;
        order.push(seed);
        let mut frontier = order.len() - 1;
        while frontier < order.len() {
            let u = order[frontier];
            frontier += 1;
            for &(v, _) in query.neighbors(u) {
                if !placed[v] {
                    placed[v] = true;
                    order.push(v);
                }
            }
        }
    }
    order
}

fn try_assign(
    target: &Molecule,
    query: &Molecule,
    order: &[usize],
    pos: usize,
    mapping: &mut Vec<Option<usize>>,
    used: &mut Vec<bool>,
) -> bool {
    if pos == order.len() {
        return true;
    }
    let q = order[pos];

    // Anchor on an already-mapped neighbor when one exists; otherwise the
    // whole target is candidate space (new fragment).
    let anchor = query
        .neighbors(q)
        .iter()
        .find_map(|&(v, _)| mapping[v].map(|t| (v, t)));

    let candidates: Vec<usize> = match anchor {
        Some((_, mapped)) => target.neighbors(mapped).iter().map(|&(t, _)| t).collect(),
        None => (0..target.atom_count()).collect(),
    };

    for t in candidates {
        if used[t] || !atom_compatible(target, query, t, q) {
            continue;
        }
        if !bonds_compatible(target, query, q, t, mapping) {
            continue;
        }
        mapping[q] = Some(t);
        used[t] = true;
        if try_assign(target, query, order, pos + 1, mapping, used) {
            return true;
        }
        mapping[q] = None;
        used[t] = false;
    }
    false
}

fn atom_compatible(target: &Molecule, query: &Molecule, t: usize, q: usize) -> bool {
    let qa = &query.atoms()[q];
    if qa.wildcard {
        return query.degree(q) <= target.degree(t);
    }
    let ta = &target.atoms()[t];
    if qa.atomic_num != ta.atomic_num || qa.aromatic != ta.aromatic {
        return false;
    }
    if qa.charge != 0 && qa.charge != ta.charge {
        return false;
    }
    if let Some(h) = qa.explicit_h {
        if target.hydrogen_count(t) < u32::from(h) {
            return false;
        }
    }
    query.degree(q) <= target.degree(t)
}

/// Every query bond from `q` into the already-mapped region must have a
/// matching target bond.
fn bonds_compatible(
    target: &Molecule,
    query: &Molecule,
    q: usize,
    t: usize,
    mapping: &[Option<usize>],
) -> bool {
    for &(v, qbi) in query.neighbors(q) {
        let Some(tv) = mapping[v] else { continue };
        let Some(tbond) = target
            .neighbors(t)
            .iter()
            .find(|&&(w, _)| w == tv)
            .map(|&(_, tbi)| &target.bonds()[tbi])
        else {
            return false;
        };
        if !bond_compatible(query, &query.bonds()[qbi], tbond) {
            return false;
        }
    }
    true
}

fn bond_compatible(query: &Molecule, qbond: &Bond, tbond: &Bond) -> bool {
    if query.is_pattern() && qbond.order == BondOrder::Single {
        return matches!(tbond.order, BondOrder::Single | BondOrder::Aromatic);
    }
    qbond.order == tbond.order
}

#[cfg(test)]
mod tests {
    use super::super::smiles::parse;
    use super::*;

    #[test]
    fn finds_embedded_fragments() {
        let aspirin = parse("CC(=O)Oc1ccccc1C(=O)O", false).unwrap();
        let benzene = parse("c1ccccc1", false).unwrap();
        let carbonyl = parse("C=O", false).unwrap();
        assert!(matches(&aspirin, &benzene));
        assert!(matches(&aspirin, &carbonyl));
        assert!(!matches(&benzene, &aspirin));
    }

    #[test]
    fn every_molecule_contains_itself() {
        for input in ["CCO", "c1ccccc1", "CC(=O)Oc1ccccc1C(=O)O", "[NH4+]"] {
            let mol = parse(input, false).unwrap();
            assert!(matches(&mol, &mol), "input {}", input);
        }
    }

    #[test]
    fn element_and_aromaticity_must_agree() {
        let cyclohexane = parse("C1CCCCC1", false).unwrap();
        let benzene = parse("c1ccccc1", false).unwrap();
        assert!(!matches(&cyclohexane, &benzene));
        assert!(!matches(&benzene, &cyclohexane));

        let ethanol = parse("CCO", false).unwrap();
        let ethylamine = parse("CCN", false).unwrap();
        assert!(!matches(&ethanol, &ethylamine));
    }

    #[test]
    fn pattern_wildcards_and_single_bonds_relax() {
        let toluene = parse("Cc1ccccc1", false).unwrap();
        // Wildcard reaches the methyl carbon.
        let query = parse("*c1ccccc1", true).unwrap();
        assert!(matches(&toluene, &query));
        // Pattern single bond also spans aromatic target bonds.
        let ring_only = parse("c1ccccc1", false).unwrap();
        let single_pair = parse("c-c", true).unwrap();
        assert!(matches(&ring_only, &single_pair));
        // The same pair written concretely stays strict.
        let concrete_pair = parse("c-c", false).unwrap();
        assert!(!matches(&ring_only, &concrete_pair));
    }

    #[test]
    fn disconnected_queries_need_all_fragments() {
        let mixture = parse("CCO.c1ccccc1", false).unwrap();
        let both = parse("O.c1ccccc1", false).unwrap();
        assert!(matches(&mixture, &both));
        let ethanol = parse("CCO", false).unwrap();
        assert!(!matches(&ethanol, &both));
    }
}
