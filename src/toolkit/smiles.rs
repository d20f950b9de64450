//! SMILES/SMARTS-subset parsing and deterministic writing.
//!
//! The parser covers the organic subset, bracket atoms (isotope prefix,
//! explicit hydrogens, formal charge, chirality marks are accepted and the
//! stereo marks discarded), branches, ring closures (including `%nn`),
//! explicit bond orders, aromatic lowercase forms, and dot-separated
//! fragments. In pattern mode the `*` wildcard atom is additionally allowed
//! and bonds written as plain singles later match single or aromatic bonds
//! during substructure search.
//!
//! The writer renders a deterministic canonical form: atoms are ranked by
//! iteratively refined graph invariants, traversal and ring-closure digits
//! are derived from those ranks, and the same molecule always renders to the
//! same text.

use std::collections::HashMap;

use super::{
    element_symbol, symbol_to_atomic_num, Atom, Bond, BondOrder, Molecule, ToolkitError,
};

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a textual notation into a molecule.
///
/// `as_pattern` selects the query-pattern grammar: wildcards become legal
/// and the resulting molecule carries pattern bond-match semantics.
pub fn parse(text: &str, as_pattern: bool) -> Result<Molecule, ToolkitError> {
    let chars: Vec<char> = text.trim().chars().collect();
    if chars.is_empty() {
        return Err(ToolkitError::Parse("empty input".to_string()));
    }

    let mut atoms: Vec<Atom> = Vec::new();
    let mut bonds: Vec<Bond> = Vec::new();
    let mut prev: Option<usize> = None;
    let mut branch_stack: Vec<Option<usize>> = Vec::new();
    let mut pending: Option<BondOrder> = None;
    let mut ring_map: HashMap<u32, (usize, Option<BondOrder>)> = HashMap::new();
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '-' => {
                pending = Some(BondOrder::Single);
                i += 1;
            }
            '=' => {
                pending = Some(BondOrder::Double);
                i += 1;
            }
            '#' => {
                pending = Some(BondOrder::Triple);
                i += 1;
            }
            ':' => {
                pending = Some(BondOrder::Aromatic);
                i += 1;
            }
            // Stereo bond marks are accepted and read as plain singles.
            '/' | '\\' => {
                pending = Some(BondOrder::Single);
                i += 1;
            }
            '(' => {
                if prev.is_none() {
                    return Err(ToolkitError::Parse("branch with no preceding atom".to_string()));
                }
                branch_stack.push(prev);
                i += 1;
            }
            ')' => {
                prev = branch_stack
                    .pop()
                    .ok_or_else(|| ToolkitError::Parse("unbalanced ')'".to_string()))?;
                i += 1;
            }
            '.' => {
                if pending.is_some() {
                    return Err(ToolkitError::Parse(
                        "bond symbol before fragment separator".to_string(),
                    ));
                }
                prev = None;
                i += 1;
            }
            '%' => {
                if i + 2 >= chars.len()
                    || !chars[i + 1].is_ascii_digit()
                    || !chars[i + 2].is_ascii_digit()
                {
                    return Err(ToolkitError::Parse("malformed '%nn' ring closure".to_string()));
                }
                let num = (chars[i + 1] as u32 - '0' as u32) * 10 + (chars[i + 2] as u32 - '0' as u32);
                close_or_open_ring(num, prev, &mut pending, &mut ring_map, &mut bonds, &atoms)?;
                i += 3;
            }
            d if d.is_ascii_digit() => {
                let num = d as u32 - '0' as u32;
                close_or_open_ring(num, prev, &mut pending, &mut ring_map, &mut bonds, &atoms)?;
                i += 1;
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|&ch| ch == ']')
                    .ok_or_else(|| ToolkitError::Parse("unterminated bracket atom".to_string()))?;
                let content: String = chars[i + 1..i + close].iter().collect();
                let atom = parse_bracket_atom(&content, as_pattern)?;
                push_atom(atom, &mut atoms, &mut bonds, &mut prev, &mut pending);
                i += close + 1;
            }
            '*' => {
                if !as_pattern {
                    return Err(ToolkitError::Parse(
                        "wildcard atom is only valid in pattern notation".to_string(),
                    ));
                }
                let atom = Atom {
                    atomic_num: 0,
                    aromatic: false,
                    charge: 0,
                    explicit_h: None,
                    wildcard: true,
                };
                push_atom(atom, &mut atoms, &mut bonds, &mut prev, &mut pending);
                i += 1;
            }
            ch if ch.is_ascii_whitespace() => {
                i += 1;
            }
            _ => {
                let (atom, consumed) = parse_organic_atom(&chars[i..])?;
                push_atom(atom, &mut atoms, &mut bonds, &mut prev, &mut pending);
                i += consumed;
            }
        }
    }

    if !branch_stack.is_empty() {
        return Err(ToolkitError::Parse("unbalanced '('".to_string()));
    }
    if let Some(&num) = ring_map.keys().next() {
        return Err(ToolkitError::Parse(format!("unclosed ring bond {}", num)));
    }
    if pending.is_some() {
        return Err(ToolkitError::Parse("trailing bond symbol".to_string()));
    }
    if atoms.is_empty() {
        return Err(ToolkitError::Parse("no atoms in input".to_string()));
    }

    Ok(Molecule::assemble(atoms, bonds, as_pattern))
}

fn push_atom(
    atom: Atom,
    atoms: &mut Vec<Atom>,
    bonds: &mut Vec<Bond>,
    prev: &mut Option<usize>,
    pending: &mut Option<BondOrder>,
) {
    let idx = atoms.len();
    atoms.push(atom);
    if let Some(p) = *prev {
        let order = pending
            .take()
            .unwrap_or_else(|| implied_order(&atoms[p], &atoms[idx]));
        bonds.push(Bond { a: p, b: idx, order });
    }
    *prev = Some(idx);
}

/// An unwritten bond between two aromatic atoms is aromatic, otherwise single.
fn implied_order(a: &Atom, b: &Atom) -> BondOrder {
    if a.aromatic && b.aromatic {
        BondOrder::Aromatic
    } else {
        BondOrder::Single
    }
}

fn close_or_open_ring(
    num: u32,
    prev: Option<usize>,
    pending: &mut Option<BondOrder>,
    ring_map: &mut HashMap<u32, (usize, Option<BondOrder>)>,
    bonds: &mut Vec<Bond>,
    atoms: &[Atom],
) -> Result<(), ToolkitError> {
    let here = prev.ok_or_else(|| {
        ToolkitError::Parse("ring closure digit with no preceding atom".to_string())
    })?;
    let taken = pending.take();
    match ring_map.remove(&num) {
        Some((there, stored)) => {
            if there == here {
                return Err(ToolkitError::Parse(format!(
                    "ring bond {} closes on its own atom",
                    num
                )));
            }
            let order = stored
                .or(taken)
                .unwrap_or_else(|| implied_order(&atoms[there], &atoms[here]));
            bonds.push(Bond {
                a: there,
                b: here,
                order,
            });
        }
        None => {
            ring_map.insert(num, (here, taken));
        }
    }
    Ok(())
}

fn parse_organic_atom(rest: &[char]) -> Result<(Atom, usize), ToolkitError> {
    // Two-letter symbols first.
    if rest.len() >= 2 {
        let two: String = rest[..2].iter().collect();
        if two == "Cl" || two == "Br" {
            let atomic_num = symbol_to_atomic_num(&two).unwrap_or(0);
            return Ok((plain_atom(atomic_num, false), 2));
        }
    }
    let c = rest[0];
    let (symbol, aromatic) = match c {
        'B' | 'C' | 'N' | 'O' | 'P' | 'S' | 'F' | 'I' => (c.to_string(), false),
        'b' | 'c' | 'n' | 'o' | 'p' | 's' => (c.to_ascii_uppercase().to_string(), true),
        _ => {
            return Err(ToolkitError::Parse(format!(
                "unexpected character '{}' in input",
                c
            )))
        }
    };
    let atomic_num = symbol_to_atomic_num(&symbol)
        .ok_or_else(|| ToolkitError::Parse(format!("unknown element '{}'", symbol)))?;
    Ok((plain_atom(atomic_num, aromatic), 1))
}

fn plain_atom(atomic_num: u8, aromatic: bool) -> Atom {
    Atom {
        atomic_num,
        aromatic,
        charge: 0,
        explicit_h: None,
        wildcard: false,
    }
}

/// Parse the content of a bracket atom, e.g. `13CH4`, `NH4+`, `O-`, `nH`.
///
/// Bracket atoms carry an explicit hydrogen count (zero when unwritten, per
/// the notation's rules), so they round-trip exactly.
fn parse_bracket_atom(content: &str, as_pattern: bool) -> Result<Atom, ToolkitError> {
    let chars: Vec<char> = content.chars().collect();
    let mut k = 0usize;

    // Isotope prefix: accepted, not retained.
    while k < chars.len() && chars[k].is_ascii_digit() {
        k += 1;
    }
    if k >= chars.len() {
        return Err(ToolkitError::Parse(format!("bad bracket atom '[{}]'", content)));
    }

    let (atomic_num, aromatic, wildcard) = if chars[k] == '*' {
        if !as_pattern {
            return Err(ToolkitError::Parse(
                "wildcard atom is only valid in pattern notation".to_string(),
            ));
        }
        k += 1;
        (0u8, false, true)
    } else {
        let aromatic = chars[k].is_ascii_lowercase();
        let mut symbol = chars[k].to_ascii_uppercase().to_string();
        k += 1;
        if !aromatic && k < chars.len() && chars[k].is_ascii_lowercase() && chars[k] != 'h' {
            symbol.push(chars[k]);
            k += 1;
        } else if aromatic && symbol == "S" && k < chars.len() && chars[k] == 'e' {
            symbol.push('e');
            k += 1;
        }
        let num = symbol_to_atomic_num(&symbol)
            .ok_or_else(|| ToolkitError::Parse(format!("unknown element '{}'", symbol)))?;
        (num, aromatic, false)
    };

    let mut explicit_h = 0u8;
    let mut charge = 0i8;
    while k < chars.len() {
        match chars[k] {
            '@' => k += 1,
            'H' => {
                k += 1;
                let mut digits = String::new();
                while k < chars.len() && chars[k].is_ascii_digit() {
                    digits.push(chars[k]);
                    k += 1;
                }
                explicit_h = if digits.is_empty() {
                    1
                } else {
                    digits
                        .parse()
                        .map_err(|_| ToolkitError::Parse("bad hydrogen count".to_string()))?
                };
            }
            '+' | '-' => {
                let sign: i8 = if chars[k] == '+' { 1 } else { -1 };
                let symbol = chars[k];
                let mut magnitude = 1i8;
                k += 1;
                while k < chars.len() && chars[k] == symbol {
                    magnitude += 1;
                    k += 1;
                }
                let mut digits = String::new();
                while k < chars.len() && chars[k].is_ascii_digit() {
                    digits.push(chars[k]);
                    k += 1;
                }
                if !digits.is_empty() {
                    magnitude = digits
                        .parse()
                        .map_err(|_| ToolkitError::Parse("bad charge magnitude".to_string()))?;
                }
                charge = sign * magnitude;
            }
            other => {
                return Err(ToolkitError::Parse(format!(
                    "unsupported bracket token '{}' in '[{}]'",
                    other, content
                )))
            }
        }
    }

    Ok(Atom {
        atomic_num,
        aromatic,
        charge,
        explicit_h: Some(explicit_h),
        wildcard,
    })
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Render a molecule to its deterministic canonical text form.
///
/// `as_pattern` renders the query-pattern form; for the supported grammar the
/// two forms differ only in wildcard emission, which requires pattern mode.
pub fn write(mol: &Molecule, as_pattern: bool) -> Result<String, ToolkitError> {
    if mol.atom_count() == 0 {
        return Err(ToolkitError::Write("cannot render an empty molecule".to_string()));
    }
    if !as_pattern && mol.atoms.iter().any(|a| a.wildcard) {
        return Err(ToolkitError::Write(
            "molecule contains wildcard atoms; render as a pattern".to_string(),
        ));
    }

    let ranks = canonical_ranks(mol);
    let plan = TraversalPlan::build(mol, &ranks);

    let mut fragments: Vec<String> = Vec::new();
    for &root in &plan.roots {
        fragments.push(emit_fragment(mol, &plan, root));
    }
    Ok(fragments.join("."))
}

/// Iteratively refined canonical atom ranks.
///
/// The initial invariant covers element, aromaticity, charge, degree and
/// hydrogen count; refinement folds in sorted neighbor ranks until the
/// partition stabilizes.
fn canonical_ranks(mol: &Molecule) -> Vec<usize> {
    let n = mol.atom_count();
    let initial: Vec<(u8, bool, i8, usize, u32, bool)> = (0..n)
        .map(|i| {
            let a = &mol.atoms[i];
            (
                a.atomic_num,
                a.aromatic,
                a.charge,
                mol.degree(i),
                mol.hydrogen_count(i),
                a.wildcard,
            )
        })
        .collect();
    let mut ranks = assign_ranks(&initial);

    for _ in 0..n {
        let keys: Vec<(usize, Vec<usize>)> = (0..n)
            .map(|i| {
                let mut neighbor_ranks: Vec<usize> =
                    mol.adjacency[i].iter().map(|&(v, _)| ranks[v]).collect();
                neighbor_ranks.sort_unstable();
                (ranks[i], neighbor_ranks)
            })
            .collect();
        let refined = assign_ranks(&keys);
        if refined == ranks {
            break;
        }
        ranks = refined;
    }
    ranks
}

fn assign_ranks<K: Ord + Clone>(keys: &[K]) -> Vec<usize> {
    let mut sorted: Vec<K> = keys.to_vec();
    sorted.sort();
    sorted.dedup();
    keys.iter()
        .map(|k| sorted.binary_search(k).unwrap_or(0))
        .collect()
}

/// Precomputed traversal: tree bonds, ring-closure digits, visit order.
struct TraversalPlan {
    roots: Vec<usize>,
    tree_bond: Vec<bool>,
    closures: Vec<Vec<(u32, usize)>>,
    order: Vec<Vec<usize>>,
}

impl TraversalPlan {
    fn build(mol: &Molecule, ranks: &[usize]) -> TraversalPlan {
        let n = mol.atom_count();
        let mut visited = vec![false; n];
        let mut bond_seen = vec![false; mol.bond_count()];
        let mut tree_bond = vec![false; mol.bond_count()];
        let mut closures: Vec<Vec<(u32, usize)>> = vec![Vec::new(); n];
        let mut order: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut roots = Vec::new();
        let mut next_digit = 1u32;

        for start in pick_roots(mol, ranks) {
            if visited[start] {
                continue;
            }
            roots.push(start);
            let mut stack = vec![start];
            visited[start] = true;
            while let Some(u) = stack.pop() {
                let mut nbrs: Vec<(usize, usize)> = mol.adjacency[u].to_vec();
                nbrs.sort_by_key(|&(v, _)| (ranks[v], v));
                for &(v, bi) in &nbrs {
                    if bond_seen[bi] {
                        continue;
                    }
                    bond_seen[bi] = true;
                    if visited[v] {
                        // Back edge: becomes a ring-closure digit on both atoms.
                        closures[u].push((next_digit, bi));
                        closures[v].push((next_digit, bi));
                        next_digit += 1;
                    } else {
                        visited[v] = true;
                        tree_bond[bi] = true;
                        order[u].push(v);
                        stack.push(v);
                    }
                }
            }
        }

        TraversalPlan {
            roots,
            tree_bond,
            closures,
            order,
        }
    }
}

/// Component roots: the lowest-ranked atom of each component, components in
/// first-atom order.
fn pick_roots(mol: &Molecule, ranks: &[usize]) -> Vec<usize> {
    let n = mol.atom_count();
    let mut assigned = vec![false; n];
    let mut roots = Vec::new();
    for start in 0..n {
        if assigned[start] {
            continue;
        }
        let mut members = vec![start];
        assigned[start] = true;
        let mut cursor = 0;
        while cursor < members.len() {
            let u = members[cursor];
            cursor += 1;
            for &(v, _) in &mol.adjacency[u] {
                if !assigned[v] {
                    assigned[v] = true;
                    members.push(v);
                }
            }
        }
        let root = members
            .iter()
            .copied()
            .min_by_key(|&i| (ranks[i], i))
            .unwrap_or(start);
        roots.push(root);
    }
    roots
}

fn emit_fragment(mol: &Molecule, plan: &TraversalPlan, root: usize) -> String {
    // Recursion depth is bounded by the atom count; molecules at this
    // blob scale stay well within stack limits.
    fn emit(mol: &Molecule, plan: &TraversalPlan, u: usize, in_order: Option<&Bond>) -> String {
        let mut s = String::new();
        if let Some(bond) = in_order {
            s.push_str(bond_symbol(mol, bond));
        }
        s.push_str(&atom_text(mol, u));
        for &(digit, bi) in &plan.closures[u] {
            s.push_str(bond_symbol(mol, &mol.bonds[bi]));
            if digit < 10 {
                s.push(char::from(b'0' + digit as u8));
            } else {
                s.push('%');
                s.push_str(&format!("{:02}", digit));
            }
        }
        let children = &plan.order[u];
        for (pos, &v) in children.iter().enumerate() {
            let bond = mol.adjacency[u]
                .iter()
                .find(|&&(w, bi)| w == v && plan.tree_bond[bi])
                .map(|&(_, bi)| &mol.bonds[bi]);
            let Some(bond) = bond else { continue };
            let child_text = emit(mol, plan, v, Some(bond));
            if pos + 1 < children.len() {
                s.push('(');
                s.push_str(&child_text);
                s.push(')');
            } else {
                s.push_str(&child_text);
            }
        }
        s
    }
    emit(mol, plan, root, None)
}

fn bond_symbol(mol: &Molecule, bond: &Bond) -> &'static str {
    let both_aromatic = mol.atoms[bond.a].aromatic && mol.atoms[bond.b].aromatic;
    match bond.order {
        BondOrder::Single => {
            if both_aromatic {
                "-"
            } else {
                ""
            }
        }
        BondOrder::Double => "=",
        BondOrder::Triple => "#",
        BondOrder::Aromatic => {
            if both_aromatic {
                ""
            } else {
                ":"
            }
        }
    }
}

fn is_organic_subset(atomic_num: u8) -> bool {
    matches!(atomic_num, 5 | 6 | 7 | 8 | 9 | 15 | 16 | 17 | 35 | 53)
}

fn atom_text(mol: &Molecule, u: usize) -> String {
    let atom = &mol.atoms[u];
    if atom.wildcard {
        return "*".to_string();
    }
    let symbol = element_symbol(atom.atomic_num);
    let rendered = if atom.aromatic {
        symbol.to_ascii_lowercase()
    } else {
        symbol.to_string()
    };

    let aromatic_writable = matches!(atom.atomic_num, 5 | 6 | 7 | 8 | 15 | 16 | 34);
    let needs_bracket = atom.charge != 0
        || atom.explicit_h.is_some()
        || !is_organic_subset(atom.atomic_num)
        || (atom.aromatic && !aromatic_writable);

    if !needs_bracket {
        return rendered;
    }

    let h = atom
        .explicit_h
        .map(u32::from)
        .unwrap_or_else(|| mol.hydrogen_count(u));
    let mut s = String::from("[");
    s.push_str(&rendered);
    if h == 1 {
        s.push('H');
    } else if h > 1 {
        s.push('H');
        s.push_str(&h.to_string());
    }
    if atom.charge != 0 {
        let sign = if atom.charge > 0 { '+' } else { '-' };
        s.push(sign);
        let magnitude = atom.charge.unsigned_abs();
        if magnitude > 1 {
            s.push_str(&magnitude.to_string());
        }
    }
    s.push(']');
    s
}
