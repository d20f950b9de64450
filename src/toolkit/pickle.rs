//! The opaque binary structure encoding ("pickle").
//!
//! Layout: a 4-byte magic/version tag, varint-framed atom and bond counts,
//! then fixed-width atom records and varint-indexed bond records. The format
//! is self-describing and round-trips a molecule losslessly; its layout is
//! owned entirely by this module and callers treat the bytes as opaque.

use super::{Atom, Bond, BondOrder, Molecule, ToolkitError};

/// Magic tag: three identifying bytes plus a format version.
const MAGIC: [u8; 4] = [b'M', b'S', b'M', 1];

const FLAG_AROMATIC: u8 = 0b0000_0001;
const FLAG_WILDCARD: u8 = 0b0000_0010;
const FLAG_EXPLICIT_H: u8 = 0b0000_0100;
const FLAG_PATTERN: u8 = 0b0000_0001;

/// Serialize a molecule to its pickle form.
pub fn encode(mol: &Molecule) -> Result<Vec<u8>, ToolkitError> {
    if mol.atom_count() == 0 {
        return Err(ToolkitError::Pickle("cannot pickle an empty molecule".to_string()));
    }

    let mut buf = Vec::with_capacity(8 + mol.atom_count() * 4 + mol.bond_count() * 3);
    buf.extend_from_slice(&MAGIC);
    buf.push(if mol.is_pattern() { FLAG_PATTERN } else { 0 });
    write_varint(&mut buf, mol.atom_count() as u64);
    write_varint(&mut buf, mol.bond_count() as u64);

    for atom in mol.atoms() {
        buf.push(atom.atomic_num);
        let mut flags = 0u8;
        if atom.aromatic {
            flags |= FLAG_AROMATIC;
        }
        if atom.wildcard {
            flags |= FLAG_WILDCARD;
        }
        if atom.explicit_h.is_some() {
            flags |= FLAG_EXPLICIT_H;
        }
        buf.push(flags);
        buf.push(atom.charge as u8);
        buf.push(atom.explicit_h.unwrap_or(0));
    }

    for bond in mol.bonds() {
        write_varint(&mut buf, bond.a as u64);
        write_varint(&mut buf, bond.b as u64);
        buf.push(bond.order.tag());
    }

    Ok(buf)
}

/// Reconstruct a molecule from its pickle form.
pub fn decode(blob: &[u8]) -> Result<Molecule, ToolkitError> {
    let mut r = Reader { buf: blob, pos: 0 };

    let tag = r.take(4)?;
    if tag != &MAGIC[..] {
        return Err(ToolkitError::Pickle("bad magic tag".to_string()));
    }
    let pattern = r.take(1)?[0] & FLAG_PATTERN != 0;

    let natoms = r.read_varint()? as usize;
    let nbonds = r.read_varint()? as usize;
    if natoms == 0 {
        return Err(ToolkitError::Pickle("pickle declares zero atoms".to_string()));
    }
    // Bond count can never reach atoms * atoms in a simple graph; the bound
    // also caps allocation before the records are read.
    if natoms > u32::MAX as usize || nbonds > natoms.saturating_mul(natoms) {
        return Err(ToolkitError::Pickle("implausible atom/bond counts".to_string()));
    }

    let mut atoms = Vec::with_capacity(natoms);
    for _ in 0..natoms {
        let rec = r.take(4)?;
        let flags = rec[1];
        atoms.push(Atom {
            atomic_num: rec[0],
            aromatic: flags & FLAG_AROMATIC != 0,
            charge: rec[2] as i8,
            explicit_h: if flags & FLAG_EXPLICIT_H != 0 {
                Some(rec[3])
            } else {
                None
            },
            wildcard: flags & FLAG_WILDCARD != 0,
        });
    }

    let mut bonds = Vec::with_capacity(nbonds);
    for _ in 0..nbonds {
        let a = r.read_varint()? as usize;
        let b = r.read_varint()? as usize;
        let order_tag = r.take(1)?[0];
        if a >= natoms || b >= natoms || a == b {
            return Err(ToolkitError::Pickle("bond endpoint out of range".to_string()));
        }
        let order = BondOrder::from_tag(order_tag)
            .ok_or_else(|| ToolkitError::Pickle(format!("unknown bond order tag {}", order_tag)))?;
        bonds.push(Bond { a, b, order });
    }

    if r.pos != blob.len() {
        return Err(ToolkitError::Pickle("trailing bytes after molecule records".to_string()));
    }

    Ok(Molecule::assemble(atoms, bonds, pattern))
}

fn write_varint(buf: &mut Vec<u8>, mut v: u64) {
    while v >= 0x80 {
        buf.push((v as u8 & 0x7F) | 0x80);
        v >>= 7;
    }
    buf.push(v as u8);
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], ToolkitError> {
        if self.pos + n > self.buf.len() {
            return Err(ToolkitError::Pickle("truncated pickle".to_string()));
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn read_varint(&mut self) -> Result<u64, ToolkitError> {
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = self.take(1)?[0];
            if shift >= 63 && byte > 1 {
                return Err(ToolkitError::Pickle("varint overflow".to_string()));
            }
            value |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }
}
