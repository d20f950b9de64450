#![warn(missing_docs)]
//! molsim — chemical structure and fingerprint storage primitives for host
//! database engines.
//!
//! This crate lets a host engine store molecules and their derived binary
//! fingerprints as opaque blobs and query them by similarity through scalar
//! functions:
//!
//! - **structure codec** — SMILES/SMARTS text, an opaque binary pickle, and
//!   an in-memory molecule convert in every direction
//! - **fingerprints** — layered, path, atom-pair, topological-torsion,
//!   MACCS, Morgan/feature-Morgan and substructure-screening bit vectors,
//!   packed into a stable LSB-first wire format
//! - **similarity** — Tanimoto and Dice coefficients over equal-length
//!   fingerprints
//! - **descriptors & ordering** — physicochemical descriptors and a sorting
//!   comparator computed directly from parsed structures
//! - **scalar function registry** — every operation exposed as a typed,
//!   name-keyed callable with a closed error taxonomy, for a host adapter to
//!   register
//!
//! Every call is self-contained: no state is shared between calls and every
//! intermediate is released when the call returns, so hosts may invoke the
//! functions from many threads at once.
//!
//! # Quick examples
//!
//! ### Through the host-facing function registry
//! ```
//! use molsim::{invoke, Value};
//!
//! let blob = invoke("mol_from_smiles", &[Value::Text("CCO".into())])?;
//! let fp = invoke("mol_morgan_bfp", &[blob.clone(), Value::Integer(2)])?;
//! let fp2 = invoke("mol_morgan_bfp", &[blob, Value::Integer(2)])?;
//! let score = invoke("bfp_tanimoto", &[fp, fp2])?;
//! assert_eq!(score, Value::Double(1.0));
//! # Ok::<(), molsim::ChemError>(())
//! ```
//!
//! ### Through the library API
//! ```
//! use molsim::fingerprint::{generate, FingerprintKind};
//! use molsim::{mol, similarity};
//!
//! let aspirin = mol::parse("CC(=O)Oc1ccccc1C(=O)O", false)?;
//! let fp = generate(&aspirin, FingerprintKind::Morgan { radius: 2 })?;
//! assert_eq!(similarity::tanimoto(&fp, &fp)?, 1.0);
//! # Ok::<(), molsim::ChemError>(())
//! ```

pub mod bitstring;
pub mod compare;
pub mod error;
pub mod fingerprint;
pub mod functions;
pub mod mol;
pub mod similarity;
pub mod toolkit;
pub mod value;

// ---------------------------------------------------------------------------
// Convenience re-exports
// ---------------------------------------------------------------------------
pub use bitstring::{make_uniform, BitString};
pub use error::{ChemError, Result};
pub use fingerprint::FingerprintKind;
pub use functions::{find, functions, invoke, ScalarFunction};
pub use toolkit::Molecule;
pub use value::Value;
