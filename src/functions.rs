//! The scalar functions exposed to the host engine.
//!
//! Each function is a linear pipeline: verify argument types, decode the
//! arguments, run one toolkit or codec step, encode the result. All
//! intermediates (molecules, bit vectors, buffers) are owned by the pipeline
//! frame and dropped on every exit path, success or failure. Structurally
//! identical pipelines are shared: the registry maps each function name to a
//! small operation descriptor instead of duplicating the pipeline per
//! algorithm.

use std::cmp::Ordering;

use crate::bitstring::{self, BitString};
use crate::compare;
use crate::error::{ChemError, Result};
use crate::fingerprint::{self, FingerprintKind};
use crate::mol;
use crate::similarity;
use crate::toolkit::Molecule;
use crate::value::Value;

/// The shared pipeline shapes behind the scalar functions.
enum Operation {
    /// text notation -> structure pickle
    MolFromText { as_pattern: bool },
    /// structure pickle -> canonical text
    MolToText { as_pattern: bool },
    /// structure pickle -> double descriptor
    MolDouble(fn(&Molecule) -> f64),
    /// structure pickle -> integer descriptor
    MolInt(fn(&Molecule) -> i64),
    /// two structure pickles -> integer verdict
    MolPairInt(fn(&Molecule, &Molecule) -> i64),
    /// structure pickle -> packed fingerprint, fixed algorithm
    MolBfp(FingerprintKind),
    /// structure pickle + radius -> packed fingerprint, circular family
    MolBfpRadius(fn(i64) -> FingerprintKind),
    /// two packed fingerprints -> similarity score
    BfpSimilarity(fn(&BitString, &BitString) -> Result<f64>),
    /// packed fingerprint -> integer property
    BfpInt(fn(&BitString) -> i64),
    /// length + byte value -> uniform fixture blob
    BfpUniform,
}

/// One host-callable scalar function.
pub struct ScalarFunction {
    /// Registered name.
    pub name: &'static str,
    /// Fixed argument count.
    pub arity: usize,
    op: Operation,
}

impl ScalarFunction {
    /// Run this function over host values.
    pub fn invoke(&self, args: &[Value]) -> Result<Value> {
        if args.len() != self.arity {
            return Err(ChemError::TypeMismatch("argument count"));
        }
        run(&self.op, args)
    }
}

fn run(op: &Operation, args: &[Value]) -> Result<Value> {
    match *op {
        Operation::MolFromText { as_pattern } => {
            let text = args[0].as_text()?;
            Ok(Value::Blob(mol::text_to_blob(text, as_pattern)?))
        }
        Operation::MolToText { as_pattern } => {
            let blob = args[0].as_blob()?;
            Ok(Value::Text(mol::blob_to_text(blob, as_pattern)?))
        }
        Operation::MolDouble(f) => {
            let m = mol::decode(args[0].as_blob()?)?;
            Ok(Value::Double(f(&m)))
        }
        Operation::MolInt(f) => {
            let m = mol::decode(args[0].as_blob()?)?;
            Ok(Value::Integer(f(&m)))
        }
        Operation::MolPairInt(f) => {
            let first = args[0].as_blob()?;
            let second = args[1].as_blob()?;
            let a = mol::decode(first)?;
            let b = mol::decode(second)?;
            Ok(Value::Integer(f(&a, &b)))
        }
        Operation::MolBfp(kind) => {
            let m = mol::decode(args[0].as_blob()?)?;
            let fp = fingerprint::generate(&m, kind)?;
            Ok(Value::Blob(fp.pack()?))
        }
        Operation::MolBfpRadius(make_kind) => {
            let blob = args[0].as_blob()?;
            let radius = args[1].as_integer()?;
            let m = mol::decode(blob)?;
            let fp = fingerprint::generate(&m, make_kind(radius))?;
            Ok(Value::Blob(fp.pack()?))
        }
        Operation::BfpSimilarity(metric) => {
            let first = args[0].as_blob()?;
            let second = args[1].as_blob()?;
            let a = BitString::from_blob(first)?;
            let b = BitString::from_blob(second)?;
            // Length gate before the metric runs; the metric itself keeps a
            // second gate for direct library callers.
            if a.len() != b.len() {
                return Err(ChemError::LengthMismatch(a.len(), b.len()));
            }
            Ok(Value::Double(metric(&a, &b)?))
        }
        Operation::BfpInt(f) => {
            let fp = BitString::from_blob(args[0].as_blob()?)?;
            Ok(Value::Integer(f(&fp)))
        }
        Operation::BfpUniform => {
            let len = args[0].as_integer()?;
            let byte_value = args[1].as_integer()?;
            Ok(Value::Blob(bitstring::make_uniform(len, byte_value)?))
        }
    }
}

// Integer adapters for the pair operations.

fn is_substruct_verdict(a: &Molecule, b: &Molecule) -> i64 {
    // First argument is the molecule, second the pattern it may contain.
    i64::from(compare::is_superstructure(a, b))
}

fn is_superstruct_verdict(a: &Molecule, b: &Molecule) -> i64 {
    i64::from(compare::is_substructure(a, b))
}

fn cmp_verdict(a: &Molecule, b: &Molecule) -> i64 {
    match compare::compare(a, b) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

fn bfp_length(fp: &BitString) -> i64 {
    fp.len() as i64
}

fn bfp_weight(fp: &BitString) -> i64 {
    i64::from(fp.weight())
}

fn morgan_kind(radius: i64) -> FingerprintKind {
    FingerprintKind::Morgan { radius }
}

fn feature_morgan_kind(radius: i64) -> FingerprintKind {
    FingerprintKind::FeatureMorgan { radius }
}

/// Every scalar function exposed to the host, in registration order.
static FUNCTIONS: &[ScalarFunction] = &[
    // Structure conversion.
    ScalarFunction {
        name: "mol_from_smiles",
        arity: 1,
        op: Operation::MolFromText { as_pattern: false },
    },
    ScalarFunction {
        name: "mol_from_smarts",
        arity: 1,
        op: Operation::MolFromText { as_pattern: true },
    },
    ScalarFunction {
        name: "mol_to_smiles",
        arity: 1,
        op: Operation::MolToText { as_pattern: false },
    },
    ScalarFunction {
        name: "mol_to_smarts",
        arity: 1,
        op: Operation::MolToText { as_pattern: true },
    },
    // Descriptors.
    ScalarFunction { name: "mol_mw", arity: 1, op: Operation::MolDouble(compare::mw) },
    ScalarFunction { name: "mol_tpsa", arity: 1, op: Operation::MolDouble(compare::tpsa) },
    ScalarFunction { name: "mol_logp", arity: 1, op: Operation::MolDouble(compare::logp) },
    ScalarFunction { name: "mol_hba", arity: 1, op: Operation::MolInt(compare::hba) },
    ScalarFunction { name: "mol_hbd", arity: 1, op: Operation::MolInt(compare::hbd) },
    ScalarFunction {
        name: "mol_num_rotatable_bnds",
        arity: 1,
        op: Operation::MolInt(compare::num_rotatable_bonds),
    },
    ScalarFunction {
        name: "mol_num_hetatms",
        arity: 1,
        op: Operation::MolInt(compare::num_heteroatoms),
    },
    ScalarFunction { name: "mol_num_rings", arity: 1, op: Operation::MolInt(compare::num_rings) },
    ScalarFunction { name: "mol_num_atms", arity: 1, op: Operation::MolInt(compare::num_atoms) },
    ScalarFunction {
        name: "mol_num_hvyatms",
        arity: 1,
        op: Operation::MolInt(compare::num_heavy_atoms),
    },
    ScalarFunction { name: "mol_chi0v", arity: 1, op: Operation::MolDouble(compare::chi0v) },
    ScalarFunction { name: "mol_chi1v", arity: 1, op: Operation::MolDouble(compare::chi1v) },
    ScalarFunction { name: "mol_chi2v", arity: 1, op: Operation::MolDouble(compare::chi2v) },
    ScalarFunction { name: "mol_chi0n", arity: 1, op: Operation::MolDouble(compare::chi0n) },
    ScalarFunction { name: "mol_chi1n", arity: 1, op: Operation::MolDouble(compare::chi1n) },
    ScalarFunction { name: "mol_chi2n", arity: 1, op: Operation::MolDouble(compare::chi2n) },
    ScalarFunction { name: "mol_kappa1", arity: 1, op: Operation::MolDouble(compare::kappa1) },
    ScalarFunction { name: "mol_kappa2", arity: 1, op: Operation::MolDouble(compare::kappa2) },
    ScalarFunction { name: "mol_kappa3", arity: 1, op: Operation::MolDouble(compare::kappa3) },
    // Comparison.
    ScalarFunction {
        name: "mol_is_substruct",
        arity: 2,
        op: Operation::MolPairInt(is_substruct_verdict),
    },
    ScalarFunction {
        name: "mol_is_superstruct",
        arity: 2,
        op: Operation::MolPairInt(is_superstruct_verdict),
    },
    ScalarFunction { name: "mol_cmp", arity: 2, op: Operation::MolPairInt(cmp_verdict) },
    // Fingerprint generation.
    ScalarFunction {
        name: "mol_layered_bfp",
        arity: 1,
        op: Operation::MolBfp(FingerprintKind::Layered),
    },
    ScalarFunction {
        name: "mol_path_bfp",
        arity: 1,
        op: Operation::MolBfp(FingerprintKind::Path),
    },
    ScalarFunction {
        name: "mol_atom_pairs_bfp",
        arity: 1,
        op: Operation::MolBfp(FingerprintKind::AtomPairs),
    },
    ScalarFunction {
        name: "mol_topological_torsion_bfp",
        arity: 1,
        op: Operation::MolBfp(FingerprintKind::TopologicalTorsion),
    },
    ScalarFunction {
        name: "mol_maccs_bfp",
        arity: 1,
        op: Operation::MolBfp(FingerprintKind::Maccs),
    },
    ScalarFunction {
        name: "mol_morgan_bfp",
        arity: 2,
        op: Operation::MolBfpRadius(morgan_kind),
    },
    ScalarFunction {
        name: "mol_feat_morgan_bfp",
        arity: 2,
        op: Operation::MolBfpRadius(feature_morgan_kind),
    },
    ScalarFunction {
        name: "mol_bfp_signature",
        arity: 1,
        op: Operation::MolBfp(FingerprintKind::Signature),
    },
    // Fingerprint similarity and properties.
    ScalarFunction {
        name: "bfp_tanimoto",
        arity: 2,
        op: Operation::BfpSimilarity(similarity::tanimoto),
    },
    ScalarFunction {
        name: "bfp_dice",
        arity: 2,
        op: Operation::BfpSimilarity(similarity::dice),
    },
    ScalarFunction { name: "bfp_length", arity: 1, op: Operation::BfpInt(bfp_length) },
    ScalarFunction { name: "bfp_weight", arity: 1, op: Operation::BfpInt(bfp_weight) },
    ScalarFunction { name: "bfp_dummy", arity: 2, op: Operation::BfpUniform },
];

/// The full registry, in registration order, for host adapters to walk.
pub fn functions() -> &'static [ScalarFunction] {
    FUNCTIONS
}

/// Look up a scalar function by name.
pub fn find(name: &str) -> Option<&'static ScalarFunction> {
    FUNCTIONS.iter().find(|f| f.name == name)
}

/// Invoke a scalar function by name.
///
/// Unknown names and wrong argument counts are host-level misuse and report
/// as `TypeMismatch`.
pub fn invoke(name: &str, args: &[Value]) -> Result<Value> {
    let function = find(name).ok_or(ChemError::TypeMismatch("registered function name"))?;
    function.invoke(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob_of(text: &str) -> Value {
        invoke("mol_from_smiles", &[Value::Text(text.to_string())]).unwrap()
    }

    #[test]
    fn conversion_functions_round_trip() {
        let blob = blob_of("CCO");
        let text = invoke("mol_to_smiles", &[blob.clone()]).unwrap();
        let Value::Text(smiles) = text else { panic!("expected text") };
        let again = invoke("mol_from_smiles", &[Value::Text(smiles)]).unwrap();
        assert_eq!(blob, again);
    }

    #[test]
    fn descriptor_functions_produce_scalars() {
        let blob = blob_of("CCO");
        let mw = invoke("mol_mw", &[blob.clone()]).unwrap();
        assert!(matches!(mw, Value::Double(v) if v > 46.0 && v < 46.2));
        let hba = invoke("mol_hba", &[blob.clone()]).unwrap();
        assert_eq!(hba, Value::Integer(1));
        let atoms = invoke("mol_num_atms", &[blob]).unwrap();
        assert_eq!(atoms, Value::Integer(9));
    }

    #[test]
    fn fingerprint_functions_emit_packed_blobs() {
        let blob = blob_of("CC(=O)Oc1ccccc1C(=O)O");
        let fp = invoke("mol_layered_bfp", &[blob.clone()]).unwrap();
        let Value::Blob(bytes) = fp else { panic!("expected blob") };
        assert_eq!(bytes.len(), 1024 / 8);

        let fp = invoke("mol_morgan_bfp", &[blob.clone(), Value::Integer(2)]).unwrap();
        let Value::Blob(bytes) = fp else { panic!("expected blob") };
        assert_eq!(bytes.len(), 1024 / 8);

        let fp = invoke("mol_maccs_bfp", &[blob]).unwrap();
        let Value::Blob(bytes) = fp else { panic!("expected blob") };
        assert_eq!(bytes.len(), 21);
    }

    #[test]
    fn similarity_functions_score_blobs() {
        let a = blob_of("CCO");
        let fp_a = invoke("mol_morgan_bfp", &[a.clone(), Value::Integer(2)]).unwrap();
        let fp_b = invoke("mol_morgan_bfp", &[a, Value::Integer(2)]).unwrap();
        let score = invoke("bfp_tanimoto", &[fp_a.clone(), fp_b]).unwrap();
        assert_eq!(score, Value::Double(1.0));

        let weight = invoke("bfp_weight", &[fp_a.clone()]).unwrap();
        assert!(matches!(weight, Value::Integer(w) if w > 0));
        let length = invoke("bfp_length", &[fp_a]).unwrap();
        assert_eq!(length, Value::Integer(1024));
    }

    #[test]
    fn mismatched_lengths_error_out() {
        let mol = blob_of("CCO");
        let wide = invoke("mol_path_bfp", &[mol.clone()]).unwrap();
        let narrow = invoke("mol_morgan_bfp", &[mol, Value::Integer(2)]).unwrap();
        let err = invoke("bfp_tanimoto", &[wide, narrow]).unwrap_err();
        assert!(matches!(err, ChemError::LengthMismatch(2048, 1024)));
    }

    #[test]
    fn type_checks_run_before_decoding() {
        // A text value where a blob is required: no decode is attempted.
        let err = invoke("mol_mw", &[Value::Text("CCO".into())]).unwrap_err();
        assert!(matches!(err, ChemError::TypeMismatch("blob")));
        // Wrong second argument type on a radius function.
        let blob = blob_of("CCO");
        let err = invoke("mol_morgan_bfp", &[blob, Value::Text("2".into())]).unwrap_err();
        assert!(matches!(err, ChemError::TypeMismatch("integer")));
        // Wrong arity.
        let err = invoke("mol_mw", &[]).unwrap_err();
        assert!(matches!(err, ChemError::TypeMismatch(_)));
        // Unknown name.
        let err = invoke("mol_unknown", &[]).unwrap_err();
        assert!(matches!(err, ChemError::TypeMismatch(_)));
    }

    #[test]
    fn substructure_functions_mirror_each_other() {
        let aspirin = blob_of("CC(=O)Oc1ccccc1C(=O)O");
        let benzene = blob_of("c1ccccc1");
        let contains =
            invoke("mol_is_substruct", &[aspirin.clone(), benzene.clone()]).unwrap();
        assert_eq!(contains, Value::Integer(1));
        let contained =
            invoke("mol_is_superstruct", &[benzene.clone(), aspirin.clone()]).unwrap();
        assert_eq!(contained, Value::Integer(1));
        let reverse = invoke("mol_is_substruct", &[benzene, aspirin]).unwrap();
        assert_eq!(reverse, Value::Integer(0));
    }

    #[test]
    fn dummy_fixture_builds_uniform_blobs() {
        let blob = invoke("bfp_dummy", &[Value::Integer(4), Value::Integer(255)]).unwrap();
        assert_eq!(blob, Value::Blob(vec![0xFF; 4]));
        let weight = invoke("bfp_weight", &[blob.clone()]).unwrap();
        assert_eq!(weight, Value::Integer(32));
        let length = invoke("bfp_length", &[blob]).unwrap();
        assert_eq!(length, Value::Integer(32));

        // Length clamps up from zero.
        let blob = invoke("bfp_dummy", &[Value::Integer(0), Value::Integer(10)]).unwrap();
        assert_eq!(blob, Value::Blob(vec![10]));
    }

    #[test]
    fn registry_names_are_unique() {
        let mut names: Vec<&str> = functions().iter().map(|f| f.name).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }
}
