//! The structure codec: text, handle and pickle conversions.
//!
//! Thin boundary adapters over the toolkit's parser, writer and pickle
//! codec. Every toolkit failure is caught here and mapped onto the closed
//! host-visible taxonomy; composite conversions release their intermediate
//! molecule on both the success and the failure path (ownership guarantees
//! the release in either case).

use crate::error::{ChemError, Result};
use crate::toolkit::{pickle, smiles, Molecule};

/// Parse a textual notation into a molecule.
///
/// `as_pattern` selects the query-pattern grammar used for substructure
/// searches. Any toolkit rejection surfaces as `ParseError`.
pub fn parse(text: &str, as_pattern: bool) -> Result<Molecule> {
    smiles::parse(text, as_pattern).map_err(|e| ChemError::ParseError(e.to_string()))
}

/// Render a molecule to its canonical text form.
///
/// `as_pattern` renders the pattern-grammar form. Failures surface as
/// `RenderError`.
pub fn print(mol: &Molecule, as_pattern: bool) -> Result<String> {
    smiles::write(mol, as_pattern).map_err(|e| ChemError::RenderError(e.to_string()))
}

/// Reconstruct a molecule from its opaque pickle blob.
///
/// A blob that cannot be decoded is `MalformedInput`.
pub fn decode(blob: &[u8]) -> Result<Molecule> {
    pickle::decode(blob).map_err(|e| ChemError::MalformedInput(e.to_string()))
}

/// Serialize a molecule to its opaque pickle blob.
///
/// Failures surface as `SerializationError`.
pub fn encode(mol: &Molecule) -> Result<Vec<u8>> {
    pickle::encode(mol).map_err(|e| ChemError::SerializationError(e.to_string()))
}

/// Parse a textual notation and serialize it in one step.
pub fn text_to_blob(text: &str, as_pattern: bool) -> Result<Vec<u8>> {
    let mol = parse(text, as_pattern)?;
    encode(&mol)
}

/// Decode a pickle blob and render it as text in one step.
pub fn blob_to_text(blob: &[u8], as_pattern: bool) -> Result<String> {
    let mol = decode(blob)?;
    print(&mol, as_pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trips_through_the_pickle() {
        let blob = text_to_blob("CCO", false).unwrap();
        let text = blob_to_text(&blob, false).unwrap();
        let again = text_to_blob(&text, false).unwrap();
        assert_eq!(blob, again);
    }

    #[test]
    fn parse_failures_map_to_parse_error() {
        assert!(matches!(parse("not a molecule((", false), Err(ChemError::ParseError(_))));
        assert!(matches!(text_to_blob("", false), Err(ChemError::ParseError(_))));
    }

    #[test]
    fn decode_failures_map_to_malformed_input() {
        assert!(matches!(decode(b"garbage"), Err(ChemError::MalformedInput(_))));
        assert!(matches!(
            blob_to_text(&[1, 2, 3], false),
            Err(ChemError::MalformedInput(_))
        ));
    }

    #[test]
    fn patterns_round_trip_with_wildcards() {
        let blob = text_to_blob("c1ccccc1*", true).unwrap();
        let text = blob_to_text(&blob, true).unwrap();
        assert!(text.contains('*'));
    }
}
