//! Datatype compatibility.
//!
//! The engine never computes the datatype hierarchy itself. It asks a
//! [`DatatypeOracle`] whether one extension is a subtype of another and
//! layers the pass-through rules on top in [`satisfies`].

pub mod mapping;

pub use mapping::*;

/// An input accepting this extension accepts any output datatype.
pub const PASS_THROUGH_EXTENSION: &str = "input";

/// Output extensions that are accepted by any data input.
pub const PASS_THROUGH_OUTPUT_EXTENSIONS: [&str; 3] = ["input", "_sniff_", "input_collection"];

/// Answers "is `candidate` a subtype of `required`" for datatype extensions.
pub trait DatatypeOracle {
    fn is_subtype(&self, candidate: &str, required: &str) -> bool;
}

impl<F> DatatypeOracle for F
where
    F: Fn(&str, &str) -> bool,
{
    fn is_subtype(&self, candidate: &str, required: &str) -> bool {
        self(candidate, required)
    }
}

/// True if an output producing `candidate` may feed an input requiring `required`.
///
/// Identity always matches, even for extensions the oracle does not know;
/// otherwise unknown extensions fail closed.
pub fn satisfies(oracle: &dyn DatatypeOracle, candidate: &str, required: &str) -> bool {
    required == PASS_THROUGH_EXTENSION
        || PASS_THROUGH_OUTPUT_EXTENSIONS.contains(&candidate)
        || candidate == required
        || oracle.is_subtype(candidate, required)
}
