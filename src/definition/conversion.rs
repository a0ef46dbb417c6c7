use super::step::StepDefinition;
use crate::error::DefinitionError;

/// A trait for custom step formats that can be converted into a `StepDefinition`.
///
/// Tool forms, stored workflows and test fixtures all describe step inputs
/// and outputs differently; implementing this trait is the single place a
/// format is translated into the field data the engine builds terminals from.
///
/// # Example
///
/// ```rust
/// use setsuzoku::definition::{InputDefinition, IntoStep, OutputDefinition, StepDefinition};
/// use setsuzoku::error::DefinitionError;
///
/// struct CatTool {
///     formats: Vec<String>,
/// }
///
/// impl IntoStep for CatTool {
///     fn into_step(self) -> Result<StepDefinition, DefinitionError> {
///         if self.formats.is_empty() {
///             return Err(DefinitionError::ValidationError("no formats".to_string()));
///         }
///         let formats: Vec<&str> = self.formats.iter().map(String::as_str).collect();
///         Ok(StepDefinition::new()
///             .with_input(InputDefinition::data("input1", &formats))
///             .with_output(OutputDefinition::data("out_file1", &formats)))
///     }
/// }
///
/// let step = CatTool { formats: vec!["txt".to_string()] }.into_step().unwrap();
/// assert_eq!(step.inputs[0].name, "input1");
/// ```
pub trait IntoStep {
    /// Consumes the object and converts it into step field data.
    fn into_step(self) -> Result<StepDefinition, DefinitionError>;
}

impl IntoStep for StepDefinition {
    fn into_step(self) -> Result<StepDefinition, DefinitionError> {
        Ok(self)
    }
}
