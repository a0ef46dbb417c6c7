use crate::collection::CollectionTypeDescription;
use crate::connector::ConnectorId;
use crate::terminal::{Side, TerminalKey};
use crate::workflow::StepId;
use thiserror::Error;

/// Errors raised while mutating or querying a workflow's step graph.
///
/// A refused connection check is not an error: `attachable` and
/// `can_accept` report it as a `ConnectionAcceptable` value. These variants
/// cover lookups of things that do not exist and requests that bypass the
/// checks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Step '{0}' not found in the workflow")]
    StepNotFound(StepId),

    #[error("No {side} terminal named '{name}' on step '{step}'")]
    TerminalNotFound {
        step: StepId,
        side: Side,
        name: String,
    },

    #[error("Connector '{0}' not found")]
    ConnectorNotFound(ConnectorId),

    #[error("The {terminal} cannot be used as {expected}")]
    WrongTerminalSide {
        terminal: TerminalKey,
        expected: &'static str,
    },

    #[error("Connection from the {output} to the {input} was refused: {reason}")]
    InvalidConnection {
        output: TerminalKey,
        input: TerminalKey,
        reason: String,
    },

    #[error("Cannot map the {terminal} over {requested}: {reason}")]
    InconsistentMapOver {
        terminal: TerminalKey,
        requested: CollectionTypeDescription,
        reason: String,
    },
}

/// Errors that can occur while loading a datatypes mapping table.
#[derive(Error, Debug, Clone)]
pub enum DatatypesError {
    #[error("Failed to parse datatypes mapping JSON: {0}")]
    JsonParseError(String),

    #[error("Could not read datatypes mapping file '{path}': {message}")]
    Io { path: String, message: String },
}

/// Errors that can occur when converting a custom step format into a `StepDefinition`.
#[derive(Error, Debug, Clone)]
pub enum DefinitionError {
    #[error("Invalid custom step data: {0}")]
    ValidationError(String),
}
