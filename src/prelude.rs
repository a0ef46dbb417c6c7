//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the
//! setsuzoku crate, so a single glob import covers building workflows,
//! declaring steps and inspecting terminals.
//!
//! # Example
//!
//! ```rust
//! use setsuzoku::prelude::*;
//!
//! let mut workflow = Workflow::new();
//! let step = workflow.add_step(
//!     StepDefinition::new().with_input(InputDefinition::data("input1", &["data"])),
//! );
//! let input = TerminalKey::input(step, "input1");
//! assert!(workflow.terminal(&input).is_some());
//! ```

// Step graph and engine
pub use crate::workflow::{ConnectionAcceptable, Step, StepId, Workflow, WorkflowBuilder};

// Terminals and connectors
pub use crate::connector::{Connector, ConnectorId, ConnectorState};
pub use crate::terminal::{MappingChange, Side, Terminal, TerminalKey, TerminalKind};

// Collection descriptors
pub use crate::collection::{CollectionType, CollectionTypeDescription};

// Field data
pub use crate::definition::{
    InputDefinition, IntoStep, OutputDefinition, PostJobAction, StepDefinition,
};

// Datatypes
pub use crate::datatypes::{DatatypeOracle, DatatypesMapping};

// Notifications
pub use crate::events::{ChangeSink, EventLog, WorkflowEvent};

// Error types
pub use crate::error::{DatatypesError, DefinitionError, WorkflowError};
