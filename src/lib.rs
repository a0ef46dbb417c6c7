//! # Setsuzoku - Terminal Compatibility and Map-Over Engine
//!
//! **Setsuzoku** decides which step outputs may feed which step inputs in a
//! workflow editor, and keeps the "map-over" state of every terminal
//! consistent as connections come and go. A step fed a collection where it
//! expects a single dataset runs once per element; the engine tracks that
//! nesting on every terminal it touches.
//!
//! ## Core Workflow
//!
//! The engine is format-agnostic. It operates on a canonical model of step
//! "field data" (declared inputs, outputs and post-job actions):
//!
//! 1.  **Describe Your Datatypes**: Load a [`datatypes::DatatypesMapping`] from JSON, build one in code, or pass any closure implementing [`datatypes::DatatypeOracle`].
//! 2.  **Convert to Field Data**: Implement [`definition::IntoStep`] for your tool or step format, or build [`definition::StepDefinition`] values directly.
//! 3.  **Build a Workflow**: Use [`Workflow::builder`] to choose the oracle and the change sinks, then add steps.
//! 4.  **Connect**: Ask [`Workflow::can_accept`] for an advisory verdict, or call [`Workflow::connect`] which checks and connects in one go. Map-over state propagates automatically, and disconnecting resets it.
//!
//! ## Quick Start
//!
//! ```rust
//! use setsuzoku::prelude::*;
//!
//! let datatypes = DatatypesMapping::new()
//!     .with_datatype("data", "galaxy.datatypes.data.Data", &[])
//!     .with_datatype("txt", "galaxy.datatypes.data.Text", &["galaxy.datatypes.data.Data"])
//!     .with_datatype(
//!         "tabular",
//!         "galaxy.datatypes.tabular.Tabular",
//!         &["galaxy.datatypes.data.Text", "galaxy.datatypes.data.Data"],
//!     );
//! let log = EventLog::new();
//! let mut workflow = Workflow::builder()
//!     .with_datatypes(datatypes)
//!     .with_sink(log.clone())
//!     .build();
//!
//! let source = workflow.add_step(
//!     StepDefinition::new()
//!         .with_output(OutputDefinition::collection("output", &["tabular"], "list")),
//! );
//! let cat = workflow.add_step(
//!     StepDefinition::new()
//!         .with_input(InputDefinition::data("input1", &["txt"]))
//!         .with_output(OutputDefinition::data("out_file1", &["txt"])),
//! );
//!
//! let output = TerminalKey::output(source, "output");
//! let input = TerminalKey::input(cat, "input1");
//! assert!(workflow.can_accept(&input, &output)?.can_accept);
//!
//! // Feeding a list into a dataset input maps the step over the list.
//! let connector = workflow.connect(&output, &input)?;
//! let out_file = TerminalKey::output(cat, "out_file1");
//! assert_eq!(
//!     workflow.terminal(&out_file).map(|t| t.map_over().clone()),
//!     Some(CollectionTypeDescription::list())
//! );
//!
//! // Disconnecting resets the mapping.
//! workflow.destroy_connector(connector)?;
//! assert!(!workflow.terminal(&input).is_some_and(|t| t.is_mapped_over()));
//! assert!(!log.map_over_changes().is_empty());
//! # Ok::<(), setsuzoku::error::WorkflowError>(())
//! ```

pub mod collection;
pub mod connector;
pub mod datatypes;
pub mod definition;
pub mod error;
pub mod events;
pub mod prelude;
pub mod terminal;
pub mod workflow;

pub use workflow::{Workflow, WorkflowBuilder};
