//! Connection endpoints on workflow steps.
//!
//! A [`Terminal`] is one declared input or output of a step. All variants
//! share the same bookkeeping (datatypes, connectors, map-over state); the
//! variant-specific data lives in [`TerminalKind`].

use crate::collection::CollectionTypeDescription;
use crate::connector::ConnectorId;
use crate::definition::{InputDefinition, OutputDefinition};
use crate::workflow::StepId;
use std::fmt;

mod mapping;

pub use mapping::*;

/// Which side of a step a terminal sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Input,
    Output,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Input => write!(f, "input"),
            Side::Output => write!(f, "output"),
        }
    }
}

/// Arena key of a terminal: owning step, side and declared name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TerminalKey {
    pub step: StepId,
    pub side: Side,
    pub name: String,
}

impl TerminalKey {
    pub fn input(step: StepId, name: &str) -> Self {
        Self {
            step,
            side: Side::Input,
            name: name.to_string(),
        }
    }

    pub fn output(step: StepId, name: &str) -> Self {
        Self {
            step,
            side: Side::Output,
            name: name.to_string(),
        }
    }
}

impl fmt::Display for TerminalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' of step {}", self.side, self.name, self.step)
    }
}

/// The closed set of terminal variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalKind {
    /// A dataset input; `multiple` inputs accept repeated connections.
    Input { multiple: bool },
    InputParameter {
        parameter_type: String,
        optional: bool,
    },
    /// A collection input. `Any` stands in when no types were declared.
    InputCollection {
        collection_types: Vec<CollectionTypeDescription>,
    },
    Output,
    OutputCollection {
        collection_type: CollectionTypeDescription,
    },
    OutputParameter { parameter_type: String },
}

impl TerminalKind {
    pub fn side(&self) -> Side {
        match self {
            TerminalKind::Input { .. }
            | TerminalKind::InputParameter { .. }
            | TerminalKind::InputCollection { .. } => Side::Input,
            TerminalKind::Output
            | TerminalKind::OutputCollection { .. }
            | TerminalKind::OutputParameter { .. } => Side::Output,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TerminalKind::Input { .. } => "data input",
            TerminalKind::InputParameter { .. } => "parameter input",
            TerminalKind::InputCollection { .. } => "collection input",
            TerminalKind::Output => "data output",
            TerminalKind::OutputCollection { .. } => "collection output",
            TerminalKind::OutputParameter { .. } => "parameter output",
        }
    }

    /// True if both kinds are the same variant, regardless of their fields.
    pub fn same_variant(&self, other: &TerminalKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    fn from_input(input: &InputDefinition) -> Self {
        if input.is_collection() {
            let collection_types = match &input.collection_types {
                Some(types) if !types.is_empty() => types
                    .iter()
                    .map(|t| CollectionTypeDescription::new(t))
                    .collect(),
                _ => vec![CollectionTypeDescription::Any],
            };
            TerminalKind::InputCollection { collection_types }
        } else if input.is_parameter() {
            TerminalKind::InputParameter {
                parameter_type: input
                    .parameter_type
                    .clone()
                    .unwrap_or_else(|| "text".to_string()),
                optional: input.optional,
            }
        } else {
            TerminalKind::Input {
                multiple: input.multiple,
            }
        }
    }

    fn from_output(output: &OutputDefinition) -> Self {
        if output.parameter {
            TerminalKind::OutputParameter {
                parameter_type: output
                    .parameter_type
                    .clone()
                    .unwrap_or_else(|| "text".to_string()),
            }
        } else if output.collection {
            let collection_type = output
                .collection_type
                .as_deref()
                .map(CollectionTypeDescription::new)
                .filter(CollectionTypeDescription::is_collection)
                .unwrap_or(CollectionTypeDescription::Any);
            TerminalKind::OutputCollection { collection_type }
        } else {
            TerminalKind::Output
        }
    }
}

/// A typed connection point on a step.
#[derive(Debug, Clone)]
pub struct Terminal {
    key: TerminalKey,
    datatypes: Vec<String>,
    kind: TerminalKind,
    connectors: Vec<ConnectorId>,
    mapping: TerminalMapping,
}

impl Terminal {
    pub(crate) fn from_input(step: StepId, input: &InputDefinition) -> Self {
        let key = TerminalKey::input(step, &input.name);
        Self {
            mapping: TerminalMapping::new(key.clone()),
            key,
            datatypes: input.extensions.clone(),
            kind: TerminalKind::from_input(input),
            connectors: Vec::new(),
        }
    }

    pub(crate) fn from_output(step: StepId, output: &OutputDefinition) -> Self {
        let key = TerminalKey::output(step, &output.name);
        Self {
            mapping: TerminalMapping::new(key.clone()),
            key,
            datatypes: output.extensions.clone(),
            kind: TerminalKind::from_output(output),
            connectors: Vec::new(),
        }
    }

    /// Kind this input definition would produce, used to decide between an
    /// in-place update and a rebuild.
    pub(crate) fn input_kind(input: &InputDefinition) -> TerminalKind {
        TerminalKind::from_input(input)
    }

    pub(crate) fn output_kind(output: &OutputDefinition) -> TerminalKind {
        TerminalKind::from_output(output)
    }

    /// Refreshes declared attributes while keeping connectors and mapping.
    pub(crate) fn update_input(&mut self, input: &InputDefinition) {
        self.datatypes = input.extensions.clone();
        self.kind = TerminalKind::from_input(input);
    }

    pub(crate) fn update_output(&mut self, output: &OutputDefinition) {
        self.datatypes = output.extensions.clone();
        self.kind = TerminalKind::from_output(output);
    }

    pub fn key(&self) -> &TerminalKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn step(&self) -> StepId {
        self.key.step
    }

    pub fn side(&self) -> Side {
        self.key.side
    }

    pub fn kind(&self) -> &TerminalKind {
        &self.kind
    }

    pub fn datatypes(&self) -> &[String] {
        &self.datatypes
    }

    /// Connectors in connection order.
    pub fn connectors(&self) -> &[ConnectorId] {
        &self.connectors
    }

    pub fn is_connected(&self) -> bool {
        !self.connectors.is_empty()
    }

    pub fn mapping(&self) -> &TerminalMapping {
        &self.mapping
    }

    pub fn map_over(&self) -> &CollectionTypeDescription {
        self.mapping.map_over()
    }

    pub fn is_mapped_over(&self) -> bool {
        self.map_over().is_collection()
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self.kind, TerminalKind::Input { multiple: true })
    }

    pub fn is_parameter(&self) -> bool {
        matches!(
            self.kind,
            TerminalKind::InputParameter { .. } | TerminalKind::OutputParameter { .. }
        )
    }

    /// True if this terminal's map-over makes its step run once per element.
    ///
    /// A multiple input holding a collection consumes it as one batch, so
    /// its recorded map-over does not map the step.
    pub fn drives_step_mapping(&self) -> bool {
        self.side() == Side::Input && self.is_mapped_over() && !self.is_multiple()
    }

    /// The collection type this terminal declares on its own, ignoring map-over.
    pub fn own_collection_type(&self) -> CollectionTypeDescription {
        match &self.kind {
            TerminalKind::OutputCollection { collection_type } => collection_type.clone(),
            _ => CollectionTypeDescription::Null,
        }
    }

    /// The shape an output actually emits: its declared collection type
    /// nested inside its current map-over.
    pub fn effective_collection_type(&self) -> CollectionTypeDescription {
        self.map_over().append(&self.own_collection_type())
    }

    /// Collection types a collection input accepts once its own map-over is
    /// taken into account. Empty for every other kind.
    pub fn effective_collection_types(&self) -> Vec<CollectionTypeDescription> {
        match &self.kind {
            TerminalKind::InputCollection { collection_types } => collection_types
                .iter()
                .map(|t| self.map_over().append(t))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub(crate) fn attach(&mut self, connector: ConnectorId) {
        self.connectors.push(connector);
    }

    /// Removes `connector` by identity. Returns false if it was not registered.
    pub(crate) fn detach(&mut self, connector: ConnectorId) -> bool {
        match self.connectors.iter().position(|c| *c == connector) {
            Some(index) => {
                self.connectors.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn mapping_mut(&mut self) -> &mut TerminalMapping {
        &mut self.mapping
    }
}
