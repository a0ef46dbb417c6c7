//! The step graph and the compatibility engine operating on it.
//!
//! A [`Workflow`] is an arena: it owns every [`Step`], each step owns its
//! terminals, and connectors refer to terminals by [`TerminalKey`]. All
//! cross-step work (datatype checks against a producing step's post-job
//! actions, map-over propagation) goes through the workflow, so no terminal
//! ever holds a reference to another.

use crate::connector::{Connector, ConnectorId, ConnectorState};
use crate::datatypes::DatatypeOracle;
use crate::error::WorkflowError;
use crate::events::{ChangeSink, WorkflowEvent};
use crate::terminal::{Side, Terminal, TerminalKey};
use ahash::AHashMap;
use indexmap::IndexMap;

mod attach;
mod builder;
mod connect;
mod field_data;
mod mapping;
mod step;

pub use attach::ConnectionAcceptable;
pub use builder::WorkflowBuilder;
pub use step::{Step, StepId};

pub struct Workflow {
    steps: IndexMap<StepId, Step>,
    /// Every connector ever created. Destroyed ones stay so that
    /// [`Connector::state`] can still report them until
    /// [`Workflow::prune_destroyed_connectors`] evicts them.
    connectors: AHashMap<ConnectorId, Connector>,
    datatypes: Box<dyn DatatypeOracle>,
    sinks: Vec<Box<dyn ChangeSink>>,
    parameter_aliases: AHashMap<String, String>,
    next_step_id: u32,
    next_connector_id: u64,
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new()
    }
}

impl Workflow {
    /// A workflow with the default configuration; see [`Workflow::builder`].
    pub fn new() -> Self {
        WorkflowBuilder::new().build()
    }

    pub fn builder() -> WorkflowBuilder {
        WorkflowBuilder::new()
    }

    pub(crate) fn from_parts(
        datatypes: Box<dyn DatatypeOracle>,
        sinks: Vec<Box<dyn ChangeSink>>,
        parameter_aliases: AHashMap<String, String>,
    ) -> Self {
        Self {
            steps: IndexMap::new(),
            connectors: AHashMap::new(),
            datatypes,
            sinks,
            parameter_aliases,
            next_step_id: 0,
            next_connector_id: 0,
        }
    }

    /// Steps in insertion order.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.values()
    }

    pub fn step(&self, id: StepId) -> Option<&Step> {
        self.steps.get(&id)
    }

    pub fn terminal(&self, key: &TerminalKey) -> Option<&Terminal> {
        self.steps
            .get(&key.step)
            .and_then(|step| step.terminal(key.side, &key.name))
    }

    pub fn connector(&self, id: ConnectorId) -> Option<&Connector> {
        self.connectors.get(&id)
    }

    /// Live connectors, ordered by id.
    pub fn live_connectors(&self) -> Vec<&Connector> {
        let mut live: Vec<&Connector> = self
            .connectors
            .values()
            .filter(|c| c.is_live())
            .collect();
        live.sort_by_key(|c| c.id());
        live
    }

    /// Drops destroyed connectors from the arena. Returns how many were evicted.
    pub fn prune_destroyed_connectors(&mut self) -> usize {
        let before = self.connectors.len();
        self.connectors
            .retain(|_, connector| connector.state() != ConnectorState::Destroyed);
        let pruned = before - self.connectors.len();
        tracing::debug!(pruned, "destroyed connectors pruned");
        pruned
    }

    /// Live connectors joining `output` to `input`.
    pub fn connectors_between(&self, output: &TerminalKey, input: &TerminalKey) -> Vec<ConnectorId> {
        self.terminal(input)
            .map(|terminal| {
                terminal
                    .connectors()
                    .iter()
                    .copied()
                    .filter(|id| self.output_of(*id) == Some(output))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Output terminals feeding `input` through live connectors, in connection order.
    pub fn connected_outputs(&self, input: &TerminalKey) -> Vec<&Terminal> {
        self.terminal(input)
            .map(|terminal| {
                terminal
                    .connectors()
                    .iter()
                    .filter_map(|id| self.output_of(*id))
                    .filter_map(|key| self.terminal(key))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn datatypes(&self) -> &dyn DatatypeOracle {
        self.datatypes.as_ref()
    }

    fn output_of(&self, id: ConnectorId) -> Option<&TerminalKey> {
        self.connectors
            .get(&id)
            .and_then(|c| c.endpoints())
            .map(|(output, _)| output)
    }

    /// The parameter type after alias resolution (`select` reads as `text`).
    pub(crate) fn effective_parameter_type<'a>(&'a self, parameter_type: &'a str) -> &'a str {
        self.parameter_aliases
            .get(parameter_type)
            .map(String::as_str)
            .unwrap_or(parameter_type)
    }

    pub(crate) fn resolve(&self, key: &TerminalKey) -> Result<&Terminal, WorkflowError> {
        let step = self
            .steps
            .get(&key.step)
            .ok_or(WorkflowError::StepNotFound(key.step))?;
        step.terminal(key.side, &key.name)
            .ok_or_else(|| WorkflowError::TerminalNotFound {
                step: key.step,
                side: key.side,
                name: key.name.clone(),
            })
    }

    pub(crate) fn resolve_side(
        &self,
        key: &TerminalKey,
        side: Side,
    ) -> Result<&Terminal, WorkflowError> {
        if key.side != side {
            return Err(WorkflowError::WrongTerminalSide {
                terminal: key.clone(),
                expected: match side {
                    Side::Input => "an input",
                    Side::Output => "an output",
                },
            });
        }
        self.resolve(key)
    }

    pub(crate) fn step_ref(&self, id: StepId) -> Result<&Step, WorkflowError> {
        self.steps.get(&id).ok_or(WorkflowError::StepNotFound(id))
    }

    pub(crate) fn terminal_mut(&mut self, key: &TerminalKey) -> Option<&mut Terminal> {
        self.steps
            .get_mut(&key.step)
            .and_then(|step| step.terminal_mut(key.side, &key.name))
    }

    pub(crate) fn emit(&mut self, event: WorkflowEvent) {
        for sink in self.sinks.iter_mut() {
            sink.notify(&event);
        }
    }

    fn next_connector_id(&mut self) -> ConnectorId {
        let id = ConnectorId(self.next_connector_id);
        self.next_connector_id += 1;
        id
    }
}
