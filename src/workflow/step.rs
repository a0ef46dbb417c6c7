use crate::definition::PostJobAction;
use crate::terminal::{Side, Terminal};
use indexmap::IndexMap;
use std::fmt;

/// Identity of a step within a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepId(pub u32);

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A workflow step and the terminals it owns, in declaration order.
#[derive(Debug, Clone)]
pub struct Step {
    id: StepId,
    label: Option<String>,
    pub(crate) inputs: IndexMap<String, Terminal>,
    pub(crate) outputs: IndexMap<String, Terminal>,
    pub(crate) post_job_actions: Vec<PostJobAction>,
}

impl Step {
    pub(crate) fn new(id: StepId, label: Option<String>) -> Self {
        Self {
            id,
            label,
            inputs: IndexMap::new(),
            outputs: IndexMap::new(),
            post_job_actions: Vec::new(),
        }
    }

    pub fn id(&self) -> StepId {
        self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub(crate) fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    pub fn inputs(&self) -> impl Iterator<Item = &Terminal> {
        self.inputs.values()
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Terminal> {
        self.outputs.values()
    }

    pub fn input(&self, name: &str) -> Option<&Terminal> {
        self.inputs.get(name)
    }

    pub fn output(&self, name: &str) -> Option<&Terminal> {
        self.outputs.get(name)
    }

    pub fn terminal(&self, side: Side, name: &str) -> Option<&Terminal> {
        match side {
            Side::Input => self.inputs.get(name),
            Side::Output => self.outputs.get(name),
        }
    }

    pub(crate) fn terminal_mut(&mut self, side: Side, name: &str) -> Option<&mut Terminal> {
        match side {
            Side::Input => self.inputs.get_mut(name),
            Side::Output => self.outputs.get_mut(name),
        }
    }

    pub fn post_job_actions(&self) -> &[PostJobAction] {
        &self.post_job_actions
    }

    /// The datatype a `ChangeDatatypeAction` assigns to `output_name`, if any.
    pub fn retyped_output(&self, output_name: &str) -> Option<&str> {
        self.post_job_actions
            .iter()
            .find_map(|action| action.retyped_output(output_name))
    }

    pub fn has_connected_output_terminals(&self) -> bool {
        self.outputs.values().any(Terminal::is_connected)
    }

    pub fn has_connected_mapped_input_terminals(&self) -> bool {
        self.connected_mapped_input_terminals().next().is_some()
    }

    pub fn has_mapped_over_input_terminals(&self) -> bool {
        self.mapped_input_terminals().next().is_some()
    }

    /// Inputs whose map-over makes this step run element-wise.
    pub fn mapped_input_terminals(&self) -> impl Iterator<Item = &Terminal> {
        self.inputs.values().filter(|t| t.drives_step_mapping())
    }

    pub fn connected_mapped_input_terminals(&self) -> impl Iterator<Item = &Terminal> {
        self.mapped_input_terminals().filter(|t| t.is_connected())
    }
}
