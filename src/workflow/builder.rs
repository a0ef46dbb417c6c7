use super::Workflow;
use crate::datatypes::{DatatypeOracle, DatatypesMapping};
use crate::events::ChangeSink;
use ahash::AHashMap;

/// Configures a [`Workflow`]: the datatype oracle it consults, the sinks it
/// notifies and the parameter type aliases it applies.
pub struct WorkflowBuilder {
    datatypes: Box<dyn DatatypeOracle>,
    sinks: Vec<Box<dyn ChangeSink>>,
    parameter_aliases: AHashMap<String, String>,
}

impl Default for WorkflowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowBuilder {
    pub fn new() -> Self {
        let mut parameter_aliases = AHashMap::new();
        parameter_aliases.insert("select".to_string(), "text".to_string());
        Self {
            datatypes: Box::new(DatatypesMapping::default()),
            sinks: Vec::new(),
            parameter_aliases,
        }
    }

    pub fn with_datatypes(mut self, oracle: impl DatatypeOracle + 'static) -> Self {
        self.datatypes = Box::new(oracle);
        self
    }

    pub fn with_sink(mut self, sink: impl ChangeSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Treats parameter type `from` as `to` on both ends of a parameter connection.
    pub fn with_parameter_alias(mut self, from: &str, to: &str) -> Self {
        self.parameter_aliases
            .insert(from.to_string(), to.to_string());
        self
    }

    pub fn build(self) -> Workflow {
        Workflow::from_parts(self.datatypes, self.sinks, self.parameter_aliases)
    }
}
