use super::Workflow;
use crate::collection::CollectionTypeDescription;
use crate::datatypes::{PASS_THROUGH_EXTENSION, PASS_THROUGH_OUTPUT_EXTENSIONS, satisfies};
use crate::error::WorkflowError;
use crate::terminal::{Side, Terminal, TerminalKey, TerminalKind};
use itertools::Itertools;

/// Verdict of a prospective connection. A refusal carries a human readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionAcceptable {
    pub can_accept: bool,
    pub reason: Option<String>,
}

impl ConnectionAcceptable {
    pub fn accept() -> Self {
        Self {
            can_accept: true,
            reason: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            can_accept: false,
            reason: Some(reason.into()),
        }
    }
}

impl From<ConnectionAcceptable> for bool {
    fn from(verdict: ConnectionAcceptable) -> bool {
        verdict.can_accept
    }
}

impl Workflow {
    /// Decides whether a new connector from `output` to `input` may be created.
    ///
    /// Same as [`Workflow::attachable`], except that a pair which is already
    /// connected is refused.
    pub fn can_accept(
        &self,
        input: &TerminalKey,
        output: &TerminalKey,
    ) -> Result<ConnectionAcceptable, WorkflowError> {
        self.resolve_side(input, Side::Input)?;
        self.resolve_side(output, Side::Output)?;
        if !self.connectors_between(output, input).is_empty() {
            return Ok(ConnectionAcceptable::reject(
                "This output is already connected to this input.",
            ));
        }
        self.attachable(input, output)
    }

    /// Decides whether `output` is compatible with `input`.
    ///
    /// Connectors already joining this exact pair are ignored when counting
    /// the input's existing connections, so a live connector can be
    /// re-validated with the same check.
    pub fn attachable(
        &self,
        input: &TerminalKey,
        output: &TerminalKey,
    ) -> Result<ConnectionAcceptable, WorkflowError> {
        let input_terminal = self.resolve_side(input, Side::Input)?;
        let output_terminal = self.resolve_side(output, Side::Output)?;

        let verdict = self.check_attachable(input_terminal, output_terminal)?;
        match &verdict.reason {
            Some(reason) => tracing::debug!(
                input = %input,
                output = %output,
                reason = %reason,
                "connection rejected"
            ),
            None => tracing::trace!(input = %input, output = %output, "connection acceptable"),
        }
        Ok(verdict)
    }

    fn check_attachable(
        &self,
        input: &Terminal,
        output: &Terminal,
    ) -> Result<ConnectionAcceptable, WorkflowError> {
        if input.step() == output.step() {
            return Ok(ConnectionAcceptable::reject(
                "Cannot connect an output to an input of the same step.",
            ));
        }
        let verdict = match (input.kind(), output.kind()) {
            (
                TerminalKind::InputParameter { parameter_type, .. },
                TerminalKind::OutputParameter {
                    parameter_type: other_type,
                },
            ) => self.parameter_attachable(input, output, parameter_type, other_type),
            (TerminalKind::InputParameter { .. }, _) => {
                ConnectionAcceptable::reject("Cannot attach a data output to a parameter input.")
            }
            (_, TerminalKind::OutputParameter { .. }) => {
                ConnectionAcceptable::reject("Cannot attach a parameter output to a data input.")
            }
            (TerminalKind::Input { multiple }, _) => {
                self.data_input_attachable(input, output, *multiple)?
            }
            (TerminalKind::InputCollection { collection_types }, _) => {
                self.collection_input_attachable(input, output, collection_types)?
            }
            (TerminalKind::Output, _)
            | (TerminalKind::OutputCollection { .. }, _)
            | (TerminalKind::OutputParameter { .. }, _) => {
                return Err(WorkflowError::WrongTerminalSide {
                    terminal: input.key().clone(),
                    expected: "an input",
                });
            }
        };
        Ok(verdict)
    }

    fn parameter_attachable(
        &self,
        input: &Terminal,
        output: &Terminal,
        parameter_type: &str,
        other_type: &str,
    ) -> ConnectionAcceptable {
        if self.other_connections(input, Some(output.key())).next().is_some() {
            return ConnectionAcceptable::reject("Input already filled with another connection.");
        }
        let this_type = self.effective_parameter_type(parameter_type);
        let other_type = self.effective_parameter_type(other_type);
        if this_type == other_type {
            ConnectionAcceptable::accept()
        } else {
            ConnectionAcceptable::reject(format!(
                "Effective output parameter type '{}' does not match input parameter type '{}'.",
                other_type, this_type
            ))
        }
    }

    fn data_input_attachable(
        &self,
        input: &Terminal,
        output: &Terminal,
        multiple: bool,
    ) -> Result<ConnectionAcceptable, WorkflowError> {
        let other_type = output.effective_collection_type();
        let this_map_over = input.map_over();

        if multiple {
            return self.multiple_input_attachable(input, output, &other_type);
        }
        if self.other_connections(input, Some(output.key())).next().is_some() {
            return Ok(ConnectionAcceptable::reject(
                "Input already filled with another connection, disconnect it first.",
            ));
        }

        if other_type.is_collection() {
            if this_map_over.is_collection() && this_map_over.can_match(&other_type) {
                return self.produces_acceptable_datatype(input, output);
            }
            let constraints = self.mapping_constraints(input)?;
            if constraints.iter().all(|c| other_type.can_match(c)) {
                return self.produces_acceptable_datatype(input, output);
            }
            let reason = if this_map_over.is_collection() {
                "Can't map over this input with output collection type - this input is already mapped over with an incompatible collection type. Disconnect inputs (and potentially outputs) and retry."
            } else if self.step_ref(input.step())?.has_connected_output_terminals() {
                "Can't map over this input with output collection type - this step has outputs defined constraining the mapping of this tool. Disconnect outputs and retry."
            } else {
                "Can't map over this input with output collection type - other inputs have an incompatible map over collection type. Disconnect inputs (and potentially outputs) and retry."
            };
            return Ok(ConnectionAcceptable::reject(reason));
        }
        if this_map_over.is_collection() {
            return Ok(ConnectionAcceptable::reject(
                "Cannot attach non-collection outputs to mapped over inputs, consider disconnecting inputs and outputs to reset this input's mapping.",
            ));
        }
        self.produces_acceptable_datatype(input, output)
    }

    /// A multiple input takes any number of datasets, or rank-1 collections
    /// consumed as one batch, but never a mix of the two.
    fn multiple_input_attachable(
        &self,
        input: &Terminal,
        output: &Terminal,
        other_type: &CollectionTypeDescription,
    ) -> Result<ConnectionAcceptable, WorkflowError> {
        let this_map_over = input.map_over();
        if other_type.is_collection() {
            let plain_attached = self
                .other_connections(input, Some(output.key()))
                .any(|other| !other.effective_collection_type().is_collection());
            if plain_attached {
                return Ok(ConnectionAcceptable::reject(
                    "Cannot attach collections to data parameters with individual data inputs already attached.",
                ));
            }
            if other_type.rank() > 1 {
                return Ok(ConnectionAcceptable::reject(
                    "Cannot attach nested collections to multiple data parameters.",
                ));
            }
            if this_map_over.is_collection() && !this_map_over.can_match(other_type) {
                return Ok(ConnectionAcceptable::reject(format!(
                    "This input already consumes a collection of type {}, cannot also attach {}.",
                    this_map_over, other_type
                )));
            }
            return self.produces_acceptable_datatype(input, output);
        }
        if this_map_over.is_collection() {
            return Ok(ConnectionAcceptable::reject(
                "Cannot attach individual datasets to a data parameter that already consumes a collection.",
            ));
        }
        self.produces_acceptable_datatype(input, output)
    }

    fn collection_input_attachable(
        &self,
        input: &Terminal,
        output: &Terminal,
        collection_types: &[CollectionTypeDescription],
    ) -> Result<ConnectionAcceptable, WorkflowError> {
        let other_type = output.effective_collection_type();
        if !other_type.is_collection() {
            return Ok(ConnectionAcceptable::reject(
                "Cannot attach a data output to a collection input.",
            ));
        }
        if self.other_connections(input, Some(output.key())).next().is_some() {
            return Ok(ConnectionAcceptable::reject(
                "Input already filled with another connection, disconnect it first.",
            ));
        }

        let this_map_over = input.map_over();
        if Self::matches_declared(&other_type, this_map_over, collection_types) {
            return self.produces_acceptable_datatype(input, output);
        }
        if this_map_over.is_collection() {
            return Ok(ConnectionAcceptable::reject(format!(
                "This input has already been mapped over with {}, cannot map over with {}.",
                this_map_over, other_type
            )));
        }
        if !collection_types.iter().any(|t| other_type.can_map_over(t)) {
            return Ok(ConnectionAcceptable::reject(
                "Incompatible collection type(s) for attachment.",
            ));
        }

        let effective_map_over = Self::collection_map_over(&other_type, collection_types);
        if !effective_map_over.is_collection() {
            return Ok(ConnectionAcceptable::reject(
                "Incompatible collection type(s) for attachment.",
            ));
        }
        let constraints = self.mapping_constraints(input)?;
        if constraints.iter().all(|c| effective_map_over.can_match(c)) {
            return self.produces_acceptable_datatype(input, output);
        }
        let step = self.step_ref(input.step())?;
        let reason = if step.has_connected_mapped_input_terminals() {
            "Can't map over this input with output collection type - other inputs have an incompatible map over collection type. Disconnect inputs (and potentially outputs) and retry."
        } else if step.has_mapped_over_input_terminals() {
            "Can't map over this input with output collection type - an output of this tool is mapped over constraining this input. Disconnect output(s) and retry."
        } else {
            "Can't map over this input with output collection type - this step has outputs defined constraining the mapping of this tool. Disconnect outputs and retry."
        };
        Ok(ConnectionAcceptable::reject(reason))
    }

    /// True if `other_type`, once the input's own map-over nesting is
    /// stripped from the front, is exactly one of the declared types.
    fn matches_declared(
        other_type: &CollectionTypeDescription,
        map_over: &CollectionTypeDescription,
        collection_types: &[CollectionTypeDescription],
    ) -> bool {
        let remainder = other_type.strip_outer(map_over);
        remainder.is_collection() && collection_types.iter().any(|t| t.can_match(&remainder))
    }

    /// The map-over a collection input adopts when fed `other_type`: `Null`
    /// for a direct match, otherwise the outer nesting left once the first
    /// declared type it can map over is consumed.
    pub(crate) fn collection_map_over(
        other_type: &CollectionTypeDescription,
        collection_types: &[CollectionTypeDescription],
    ) -> CollectionTypeDescription {
        if collection_types.iter().any(|t| t.can_match(other_type)) {
            return CollectionTypeDescription::Null;
        }
        collection_types
            .iter()
            .filter(|t| other_type.can_map_over(t))
            .map(|t| other_type.effective_map_over(t))
            .find(CollectionTypeDescription::is_collection)
            .unwrap_or(CollectionTypeDescription::Null)
    }

    /// Map-over values other terminals of the step force on `input`.
    ///
    /// An already mapped input is constrained by its own map-over. Otherwise
    /// connected outputs win, since downstream consumers depend on their
    /// shape; without connected outputs, connected mapped siblings decide.
    fn mapping_constraints(
        &self,
        input: &Terminal,
    ) -> Result<Vec<CollectionTypeDescription>, WorkflowError> {
        if input.is_mapped_over() {
            return Ok(vec![input.map_over().clone()]);
        }
        let step = self.step_ref(input.step())?;
        let constraints = if step.has_connected_output_terminals() {
            step.outputs()
                .filter(|t| t.is_connected())
                .map(|t| t.map_over().clone())
                .unique()
                .collect()
        } else {
            step.connected_mapped_input_terminals()
                .map(|t| t.map_over().clone())
                .unique()
                .collect()
        };
        Ok(constraints)
    }

    /// Datatype check between an input's accepted extensions and what the
    /// output effectively produces.
    ///
    /// A `ChangeDatatypeAction` on the producing step aimed at exactly this
    /// output name replaces the output's declared datatypes for the check.
    fn produces_acceptable_datatype(
        &self,
        input: &Terminal,
        output: &Terminal,
    ) -> Result<ConnectionAcceptable, WorkflowError> {
        let required = input.datatypes();
        if required.iter().any(|d| d == PASS_THROUGH_EXTENSION) {
            return Ok(ConnectionAcceptable::accept());
        }

        let producing_step = self.step_ref(output.step())?;
        let candidates: Vec<&str> = match producing_step.retyped_output(output.name()) {
            Some(newtype) => vec![newtype],
            None => output.datatypes().iter().map(String::as_str).collect(),
        };
        if candidates
            .iter()
            .any(|c| PASS_THROUGH_OUTPUT_EXTENSIONS.contains(c))
        {
            return Ok(ConnectionAcceptable::accept());
        }

        let oracle = self.datatypes();
        let compatible = required
            .iter()
            .cartesian_product(candidates.iter())
            .any(|(required, candidate)| satisfies(oracle, candidate, required));
        if compatible {
            Ok(ConnectionAcceptable::accept())
        } else {
            Ok(ConnectionAcceptable::reject(format!(
                "Effective output data type(s) [{}] do not appear to match input type(s) [{}].",
                candidates.iter().join(", "),
                required.iter().join(", ")
            )))
        }
    }

    /// Output terminals connected to `input`, skipping the ones equal to `except`.
    fn other_connections<'a>(
        &'a self,
        input: &'a Terminal,
        except: Option<&'a TerminalKey>,
    ) -> impl Iterator<Item = &'a Terminal> + 'a {
        input
            .connectors()
            .iter()
            .filter_map(move |id| self.connector(*id))
            .filter_map(|c| c.endpoints())
            .map(|(output, _)| output)
            .filter(move |output| Some(*output) != except)
            .filter_map(move |output| self.terminal(output))
    }
}
