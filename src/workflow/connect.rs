use super::Workflow;
use crate::connector::{Connector, ConnectorId};
use crate::error::WorkflowError;
use crate::events::WorkflowEvent;
use crate::terminal::{Side, TerminalKey, TerminalKind};

impl Workflow {
    /// Connects `output` to `input` after checking [`Workflow::can_accept`].
    ///
    /// A refused connection is reported as [`WorkflowError::InvalidConnection`]
    /// carrying the refusal reason; nothing is registered in that case.
    pub fn connect(
        &mut self,
        output: &TerminalKey,
        input: &TerminalKey,
    ) -> Result<ConnectorId, WorkflowError> {
        let verdict = self.can_accept(input, output)?;
        if let Some(reason) = verdict.reason {
            return Err(WorkflowError::InvalidConnection {
                output: output.clone(),
                input: input.clone(),
                reason,
            });
        }
        self.attach_connector(output, input)
    }

    /// Creates a connector without consulting the compatibility checks.
    ///
    /// With both ends given the connector is registered on both terminals and
    /// the input's mapping is updated exactly as [`Workflow::connect`] would.
    /// With either end missing the connector stays `Unattached` and touches
    /// no terminal.
    pub fn create_connector(
        &mut self,
        output: Option<&TerminalKey>,
        input: Option<&TerminalKey>,
    ) -> Result<ConnectorId, WorkflowError> {
        match (output, input) {
            (Some(output), Some(input)) => self.attach_connector(output, input),
            (output, input) => {
                if let Some(output) = output {
                    self.resolve_side(output, Side::Output)?;
                }
                if let Some(input) = input {
                    self.resolve_side(input, Side::Input)?;
                }
                let id = self.next_connector_id();
                self.connectors
                    .insert(id, Connector::new(id, output.cloned(), input.cloned()));
                tracing::trace!(connector = %id, "unattached connector created");
                Ok(id)
            }
        }
    }

    fn attach_connector(
        &mut self,
        output: &TerminalKey,
        input: &TerminalKey,
    ) -> Result<ConnectorId, WorkflowError> {
        self.resolve_side(output, Side::Output)?;
        self.resolve_side(input, Side::Input)?;

        let id = self.next_connector_id();
        self.connectors.insert(
            id,
            Connector::new(id, Some(output.clone()), Some(input.clone())),
        );
        if let Some(terminal) = self.terminal_mut(output) {
            terminal.attach(id);
        }
        if let Some(terminal) = self.terminal_mut(input) {
            terminal.attach(id);
        }
        tracing::debug!(connector = %id, output = %output, input = %input, "connector attached");
        self.emit(WorkflowEvent::ConnectorAttached {
            connector: id,
            output: output.clone(),
            input: input.clone(),
        });
        self.emit_step_changes(output, input);

        self.on_input_connected(input, output)?;
        Ok(id)
    }

    /// Adopts the map-over a new connection calls for.
    fn on_input_connected(
        &mut self,
        input: &TerminalKey,
        output: &TerminalKey,
    ) -> Result<(), WorkflowError> {
        let other_type = self.resolve(output)?.effective_collection_type();
        if !other_type.is_collection() {
            return Ok(());
        }
        let terminal = self.resolve(input)?;
        match terminal.kind() {
            TerminalKind::Input { multiple: true } => {
                if !terminal.is_mapped_over() {
                    tracing::debug!(input = %input, collection = %other_type, "multiple input consumes collection as a batch");
                    self.apply_mapping(input, other_type);
                }
                Ok(())
            }
            TerminalKind::Input { multiple: false } => self.propagate_map_over(input, other_type),
            TerminalKind::InputCollection { collection_types } => {
                let map_over = Self::collection_map_over(&other_type, collection_types);
                if map_over.is_collection() {
                    self.propagate_map_over(input, map_over)
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }

    /// Destroys every live connector joining `output` to `input`. Returns how
    /// many were destroyed.
    pub fn disconnect(
        &mut self,
        output: &TerminalKey,
        input: &TerminalKey,
    ) -> Result<usize, WorkflowError> {
        self.resolve_side(output, Side::Output)?;
        self.resolve_side(input, Side::Input)?;
        let ids = self.connectors_between(output, input);
        for id in &ids {
            self.destroy_connector(*id)?;
        }
        Ok(ids.len())
    }

    /// Unregisters a connector from both of its terminals and lets each end
    /// reconsider its map-over. Destroying a connector that is not attached
    /// is a no-op.
    pub fn destroy_connector(&mut self, id: ConnectorId) -> Result<(), WorkflowError> {
        let connector = self
            .connectors
            .get_mut(&id)
            .ok_or(WorkflowError::ConnectorNotFound(id))?;
        let Some((output, input)) = connector
            .endpoints()
            .map(|(output, input)| (output.clone(), input.clone()))
        else {
            return Ok(());
        };
        connector.mark_destroyed();

        if let Some(terminal) = self.terminal_mut(&output) {
            terminal.detach(id);
        }
        if let Some(terminal) = self.terminal_mut(&input) {
            terminal.detach(id);
        }
        tracing::debug!(connector = %id, output = %output, input = %input, "connector destroyed");
        self.emit(WorkflowEvent::ConnectorDetached {
            connector: id,
            output: output.clone(),
            input: input.clone(),
        });
        self.emit_step_changes(&output, &input);

        self.reset_mapping_if_needed(&input)?;
        self.reset_output_mapping_if_needed(&output)
    }

    /// Re-runs the compatibility check on a live connector and destroys it if
    /// the connection is no longer acceptable. Returns true if it was destroyed.
    pub fn destroy_if_invalid(&mut self, id: ConnectorId) -> Result<bool, WorkflowError> {
        let connector = self
            .connectors
            .get(&id)
            .ok_or(WorkflowError::ConnectorNotFound(id))?;
        let Some((output, input)) = connector
            .endpoints()
            .map(|(output, input)| (output.clone(), input.clone()))
        else {
            return Ok(false);
        };
        let verdict = self.attachable(&input, &output)?;
        if verdict.can_accept {
            return Ok(false);
        }
        tracing::debug!(connector = %id, reason = ?verdict.reason, "connector no longer valid");
        self.destroy_connector(id)?;
        Ok(true)
    }

    /// Destroys every connector on a terminal, in connection order.
    pub(crate) fn destroy_terminal_connectors(&mut self, key: &TerminalKey) -> Result<(), WorkflowError> {
        let ids = self.resolve(key)?.connectors().to_vec();
        for id in ids {
            self.destroy_connector(id)?;
        }
        Ok(())
    }

    fn emit_step_changes(&mut self, output: &TerminalKey, input: &TerminalKey) {
        self.emit(WorkflowEvent::StepChanged(output.step));
        if input.step != output.step {
            self.emit(WorkflowEvent::StepChanged(input.step));
        }
    }
}
