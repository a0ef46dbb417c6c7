use super::Workflow;
use crate::collection::CollectionTypeDescription;
use crate::error::WorkflowError;
use crate::events::WorkflowEvent;
use crate::terminal::{Side, Terminal, TerminalKey, TerminalKind};
use ahash::AHashSet;
use std::collections::VecDeque;

impl Workflow {
    /// Requests a map-over for one terminal, refusing values that would
    /// contradict the state the step's connections already negotiated.
    ///
    /// A concrete value is propagated to the step's siblings and outputs the
    /// same way a connection would. `Null` clears an input that no live
    /// connection maps, along with the step's unconnected outputs.
    pub fn set_map_over(
        &mut self,
        key: &TerminalKey,
        map_over: CollectionTypeDescription,
    ) -> Result<(), WorkflowError> {
        let terminal = self.resolve(key)?;
        let multiple = terminal.is_multiple();
        if let Some(reason) = self.map_over_conflict(terminal, &map_over)? {
            tracing::warn!(terminal = %key, requested = %map_over, reason = %reason, "map-over request refused");
            return Err(WorkflowError::InconsistentMapOver {
                terminal: key.clone(),
                requested: map_over,
                reason,
            });
        }

        match (key.side, map_over.is_collection()) {
            (Side::Input, true) if !multiple => {
                self.propagate_map_over(key, map_over)?;
            }
            (Side::Input, false) => {
                self.apply_mapping(key, map_over);
                if !self.step_ref(key.step)?.has_mapped_over_input_terminals() {
                    self.reset_unconnected_outputs(key)?;
                }
            }
            _ => {
                self.apply_mapping(key, map_over);
            }
        }
        Ok(())
    }

    fn map_over_conflict(
        &self,
        terminal: &Terminal,
        requested: &CollectionTypeDescription,
    ) -> Result<Option<String>, WorkflowError> {
        if terminal.is_parameter() {
            return Ok(Some("parameter terminals are never mapped over".to_string()));
        }
        if terminal.map_over() == requested {
            return Ok(None);
        }
        if terminal.side() == Side::Output {
            if terminal.is_connected() {
                return Ok(Some(
                    "the output is connected and its consumers rely on its current shape".to_string(),
                ));
            }
            let step = self.step_ref(terminal.step())?;
            let driving = step.mapped_input_terminals().next().map(Terminal::map_over);
            return Ok(match driving {
                Some(driving) if driving != requested => Some(format!(
                    "the step's inputs map it over {}",
                    driving
                )),
                None if requested.is_collection() => Some(
                    "no input of the step is mapped over a collection".to_string(),
                ),
                _ => None,
            });
        }

        if terminal.is_connected() && self.implied_map_over(terminal) != *requested {
            return Ok(Some(format!(
                "its connections imply {}",
                self.implied_map_over(terminal)
            )));
        }
        if !requested.is_collection() || terminal.is_multiple() {
            return Ok(None);
        }
        let step = self.step_ref(terminal.step())?;
        if let Some(sibling) = step
            .connected_mapped_input_terminals()
            .find(|t| t.key() != terminal.key() && t.map_over() != requested)
        {
            return Ok(Some(format!(
                "the {} is already mapped over {}",
                sibling.key(),
                sibling.map_over()
            )));
        }
        if let Some(output) = step
            .outputs()
            .find(|t| t.is_connected() && t.map_over() != requested)
        {
            return Ok(Some(format!(
                "the connected {} is mapped over {}",
                output.key(),
                output.map_over()
            )));
        }
        Ok(None)
    }

    /// The map-over an input's live connections call for.
    pub(crate) fn implied_map_over(&self, input: &Terminal) -> CollectionTypeDescription {
        let connected: Vec<CollectionTypeDescription> = self
            .connected_outputs(input.key())
            .iter()
            .map(|output| output.effective_collection_type())
            .collect();
        match input.kind() {
            TerminalKind::Input { multiple: true } => connected
                .into_iter()
                .find(CollectionTypeDescription::is_collection)
                .unwrap_or_default(),
            TerminalKind::Input { multiple: false } => connected.into_iter().next().unwrap_or_default(),
            TerminalKind::InputCollection { collection_types } => connected
                .first()
                .map(|other| Self::collection_map_over(other, collection_types))
                .unwrap_or_default(),
            _ => CollectionTypeDescription::Null,
        }
    }

    /// Maps `start` over `map_over` and carries the mapping to the rest of
    /// its step.
    ///
    /// Unmapped sibling inputs whose connections already call for the same
    /// value follow along, then every output of the step adopts it. Outputs
    /// that are connected with a different map-over keep theirs. Terminals
    /// are visited in declaration order and each at most once.
    pub(crate) fn propagate_map_over(
        &mut self,
        start: &TerminalKey,
        map_over: CollectionTypeDescription,
    ) -> Result<(), WorkflowError> {
        let mut queue = VecDeque::from([start.clone()]);
        let mut visited: AHashSet<TerminalKey> = AHashSet::new();

        while let Some(key) = queue.pop_front() {
            if !visited.insert(key.clone()) {
                continue;
            }
            let terminal = self.resolve(&key)?;
            if terminal.is_multiple() || terminal.is_parameter() || terminal.map_over() == &map_over {
                continue;
            }
            self.apply_mapping(&key, map_over.clone());

            let step = self.step_ref(key.step)?;
            let siblings: Vec<TerminalKey> = step
                .inputs()
                .filter(|t| t.key() != &key && !visited.contains(t.key()))
                .filter(|t| !t.is_mapped_over() && !t.is_multiple() && !t.is_parameter())
                .filter(|t| t.is_connected() && self.implied_map_over(t) == map_over)
                .map(|t| t.key().clone())
                .collect();
            let mut outputs = Vec::new();
            for output in step.outputs() {
                if output.is_connected() && output.map_over() != &map_over {
                    tracing::warn!(
                        output = %output.key(),
                        current = %output.map_over(),
                        requested = %map_over,
                        "connected output keeps its map-over"
                    );
                    continue;
                }
                outputs.push(output.key().clone());
            }

            queue.extend(siblings);
            for output in outputs {
                if visited.insert(output.clone()) {
                    self.apply_mapping(&output, map_over.clone());
                }
            }
        }
        Ok(())
    }

    /// Clears an input's map-over once the connection that justified it is gone.
    ///
    /// The input itself always returns to `Null`. The step's unconnected
    /// outputs follow unless another connected input is still mapped over the
    /// same value; connected outputs keep their mapping either way.
    pub(crate) fn reset_mapping_if_needed(&mut self, key: &TerminalKey) -> Result<(), WorkflowError> {
        let Some(terminal) = self.terminal(key) else {
            return Ok(());
        };
        if !terminal.is_mapped_over() {
            return Ok(());
        }
        if terminal.is_multiple() {
            if !self.implied_map_over(terminal).is_collection() {
                self.apply_mapping(key, CollectionTypeDescription::Null);
            }
            return Ok(());
        }
        if terminal.is_connected() && self.implied_map_over(terminal) == *terminal.map_over() {
            return Ok(());
        }

        let old = terminal.map_over().clone();
        let required = self
            .step_ref(key.step)?
            .connected_mapped_input_terminals()
            .any(|t| t.key() != key && t.map_over() == &old);
        self.apply_mapping(key, CollectionTypeDescription::Null);
        if required {
            tracing::debug!(input = %key, map_over = %old, "step mapping still required by a sibling input");
            return Ok(());
        }
        self.reset_unconnected_outputs(key)
    }

    /// Brings a connected input back in line with what its connections call
    /// for after its declaration changed underneath them.
    ///
    /// A stale value is cleared first, releasing the step's unconnected
    /// outputs if nothing else maps the step, then the implied value is
    /// applied as a fresh connection would apply it. `flipped` forces the
    /// resync when the input switched between single and multiple, since that
    /// decides whether its map-over drives the step.
    pub(crate) fn resync_input_mapping(
        &mut self,
        key: &TerminalKey,
        flipped: bool,
    ) -> Result<(), WorkflowError> {
        let Some(terminal) = self.terminal(key) else {
            return Ok(());
        };
        if terminal.is_parameter() || !terminal.is_connected() {
            return Ok(());
        }
        let implied = self.implied_map_over(terminal);
        if !flipped && implied == *terminal.map_over() {
            return Ok(());
        }
        let multiple = terminal.is_multiple();
        tracing::debug!(input = %key, current = %terminal.map_over(), implied = %implied, "resyncing map-over");

        self.apply_mapping(key, CollectionTypeDescription::Null);
        if !self.step_ref(key.step)?.has_mapped_over_input_terminals() {
            self.reset_unconnected_outputs(key)?;
        }
        if !implied.is_collection() {
            return Ok(());
        }
        if multiple {
            self.apply_mapping(key, implied);
            Ok(())
        } else {
            self.propagate_map_over(key, implied)
        }
    }

    /// Clears the map-over of an output left without consumers once no input
    /// of its step maps the step anymore.
    pub(crate) fn reset_output_mapping_if_needed(
        &mut self,
        key: &TerminalKey,
    ) -> Result<(), WorkflowError> {
        let Some(terminal) = self.terminal(key) else {
            return Ok(());
        };
        if terminal.is_connected() || !terminal.is_mapped_over() {
            return Ok(());
        }
        if self.step_ref(key.step)?.has_mapped_over_input_terminals() {
            return Ok(());
        }
        self.apply_mapping(key, CollectionTypeDescription::Null);
        Ok(())
    }

    fn reset_unconnected_outputs(&mut self, key: &TerminalKey) -> Result<(), WorkflowError> {
        let outputs: Vec<TerminalKey> = self
            .step_ref(key.step)?
            .outputs()
            .filter(|t| !t.is_connected() && t.is_mapped_over())
            .map(|t| t.key().clone())
            .collect();
        for output in outputs {
            self.apply_mapping(&output, CollectionTypeDescription::Null);
        }
        Ok(())
    }

    /// Stores a map-over on one terminal and reports the transition.
    pub(crate) fn apply_mapping(&mut self, key: &TerminalKey, map_over: CollectionTypeDescription) -> bool {
        let change = self
            .terminal_mut(key)
            .and_then(|terminal| terminal.mapping_mut().set_map_over(map_over));
        match change {
            Some(change) => {
                tracing::debug!(terminal = %key, old = %change.old, new = %change.new, "map-over changed");
                self.emit(WorkflowEvent::MapOverChanged(change));
                true
            }
            None => false,
        }
    }
}
