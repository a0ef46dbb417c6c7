use super::{Step, StepId, Workflow};
use crate::connector::ConnectorId;
use crate::definition::{InputDefinition, OutputDefinition, StepDefinition};
use crate::error::WorkflowError;
use crate::events::WorkflowEvent;
use crate::terminal::{Side, Terminal, TerminalKey, TerminalKind};
use ahash::AHashMap;
use indexmap::IndexMap;

/// One declared terminal of a step definition, either side.
#[derive(Clone, Copy)]
enum Declared<'a> {
    Input(&'a InputDefinition),
    Output(&'a OutputDefinition),
}

impl Declared<'_> {
    fn name(&self) -> &str {
        match self {
            Declared::Input(input) => &input.name,
            Declared::Output(output) => &output.name,
        }
    }

    fn kind(&self) -> TerminalKind {
        match self {
            Declared::Input(input) => Terminal::input_kind(input),
            Declared::Output(output) => Terminal::output_kind(output),
        }
    }

    fn build(&self, step: StepId) -> Terminal {
        match self {
            Declared::Input(input) => Terminal::from_input(step, input),
            Declared::Output(output) => Terminal::from_output(step, output),
        }
    }

    fn update(&self, terminal: &mut Terminal) {
        match self {
            Declared::Input(input) => terminal.update_input(input),
            Declared::Output(output) => terminal.update_output(output),
        }
    }
}

fn declared(definition: &StepDefinition, side: Side) -> Vec<Declared<'_>> {
    match side {
        Side::Input => definition.inputs.iter().map(Declared::Input).collect(),
        Side::Output => definition.outputs.iter().map(Declared::Output).collect(),
    }
}

impl Workflow {
    /// Adds a step and builds one terminal per declared input and output.
    pub fn add_step(&mut self, definition: StepDefinition) -> StepId {
        let id = StepId(self.next_step_id);
        self.next_step_id += 1;

        let mut step = Step::new(id, definition.label.clone());
        for input in &definition.inputs {
            step.inputs
                .insert(input.name.clone(), Terminal::from_input(id, input));
        }
        for output in &definition.outputs {
            step.outputs
                .insert(output.name.clone(), Terminal::from_output(id, output));
        }
        step.post_job_actions = definition.post_job_actions;

        tracing::debug!(
            step = %id,
            inputs = step.inputs.len(),
            outputs = step.outputs.len(),
            "step added"
        );
        self.steps.insert(id, step);
        self.emit(WorkflowEvent::StepChanged(id));
        id
    }

    /// Rebuilds a step's terminals from fresh field data.
    ///
    /// Terminals are matched by name. A terminal that persists with the same
    /// variant is updated in place and keeps its connectors; connectors it can
    /// no longer accept are destroyed. A terminal that vanished, or whose
    /// variant changed, is destroyed together with its connectors.
    pub fn update_step(
        &mut self,
        id: StepId,
        definition: StepDefinition,
    ) -> Result<(), WorkflowError> {
        let step = self
            .steps
            .get_mut(&id)
            .ok_or(WorkflowError::StepNotFound(id))?;
        step.set_label(definition.label.clone());
        step.post_job_actions = definition.post_job_actions.clone();
        let was_multiple: AHashMap<String, bool> = step
            .inputs()
            .map(|terminal| (terminal.name().to_string(), terminal.is_multiple()))
            .collect();

        for side in [Side::Input, Side::Output] {
            self.refresh_terminals(id, side, &declared(&definition, side))?;
        }

        let step = self.step_ref(id)?;
        let kept: Vec<ConnectorId> = step
            .inputs()
            .chain(step.outputs())
            .flat_map(|terminal| terminal.connectors().iter().copied())
            .collect();
        for connector in kept {
            self.destroy_if_invalid(connector)?;
        }

        let inputs: Vec<(TerminalKey, bool)> = self
            .step_ref(id)?
            .inputs()
            .map(|terminal| {
                let flipped = was_multiple
                    .get(terminal.name())
                    .is_some_and(|multiple| *multiple != terminal.is_multiple());
                (terminal.key().clone(), flipped)
            })
            .collect();
        for (key, flipped) in inputs {
            self.resync_input_mapping(&key, flipped)?;
        }

        tracing::debug!(step = %id, "step field data refreshed");
        self.emit(WorkflowEvent::StepChanged(id));
        Ok(())
    }

    fn refresh_terminals(
        &mut self,
        id: StepId,
        side: Side,
        declared: &[Declared<'_>],
    ) -> Result<(), WorkflowError> {
        let order: AHashMap<&str, usize> = declared
            .iter()
            .enumerate()
            .map(|(position, d)| (d.name(), position))
            .collect();

        let vanished: Vec<TerminalKey> = self
            .terminals_on(id, side)?
            .keys()
            .filter(|name| !order.contains_key(name.as_str()))
            .map(|name| TerminalKey {
                step: id,
                side,
                name: name.clone(),
            })
            .collect();
        for key in vanished {
            self.destroy_terminal(&key)?;
        }

        for decl in declared {
            let key = TerminalKey {
                step: id,
                side,
                name: decl.name().to_string(),
            };
            let same_variant = self
                .terminal(&key)
                .map(|terminal| terminal.kind().same_variant(&decl.kind()));
            match same_variant {
                Some(true) => {
                    if let Some(terminal) = self.terminal_mut(&key) {
                        decl.update(terminal);
                    }
                }
                Some(false) => {
                    tracing::debug!(terminal = %key, "terminal changed variant, rebuilding");
                    self.destroy_terminal_connectors(&key)?;
                    self.emit(WorkflowEvent::TerminalDestroyed(key.clone()));
                    self.terminals_on_mut(id, side)?
                        .insert(key.name.clone(), decl.build(id));
                }
                None => {
                    self.terminals_on_mut(id, side)?
                        .insert(key.name.clone(), decl.build(id));
                }
            }
        }

        self.terminals_on_mut(id, side)?.sort_by(|a, _, b, _| {
            let a = order.get(a.as_str()).copied().unwrap_or(usize::MAX);
            let b = order.get(b.as_str()).copied().unwrap_or(usize::MAX);
            a.cmp(&b)
        });
        Ok(())
    }

    /// Removes a step, destroying every terminal and connector it owns.
    pub fn remove_step(&mut self, id: StepId) -> Result<(), WorkflowError> {
        let step = self.step_ref(id)?;
        let keys: Vec<TerminalKey> = step
            .inputs()
            .chain(step.outputs())
            .map(|terminal| terminal.key().clone())
            .collect();
        for key in keys {
            self.destroy_terminal(&key)?;
        }
        self.steps.shift_remove(&id);
        tracing::debug!(step = %id, "step removed");
        self.emit(WorkflowEvent::StepChanged(id));
        Ok(())
    }

    /// Destroys a terminal's connectors and removes it from its step.
    fn destroy_terminal(&mut self, key: &TerminalKey) -> Result<(), WorkflowError> {
        self.destroy_terminal_connectors(key)?;
        self.terminals_on_mut(key.step, key.side)?
            .shift_remove(&key.name);
        tracing::debug!(terminal = %key, "terminal destroyed");
        self.emit(WorkflowEvent::TerminalDestroyed(key.clone()));
        Ok(())
    }

    fn terminals_on(
        &self,
        id: StepId,
        side: Side,
    ) -> Result<&IndexMap<String, Terminal>, WorkflowError> {
        let step = self.step_ref(id)?;
        Ok(match side {
            Side::Input => &step.inputs,
            Side::Output => &step.outputs,
        })
    }

    fn terminals_on_mut(
        &mut self,
        id: StepId,
        side: Side,
    ) -> Result<&mut IndexMap<String, Terminal>, WorkflowError> {
        let step = self
            .steps
            .get_mut(&id)
            .ok_or(WorkflowError::StepNotFound(id))?;
        Ok(match side {
            Side::Input => &mut step.inputs,
            Side::Output => &mut step.outputs,
        })
    }
}
