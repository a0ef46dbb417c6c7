//! Change notifications emitted by the workflow.
//!
//! Every map-over transition and every connector attach/detach is reported
//! to the [`ChangeSink`]s registered on the workflow builder, so an editor
//! can mark the step graph dirty or redraw.

use crate::connector::ConnectorId;
use crate::terminal::{MappingChange, TerminalKey};
use crate::workflow::StepId;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    MapOverChanged(MappingChange),
    ConnectorAttached {
        connector: ConnectorId,
        output: TerminalKey,
        input: TerminalKey,
    },
    ConnectorDetached {
        connector: ConnectorId,
        output: TerminalKey,
        input: TerminalKey,
    },
    TerminalDestroyed(TerminalKey),
    /// The step's terminals or connections changed.
    StepChanged(StepId),
}

/// Receives workflow events as they happen.
pub trait ChangeSink {
    fn notify(&mut self, event: &WorkflowEvent);
}

impl<F> ChangeSink for F
where
    F: FnMut(&WorkflowEvent),
{
    fn notify(&mut self, event: &WorkflowEvent) {
        self(event)
    }
}

/// A sink that records every event. Clones share the same log, so a clone
/// can be handed to the workflow and another kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<WorkflowEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<WorkflowEvent> {
        self.events.borrow().clone()
    }

    /// Returns and clears the recorded events.
    pub fn drain(&self) -> Vec<WorkflowEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Only the map-over transitions, in emission order.
    pub fn map_over_changes(&self) -> Vec<MappingChange> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                WorkflowEvent::MapOverChanged(change) => Some(change.clone()),
                _ => None,
            })
            .collect()
    }
}

impl ChangeSink for EventLog {
    fn notify(&mut self, event: &WorkflowEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
