use crate::terminal::TerminalKey;
use std::fmt;

/// Identity of a connector. Ids are never reused within a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectorId(pub(crate) u64);

impl ConnectorId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a connector. `Unattached` and `Destroyed` are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorState {
    /// Built with a missing endpoint; never registered on any terminal.
    Unattached,
    /// Registered on both its output and its input.
    Attached,
    Destroyed,
}

/// An edge from one output terminal (`handle1`) to one input terminal (`handle2`).
///
/// The connector holds keys, not terminals; the workflow arena owns both ends.
#[derive(Debug, Clone)]
pub struct Connector {
    id: ConnectorId,
    handle1: Option<TerminalKey>,
    handle2: Option<TerminalKey>,
    state: ConnectorState,
}

impl Connector {
    pub(crate) fn new(
        id: ConnectorId,
        handle1: Option<TerminalKey>,
        handle2: Option<TerminalKey>,
    ) -> Self {
        let state = if handle1.is_some() && handle2.is_some() {
            ConnectorState::Attached
        } else {
            ConnectorState::Unattached
        };
        Self {
            id,
            handle1,
            handle2,
            state,
        }
    }

    pub fn id(&self) -> ConnectorId {
        self.id
    }

    /// The output end.
    pub fn handle1(&self) -> Option<&TerminalKey> {
        self.handle1.as_ref()
    }

    /// The input end.
    pub fn handle2(&self) -> Option<&TerminalKey> {
        self.handle2.as_ref()
    }

    pub fn state(&self) -> ConnectorState {
        self.state
    }

    pub fn is_live(&self) -> bool {
        self.state == ConnectorState::Attached
    }

    /// Both endpoints of a live connector.
    pub fn endpoints(&self) -> Option<(&TerminalKey, &TerminalKey)> {
        if !self.is_live() {
            return None;
        }
        self.handle1.as_ref().zip(self.handle2.as_ref())
    }

    pub(crate) fn mark_destroyed(&mut self) {
        self.state = ConnectorState::Destroyed;
    }
}
