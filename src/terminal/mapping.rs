use super::TerminalKey;
use crate::collection::CollectionTypeDescription;

/// A record of one map-over transition on a terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingChange {
    pub terminal: TerminalKey,
    pub old: CollectionTypeDescription,
    pub new: CollectionTypeDescription,
}

/// The current effective map-over state of a single terminal.
#[derive(Debug, Clone)]
pub struct TerminalMapping {
    terminal: TerminalKey,
    map_over: CollectionTypeDescription,
}

impl TerminalMapping {
    pub fn new(terminal: TerminalKey) -> Self {
        Self {
            terminal,
            map_over: CollectionTypeDescription::Null,
        }
    }

    pub fn terminal(&self) -> &TerminalKey {
        &self.terminal
    }

    pub fn map_over(&self) -> &CollectionTypeDescription {
        &self.map_over
    }

    /// Replaces the map-over state. Returns the transition, or `None` when
    /// the value did not change.
    pub(crate) fn set_map_over(
        &mut self,
        map_over: CollectionTypeDescription,
    ) -> Option<MappingChange> {
        if self.map_over == map_over {
            return None;
        }
        let old = std::mem::replace(&mut self.map_over, map_over);
        Some(MappingChange {
            terminal: self.terminal.clone(),
            old,
            new: self.map_over.clone(),
        })
    }
}
