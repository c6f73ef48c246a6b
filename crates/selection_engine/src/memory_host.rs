//! In-memory host surface used by tests and the CLI.

use std::collections::{HashMap, HashSet};

use shared::domain::{ContainerId, ControlId, OptionEntry, OptionValue};
use thiserror::Error;

use crate::host::HostSurface;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryHostError {
    #[error("unknown control {0}")]
    UnknownControl(u64),
    #[error("control {control} does not offer value {value}")]
    OptionNotOffered { control: u64, value: OptionValue },
}

#[derive(Debug, Clone, Default)]
struct MemoryControl {
    options: Vec<OptionEntry>,
    /// `None` falls back to the first option, like a freshly rendered `<select>`.
    selected: Option<OptionValue>,
}

impl MemoryControl {
    fn offers(&self, value: &OptionValue) -> bool {
        self.options.iter().any(|o| &o.value == value)
    }

    fn selected_value(&self) -> Option<OptionValue> {
        self.selected
            .clone()
            .or_else(|| self.options.first().map(|o| o.value.clone()))
    }
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    next_control: u64,
    next_container: u64,
    controls: HashMap<ControlId, MemoryControl>,
    containers: HashMap<ContainerId, Vec<ControlId>>,
    subscribed: HashSet<ControlId>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_container(&mut self) -> ContainerId {
        self.next_container += 1;
        let id = ContainerId(self.next_container);
        self.containers.insert(id, Vec::new());
        id
    }

    /// Simulates a user pick. The caller is expected to forward the change to
    /// the engine afterwards.
    pub fn select(&mut self, control: ControlId, value: &OptionValue) -> Result<(), MemoryHostError> {
        let state = self
            .controls
            .get_mut(&control)
            .ok_or(MemoryHostError::UnknownControl(control.0))?;
        if !state.offers(value) {
            return Err(MemoryHostError::OptionNotOffered {
                control: control.0,
                value: value.clone(),
            });
        }
        state.selected = Some(value.clone());
        Ok(())
    }

    pub fn is_subscribed(&self, control: ControlId) -> bool {
        self.subscribed.contains(&control)
    }

    pub fn exists(&self, control: ControlId) -> bool {
        self.controls.contains_key(&control)
    }

    fn allocate(&mut self, state: MemoryControl) -> ControlId {
        self.next_control += 1;
        let id = ControlId(self.next_control);
        self.controls.insert(id, state);
        id
    }

    fn detach(&mut self, control: ControlId) {
        for members in self.containers.values_mut() {
            members.retain(|id| *id != control);
        }
    }
}

impl HostSurface for MemoryHost {
    type Control = ControlId;
    type Container = ContainerId;

    fn create_control(&mut self, entries: &[OptionEntry]) -> ControlId {
        let mut state = MemoryControl::default();
        for entry in entries {
            if !state.offers(&entry.value) {
                state.options.push(entry.clone());
            }
        }
        self.allocate(state)
    }

    fn clone_control(&mut self, template: &ControlId) -> ControlId {
        let state = self.controls.get(template).cloned().unwrap_or_default();
        self.allocate(state)
    }

    fn append_control(&mut self, container: &ContainerId, control: &ControlId) {
        self.detach(*control);
        self.containers.entry(*container).or_default().push(*control);
    }

    fn remove_control(&mut self, control: &ControlId) {
        self.detach(*control);
        self.controls.remove(control);
        self.subscribed.remove(control);
    }

    fn get_selected_value(&self, control: &ControlId) -> Option<OptionValue> {
        self.controls.get(control).and_then(MemoryControl::selected_value)
    }

    fn set_selected_value(&mut self, control: &ControlId, value: &OptionValue) {
        if let Some(state) = self.controls.get_mut(control) {
            if state.offers(value) {
                state.selected = Some(value.clone());
            }
        }
    }

    fn list_option_entries(&self, control: &ControlId) -> Vec<OptionEntry> {
        self.controls
            .get(control)
            .map(|state| state.options.clone())
            .unwrap_or_default()
    }

    fn add_option_entry(&mut self, control: &ControlId, entry: &OptionEntry) {
        if let Some(state) = self.controls.get_mut(control) {
            if !state.offers(&entry.value) {
                state.options.push(entry.clone());
            }
        }
    }

    fn remove_option_entry(&mut self, control: &ControlId, value: &OptionValue) {
        if let Some(state) = self.controls.get_mut(control) {
            state.options.retain(|o| &o.value != value);
            if state.selected.as_ref() == Some(value) {
                state.selected = None;
            }
        }
    }

    fn reorder_options(&mut self, control: &ControlId, ordered_values: &[OptionValue]) {
        let Some(state) = self.controls.get_mut(control) else {
            return;
        };
        let mut remaining = std::mem::take(&mut state.options);
        let mut reordered = Vec::with_capacity(remaining.len());
        for value in ordered_values {
            if let Some(index) = remaining.iter().position(|o| &o.value == value) {
                reordered.push(remaining.remove(index));
            }
        }
        // Entries the caller did not mention keep their relative order at the end.
        reordered.extend(remaining);
        state.options = reordered;
    }

    fn on_value_changed(&mut self, control: &ControlId) {
        self.subscribed.insert(*control);
    }

    fn enumerate_live_controls(&self, container: &ContainerId) -> Vec<ControlId> {
        self.containers.get(container).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "tests/memory_host_tests.rs"]
mod tests;
