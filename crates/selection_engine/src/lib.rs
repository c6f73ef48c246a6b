//! Synchronizes a growing/shrinking set of single-choice controls that share
//! one option pool.
//!
//! The engine keeps one trailing empty control to invite the next pick, prunes
//! controls that fall back to the sentinel, and (in distinct mode) rewrites every
//! control's options so a value is only offered where it is still free.

use shared::{
    domain::{
        ControlState, NonValue, NonValuePlacement, OptionEntry, OptionOrder, OptionPool,
        OptionValue, ValueOrdering,
    },
    protocol::ControlSnapshot,
};
use tracing::{debug, warn};

pub mod config;
pub mod error;
pub mod host;
pub mod memory_host;
pub mod ordering;
pub mod requests;

pub use config::{EngineConfig, PoolLoader};
pub use error::{EngineError, InvariantViolation, Result};
pub use host::HostSurface;
pub use memory_host::{MemoryHost, MemoryHostError};
pub use requests::handle_request;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// EMPTY -> HOLDING
    FirstSelection,
    /// HOLDING -> HOLDING
    Reselection,
    /// HOLDING -> EMPTY
    Cleared,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeOutcome<C> {
    pub kind: ChangeKind,
    pub appended: Option<C>,
    pub removed: Vec<C>,
}

#[derive(Debug, Clone)]
struct TrackedControl<C> {
    handle: C,
    /// Absent until the control's first committed change.
    last_committed: Option<OptionValue>,
}

pub struct SelectionSetEngine<H: HostSurface> {
    host: H,
    container: H::Container,
    pool: OptionPool,
    non_value: NonValue,
    distinct_options: bool,
    option_order: OptionOrder,
    value_ordering: ValueOrdering,
    non_value_placement: NonValuePlacement,
    template: H::Control,
    controls: Vec<TrackedControl<H::Control>>,
}

impl<H: HostSurface> SelectionSetEngine<H> {
    /// Builds the template control (`[NonValue] ++ pool`, pool order) and appends
    /// the first live clone to `container`.
    pub fn new(mut host: H, container: H::Container, mut config: EngineConfig) -> Self {
        let pool = config.resolve_pool();

        let mut entries = Vec::with_capacity(pool.len() + 1);
        entries.push(config.non_value.entry());
        entries.extend(pool.entries().iter().cloned());
        let template = host.create_control(&entries);

        let mut engine = Self {
            host,
            container,
            pool,
            non_value: config.non_value,
            distinct_options: config.distinct_options,
            option_order: config.option_order,
            value_ordering: config.value_ordering,
            non_value_placement: config.non_value_placement,
            template,
            controls: Vec::new(),
        };
        engine.append_clone();
        engine
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn container(&self) -> &H::Container {
        &self.container
    }

    pub fn pool(&self) -> &OptionPool {
        &self.pool
    }

    pub fn non_value(&self) -> &NonValue {
        &self.non_value
    }

    pub fn distinct_options(&self) -> bool {
        self.distinct_options
    }

    /// Live controls in document order.
    pub fn controls(&self) -> Vec<H::Control> {
        self.controls.iter().map(|t| t.handle.clone()).collect()
    }

    pub fn control_state(&self, control: &H::Control) -> Option<ControlState> {
        self.position(control)?;
        let value = self.selected_value_of(control);
        Some(if self.non_value.matches(&value) {
            ControlState::Empty
        } else {
            ControlState::Holding(value)
        })
    }

    /// Reacts to a value change the host reported for `control`.
    pub fn on_control_changed(&mut self, control: &H::Control) -> Result<ChangeOutcome<H::Control>> {
        let index = self
            .position(control)
            .ok_or_else(|| EngineError::UnknownControl(format!("{control:?}")))?;
        let current = self.selected_value_of(control);
        let previous = self.controls[index].last_committed.clone();

        if self.distinct_options && !self.non_value.matches(&current) {
            let duplicate = self
                .controls
                .iter()
                .enumerate()
                .any(|(i, t)| i != index && self.selected_value_of(&t.handle) == current);
            if duplicate {
                let restore = previous.unwrap_or_else(|| self.non_value.value.clone());
                warn!(value = %current, restored = %restore, "reverting duplicate selection");
                self.host.set_selected_value(control, &restore);
                return Err(EngineError::DuplicateSelection { value: current });
            }
        }

        let kind = if self.non_value.matches(&current) {
            ChangeKind::Cleared
        } else if previous.map_or(true, |p| self.non_value.matches(&p)) {
            ChangeKind::FirstSelection
        } else {
            ChangeKind::Reselection
        };

        let removed = self.prune();
        let appended = self.ensure_trailing_control();

        if let Some(tracked) = self.controls.iter_mut().find(|t| &t.handle == control) {
            tracked.last_committed = Some(current);
        }

        debug!(
            ?kind,
            removed = removed.len(),
            appended = appended.is_some(),
            controls = self.controls.len(),
            "settled control change"
        );
        Ok(ChangeOutcome {
            kind,
            appended,
            removed,
        })
    }

    /// Removes controls showing the sentinel. The last control is spared unless
    /// distinct mode has used up the whole pool.
    pub fn prune(&mut self) -> Vec<H::Control> {
        let scope = if self.is_exhausted() {
            self.controls.len()
        } else {
            self.controls.len().saturating_sub(1)
        };

        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.controls.len());
        for (i, tracked) in std::mem::take(&mut self.controls).into_iter().enumerate() {
            if i < scope && self.is_empty_control(&tracked.handle) {
                self.host.remove_control(&tracked.handle);
                debug!(control = ?tracked.handle, "pruned empty control");
                removed.push(tracked.handle);
            } else {
                kept.push(tracked);
            }
        }
        self.controls = kept;

        if self.distinct_options {
            for control in self.controls() {
                self.normalize_options(&control, None);
            }
        }
        removed
    }

    /// Strips options other controls have claimed and restores freed ones.
    /// No-op outside distinct mode.
    pub fn normalize_options(&mut self, control: &H::Control, selected_values: Option<&[OptionValue]>) {
        if !self.distinct_options {
            return;
        }

        let taken = self.selected_values();
        let claimed = selected_values.unwrap_or(taken.as_slice());
        let own = self.selected_value_of(control);

        for entry in self.host.list_option_entries(control) {
            if entry.value != own
                && !self.non_value.matches(&entry.value)
                && claimed.contains(&entry.value)
            {
                self.host.remove_option_entry(control, &entry.value);
            }
        }

        let current = self.host.list_option_entries(control);
        let to_add: Vec<OptionEntry> = self
            .pool
            .entries()
            .iter()
            .filter(|e| !taken.contains(&e.value))
            .filter(|e| !current.iter().any(|c| c.value == e.value))
            .filter(|e| !self.non_value.matches(&e.value))
            .cloned()
            .collect();
        for entry in &to_add {
            self.host.add_option_entry(control, entry);
        }

        self.sort_options(control);
    }

    pub fn sort_options(&mut self, control: &H::Control) {
        match self.option_order {
            OptionOrder::ByValue => self.sort_options_by_value(control),
            OptionOrder::ByLabel => self.sort_options_by_label(control),
        }
    }

    pub fn sort_options_by_value(&mut self, control: &H::Control) {
        let entries = self.host.list_option_entries(control);
        let order = ordering::order_by_value(
            &entries,
            &self.non_value,
            self.value_ordering,
            self.non_value_placement,
        );
        self.host.reorder_options(control, &order);
    }

    pub fn sort_options_by_label(&mut self, control: &H::Control) {
        let entries = self.host.list_option_entries(control);
        let order = ordering::order_by_label(&entries, &self.non_value, self.non_value_placement);
        self.host.reorder_options(control, &order);
    }

    /// Real values in control order.
    pub fn selected_values(&self) -> Vec<OptionValue> {
        self.controls
            .iter()
            .map(|t| self.selected_value_of(&t.handle))
            .filter(|v| !self.non_value.matches(v))
            .collect()
    }

    /// (label, value) for every control holding a real value, in control order.
    pub fn selected_name_value_pairs(&self) -> Vec<(String, OptionValue)> {
        self.selected_entries()
            .into_iter()
            .map(|e| (e.label, e.value))
            .collect()
    }

    /// Selected (label, value) entries in control order.
    pub fn selected_entries(&self) -> Vec<OptionEntry> {
        self.controls
            .iter()
            .filter_map(|t| {
                let value = self.selected_value_of(&t.handle);
                if self.non_value.matches(&value) {
                    return None;
                }
                let label = self
                    .host
                    .list_option_entries(&t.handle)
                    .into_iter()
                    .find(|e| e.value == value)
                    .map(|e| e.label)
                    .or_else(|| self.pool.label_for(&value).map(str::to_string))
                    .unwrap_or_else(|| value.to_string());
                Some(OptionEntry { label, value })
            })
            .collect()
    }

    /// Restores a captured selection set. Values the trailing control does not
    /// offer (unknown, or already taken in distinct mode) are skipped and returned.
    pub fn set_selected_values(&mut self, values: &[OptionValue]) -> Vec<OptionValue> {
        self.reset();

        let mut skipped = Vec::new();
        for value in values {
            if self.non_value.matches(value) {
                continue;
            }
            let Some(last) = self.controls.last().map(|t| t.handle.clone()) else {
                skipped.push(value.clone());
                continue;
            };
            let offered = self
                .host
                .list_option_entries(&last)
                .iter()
                .any(|e| &e.value == value);
            if !offered || !self.is_empty_control(&last) {
                warn!(value = %value, "skipping value the trailing control does not offer");
                skipped.push(value.clone());
                continue;
            }

            self.host.set_selected_value(&last, value);
            if let Some(tracked) = self.controls.last_mut() {
                tracked.last_committed = Some(value.clone());
            }
            if !self.is_exhausted() {
                self.append_clone();
            }
        }

        self.prune();
        self.ensure_trailing_control();
        skipped
    }

    /// Clears every control and collapses to a single empty one.
    pub fn reset(&mut self) {
        for tracked in &mut self.controls {
            self.host.set_selected_value(&tracked.handle, &self.non_value.value);
            tracked.last_committed = None;
        }
        self.prune();
        self.ensure_trailing_control();
    }

    pub fn snapshot(&self) -> Vec<ControlSnapshot> {
        self.controls
            .iter()
            .enumerate()
            .map(|(position, t)| ControlSnapshot {
                position,
                selected: self.selected_value_of(&t.handle),
                options: self.host.list_option_entries(&t.handle),
            })
            .collect()
    }

    /// Verifies the settled-state invariants against the engine's own list and
    /// the host's view of the container.
    pub fn check_invariants(&self) -> std::result::Result<(), InvariantViolation> {
        let live = self.host.enumerate_live_controls(&self.container);
        if live != self.controls() {
            return Err(InvariantViolation::LiveControlsMismatch {
                host: live.len(),
                tracked: self.controls.len(),
            });
        }

        let selected = self.selected_values();
        if self.distinct_options {
            for (i, value) in selected.iter().enumerate() {
                if selected[i + 1..].contains(value) {
                    return Err(InvariantViolation::DuplicateSelection {
                        value: value.clone(),
                    });
                }
            }
        }

        let empty = self
            .controls
            .iter()
            .filter(|t| self.is_empty_control(&t.handle))
            .count();
        if self.is_exhausted() {
            if empty != 0 {
                return Err(InvariantViolation::EmptyAfterExhaustion { empty });
            }
        } else {
            let last_is_empty = self
                .controls
                .last()
                .is_some_and(|t| self.is_empty_control(&t.handle));
            if empty != 1 || !last_is_empty {
                return Err(InvariantViolation::TrailingControl {
                    empty,
                    last_is_empty,
                });
            }
        }

        for (position, tracked) in self.controls.iter().enumerate() {
            let offered: Vec<OptionValue> = self
                .host
                .list_option_entries(&tracked.handle)
                .into_iter()
                .map(|e| e.value)
                .collect();
            for (i, value) in offered.iter().enumerate() {
                if offered[i + 1..].contains(value) {
                    return Err(InvariantViolation::DuplicateOption {
                        position,
                        value: value.clone(),
                    });
                }
            }

            if !self.distinct_options {
                continue;
            }
            let own = self.selected_value_of(&tracked.handle);
            let mut expected = vec![self.non_value.value.clone()];
            expected.extend(
                self.pool
                    .entries()
                    .iter()
                    .filter(|e| !selected.contains(&e.value) || e.value == own)
                    .map(|e| e.value.clone()),
            );
            let missing: Vec<OptionValue> = expected
                .iter()
                .filter(|v| !offered.contains(v))
                .cloned()
                .collect();
            let unexpected: Vec<OptionValue> = offered
                .iter()
                .filter(|v| !expected.contains(v))
                .cloned()
                .collect();
            if !missing.is_empty() || !unexpected.is_empty() {
                return Err(InvariantViolation::OptionMismatch {
                    position,
                    missing,
                    unexpected,
                });
            }
        }

        Ok(())
    }

    fn position(&self, control: &H::Control) -> Option<usize> {
        self.controls.iter().position(|t| &t.handle == control)
    }

    fn selected_value_of(&self, control: &H::Control) -> OptionValue {
        self.host
            .get_selected_value(control)
            .unwrap_or_else(|| self.non_value.value.clone())
    }

    fn is_empty_control(&self, control: &H::Control) -> bool {
        self.non_value.matches(&self.selected_value_of(control))
    }

    /// Distinct mode with every pool option held somewhere. An empty pool is
    /// never exhausted.
    fn is_exhausted(&self) -> bool {
        self.distinct_options
            && !self.pool.is_empty()
            && self.selected_values().len() >= self.pool.len()
    }

    /// Appends a fresh clone when the last control holds a value and the pool
    /// still has something to offer.
    fn ensure_trailing_control(&mut self) -> Option<H::Control> {
        if self.is_exhausted() {
            return None;
        }
        let needs_trailing = self
            .controls
            .last()
            .map_or(true, |t| !self.is_empty_control(&t.handle));
        needs_trailing.then(|| self.append_clone())
    }

    fn append_clone(&mut self) -> H::Control {
        let clone = self.host.clone_control(&self.template);
        self.host.set_selected_value(&clone, &self.non_value.value);
        self.normalize_options(&clone, None);
        self.host.on_value_changed(&clone);
        self.host.append_control(&self.container, &clone);
        self.controls.push(TrackedControl {
            handle: clone.clone(),
            last_committed: None,
        });
        debug!(control = ?clone, controls = self.controls.len(), "appended selection control");
        clone
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
