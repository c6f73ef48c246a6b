//! Rendering boundary driven by the engine.
//!
//! A host owns the actual widgets (DOM `<select>` elements, immediate-mode
//! combo boxes, the in-memory [`crate::memory_host::MemoryHost`], ...). The
//! engine only ever talks to controls through these handles and never
//! re-queries the host to decide what it manages.

use std::fmt;

use shared::domain::{OptionEntry, OptionValue};

pub trait HostSurface {
    type Control: Clone + PartialEq + fmt::Debug;
    type Container: fmt::Debug;

    /// Builds a detached control offering `entries` in the given order.
    fn create_control(&mut self, entries: &[OptionEntry]) -> Self::Control;

    /// Independent, detached copy of `template`.
    fn clone_control(&mut self, template: &Self::Control) -> Self::Control;

    fn append_control(&mut self, container: &Self::Container, control: &Self::Control);

    fn remove_control(&mut self, control: &Self::Control);

    /// `None` when the control offers nothing at all.
    fn get_selected_value(&self, control: &Self::Control) -> Option<OptionValue>;

    fn set_selected_value(&mut self, control: &Self::Control, value: &OptionValue);

    fn list_option_entries(&self, control: &Self::Control) -> Vec<OptionEntry>;

    /// Must be a no-op when `entry.value` is already offered.
    fn add_option_entry(&mut self, control: &Self::Control, entry: &OptionEntry);

    fn remove_option_entry(&mut self, control: &Self::Control, value: &OptionValue);

    /// Reorders entries to follow `ordered_values`; the selection moves with its entry.
    fn reorder_options(&mut self, control: &Self::Control, ordered_values: &[OptionValue]);

    /// Subscribes `control`. The host delivers every later value change of it to
    /// [`crate::SelectionSetEngine::on_control_changed`].
    fn on_value_changed(&mut self, control: &Self::Control);

    fn enumerate_live_controls(&self, container: &Self::Container) -> Vec<Self::Control>;
}
