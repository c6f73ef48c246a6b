use std::{collections::HashSet, fmt};

use shared::domain::{
    NonValue, NonValuePlacement, OptionOrder, OptionPool, OptionValue, ValueOrdering,
};
use tracing::warn;

/// Populates or replaces the configured pool before the first control is built.
pub type PoolLoader = Box<dyn FnOnce(OptionPool) -> OptionPool>;

pub struct EngineConfig {
    pub pool: OptionPool,
    pub non_value: NonValue,
    /// When set, a value may be held by at most one control.
    pub distinct_options: bool,
    pub option_order: OptionOrder,
    pub value_ordering: ValueOrdering,
    pub non_value_placement: NonValuePlacement,
    loader: Option<PoolLoader>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pool: OptionPool::default(),
            non_value: NonValue::default(),
            distinct_options: true,
            option_order: OptionOrder::default(),
            value_ordering: ValueOrdering::default(),
            non_value_placement: NonValuePlacement::default(),
            loader: None,
        }
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("pool", &self.pool)
            .field("non_value", &self.non_value)
            .field("distinct_options", &self.distinct_options)
            .field("option_order", &self.option_order)
            .field("value_ordering", &self.value_ordering)
            .field("non_value_placement", &self.non_value_placement)
            .field("loader", &self.loader.is_some())
            .finish()
    }
}

impl EngineConfig {
    pub fn new(pool: OptionPool) -> Self {
        Self {
            pool,
            ..Default::default()
        }
    }

    pub fn with_non_value(mut self, non_value: NonValue) -> Self {
        self.non_value = non_value;
        self
    }

    pub fn with_distinct_options(mut self, distinct: bool) -> Self {
        self.distinct_options = distinct;
        self
    }

    pub fn with_option_order(mut self, order: OptionOrder) -> Self {
        self.option_order = order;
        self
    }

    pub fn with_value_ordering(mut self, ordering: ValueOrdering) -> Self {
        self.value_ordering = ordering;
        self
    }

    pub fn with_non_value_placement(mut self, placement: NonValuePlacement) -> Self {
        self.non_value_placement = placement;
        self
    }

    pub fn with_loader(mut self, loader: impl FnOnce(OptionPool) -> OptionPool + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    /// Runs the loader (if any), then strips entries that collide with the
    /// sentinel or repeat an earlier entry's value.
    pub(crate) fn resolve_pool(&mut self) -> OptionPool {
        let mut pool = std::mem::take(&mut self.pool);
        if let Some(loader) = self.loader.take() {
            pool = loader(pool);
        }

        let non_value = &self.non_value;
        let mut seen: HashSet<OptionValue> = HashSet::new();
        pool.retain(|entry| {
            if non_value.matches(&entry.value) {
                warn!(
                    label = %entry.label,
                    value = %entry.value,
                    "dropping pool entry that reuses the non-value token"
                );
                return false;
            }
            if !seen.insert(entry.value.clone()) {
                warn!(
                    label = %entry.label,
                    value = %entry.value,
                    "dropping pool entry with a repeated value"
                );
                return false;
            }
            true
        });
        pool
    }
}
