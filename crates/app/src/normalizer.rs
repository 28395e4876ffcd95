//! Stamps raw device values into [`Reading`]s.

use telebridge_domain::id::SignalId;
use telebridge_domain::reading::Reading;
use telebridge_domain::time::Clock;

/// Turns raw values into readings stamped at normalization time.
///
/// Values are passed through untouched; range checks are not this layer's job.
#[derive(Debug, Default)]
pub struct Normalizer {
    clock: Clock,
}

impl Normalizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the reading for `id`, stamped with the current wall-clock time.
    pub fn normalize<V>(&self, id: SignalId, value: V) -> Reading<V> {
        Reading::new(id, self.clock.stamp(), value)
    }
}
