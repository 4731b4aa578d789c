use std::collections::BTreeSet;

use crate::domain::load::LoadId;

/// Ids of loads committed to a carrier since the last reset.
#[derive(Clone, Debug, Default)]
pub struct BookingTracker {
    booked: BTreeSet<LoadId>,
}

impl BookingTracker {
    pub fn is_available(&self, load_id: &LoadId) -> bool {
        !self.booked.contains(load_id)
    }

    /// Returns `false` when the load was already booked.
    pub fn mark_booked(&mut self, load_id: &LoadId) -> bool {
        self.booked.insert(load_id.clone())
    }

    /// Undo a booking whose call record never made it to the log.
    pub fn release(&mut self, load_id: &LoadId) -> bool {
        self.booked.remove(load_id)
    }

    pub fn reset(&mut self) {
        self.booked.clear();
    }

    pub fn booked_ids(&self) -> Vec<LoadId> {
        self.booked.iter().cloned().collect()
    }

    pub fn booked_count(&self) -> usize {
        self.booked.len()
    }
}
