//! Load catalog, booking state, and search.
//!
//! [`LoadBoard`] is the single owner of booking state. Every read or write of
//! the booked set goes through its mutex so the availability check and the
//! booking write in [`LoadBoard::book`] happen as one step.

pub mod booking;
pub mod catalog;
pub mod matching;
pub mod notes;
pub mod search;

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::info;

use crate::domain::load::{Load, LoadId};
use crate::errors::DomainError;

pub use self::booking::BookingTracker;
pub use self::catalog::{Catalog, CatalogError};
pub use self::matching::{LocationMatcher, SubstringMatcher};
pub use self::notes::generate_notes;
pub use self::search::{LoadMatch, SearchCriteria, SearchEngine};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingReceipt {
    pub load_id: LoadId,
    pub booked_count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingSnapshot {
    pub catalog_size: usize,
    pub booked_ids: Vec<LoadId>,
}

pub struct LoadBoard<M = SubstringMatcher> {
    catalog: Catalog,
    bookings: Mutex<BookingTracker>,
    engine: SearchEngine<M>,
}

impl LoadBoard<SubstringMatcher> {
    pub fn new(catalog: Catalog) -> Self {
        Self::with_matcher(catalog, SubstringMatcher)
    }
}

impl<M: LocationMatcher> LoadBoard<M> {
    pub fn with_matcher(catalog: Catalog, matcher: M) -> Self {
        Self {
            catalog,
            bookings: Mutex::new(BookingTracker::default()),
            engine: SearchEngine::new(matcher),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn get(&self, load_id: &LoadId) -> Option<&Load> {
        self.catalog.get(load_id)
    }

    pub fn is_available(&self, load_id: &LoadId) -> bool {
        self.bookings().is_available(load_id)
    }

    pub fn search(
        &self,
        criteria: &SearchCriteria,
        max_results: usize,
        include_booked: bool,
    ) -> Vec<LoadMatch> {
        let bookings = self.bookings();
        self.engine.search(&self.catalog, &bookings, criteria, max_results, include_booked)
    }

    pub fn list_all(&self, max_results: usize, include_booked: bool) -> Vec<LoadMatch> {
        let bookings = self.bookings();
        self.engine.list_all(&self.catalog, &bookings, max_results, include_booked)
    }

    /// Commit a load to a carrier. Unknown ids and already-booked loads are
    /// rejected; the check and the write share one lock guard.
    pub fn book(&self, load_id: &LoadId) -> Result<BookingReceipt, DomainError> {
        if !self.catalog.contains(load_id) {
            return Err(DomainError::LoadNotFound(load_id.clone()));
        }

        let mut bookings = self.bookings();
        if !bookings.mark_booked(load_id) {
            return Err(DomainError::AlreadyBooked(load_id.clone()));
        }
        let booked_count = bookings.booked_count();
        drop(bookings);

        info!(
            event_name = "loads.booking.marked",
            load_id = %load_id,
            booked_count,
            "load marked as booked"
        );
        Ok(BookingReceipt { load_id: load_id.clone(), booked_count })
    }

    pub fn release(&self, load_id: &LoadId) -> bool {
        let released = self.bookings().release(load_id);
        if released {
            info!(event_name = "loads.booking.released", load_id = %load_id, "booking released");
        }
        released
    }

    pub fn reset(&self) {
        let mut bookings = self.bookings();
        let cleared = bookings.booked_count();
        bookings.reset();
        info!(event_name = "loads.booking.reset", cleared, "booking state cleared");
    }

    pub fn snapshot(&self) -> BookingSnapshot {
        BookingSnapshot { catalog_size: self.catalog.len(), booked_ids: self.bookings().booked_ids() }
    }

    fn bookings(&self) -> MutexGuard<'_, BookingTracker> {
        // A panic while holding the guard cannot leave the set half-written.
        self.bookings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
