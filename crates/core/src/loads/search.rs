use serde::Deserialize;

use crate::domain::load::{date_part, Load};

use super::booking::BookingTracker;
use super::catalog::Catalog;
use super::matching::{LocationMatcher, SubstringMatcher};

/// Filters for a load search. Blank strings are treated as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SearchCriteria {
    pub origin_city: Option<String>,
    pub origin_state: Option<String>,
    pub destination_city: Option<String>,
    pub destination_state: Option<String>,
    pub equipment_type: Option<String>,
    pub pickup_date: Option<String>,
}

impl SearchCriteria {
    pub fn has_origin(&self) -> bool {
        present(&self.origin_city).is_some() || present(&self.origin_state).is_some()
    }

    fn has_destination(&self) -> bool {
        present(&self.destination_city).is_some() || present(&self.destination_state).is_some()
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.trim().is_empty())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadMatch {
    pub load: Load,
    pub is_booked: bool,
}

#[derive(Clone, Debug, Default)]
pub struct SearchEngine<M = SubstringMatcher> {
    matcher: M,
}

impl<M: LocationMatcher> SearchEngine<M> {
    pub fn new(matcher: M) -> Self {
        Self { matcher }
    }

    /// Without an origin filter every load is returned (booking status is the
    /// only filter applied); see [`SearchEngine::list_all`].
    pub fn search(
        &self,
        catalog: &Catalog,
        bookings: &BookingTracker,
        criteria: &SearchCriteria,
        max_results: usize,
        include_booked: bool,
    ) -> Vec<LoadMatch> {
        if !criteria.has_origin() {
            return self.list_all(catalog, bookings, max_results, include_booked);
        }

        let matches = catalog
            .all()
            .iter()
            .filter_map(|load| {
                let is_booked = !bookings.is_available(&load.load_id);
                if is_booked && !include_booked {
                    return None;
                }
                self.accepts(load, criteria)
                    .then(|| LoadMatch { load: load.clone(), is_booked })
            })
            .collect();

        rank(matches, max_results)
    }

    pub fn list_all(
        &self,
        catalog: &Catalog,
        bookings: &BookingTracker,
        max_results: usize,
        include_booked: bool,
    ) -> Vec<LoadMatch> {
        let matches = catalog
            .all()
            .iter()
            .map(|load| LoadMatch {
                load: load.clone(),
                is_booked: !bookings.is_available(&load.load_id),
            })
            .filter(|candidate| include_booked || !candidate.is_booked)
            .collect();

        rank(matches, max_results)
    }

    fn accepts(&self, load: &Load, criteria: &SearchCriteria) -> bool {
        let origin_matches = self.matches_either(
            present(&criteria.origin_city),
            present(&criteria.origin_state),
            &load.origin,
        );
        if !origin_matches {
            return false;
        }

        if let Some(equipment) = present(&criteria.equipment_type) {
            if equipment.to_lowercase() != load.equipment_type.to_lowercase() {
                return false;
            }
        }

        if criteria.has_destination()
            && !self.matches_either(
                present(&criteria.destination_city),
                present(&criteria.destination_state),
                &load.destination,
            )
        {
            return false;
        }

        if let Some(pickup_date) = present(&criteria.pickup_date) {
            if date_part(&load.pickup_datetime) != date_part(pickup_date) {
                return false;
            }
        }

        true
    }

    fn matches_either(&self, city: Option<&str>, state: Option<&str>, field: &str) -> bool {
        city.is_some_and(|city| self.matcher.matches(city, field))
            || state.is_some_and(|state| self.matcher.matches(state, field))
    }
}

/// Highest rate first; `sort_by` is stable so equal rates keep catalog order.
fn rank(mut matches: Vec<LoadMatch>, max_results: usize) -> Vec<LoadMatch> {
    matches.sort_by(|left, right| right.load.loadboard_rate.cmp(&left.load.loadboard_rate));
    matches.truncate(max_results);
    matches
}

#[cfg(test)]
mod tests {
    use super::{LoadMatch, SearchCriteria, SearchEngine};
    use crate::domain::load::LoadId;
    use crate::loads::booking::BookingTracker;
    use crate::loads::catalog::Catalog;
    use crate::loads::matching::{LocationMatcher, SubstringMatcher};
    use crate::loads::test_support::{load, load_with};

    fn ids(matches: &[LoadMatch]) -> Vec<&str> {
        matches.iter().map(|hit| hit.load.load_id.as_str()).collect()
    }

    fn two_load_catalog() -> Catalog {
        Catalog::new(vec![load("L1", "Los Angeles, CA", 1000), load("L2", "Austin, TX", 2000)])
    }

    fn origin_state(state: &str) -> SearchCriteria {
        SearchCriteria { origin_state: Some(state.to_string()), ..SearchCriteria::default() }
    }

    #[test]
    fn origin_state_filter_selects_matching_load() {
        let engine = SearchEngine::new(SubstringMatcher);
        let result = engine.search(
            &two_load_catalog(),
            &BookingTracker::default(),
            &origin_state("TX"),
            10,
            false,
        );

        assert_eq!(ids(&result), vec!["L2"]);
    }

    #[test]
    fn missing_origin_lists_available_loads_by_rate() {
        let mut bookings = BookingTracker::default();
        bookings.mark_booked(&LoadId::from("L1"));

        let result = SearchEngine::new(SubstringMatcher).search(
            &two_load_catalog(),
            &bookings,
            &SearchCriteria::default(),
            10,
            false,
        );

        assert_eq!(ids(&result), vec!["L2"]);
    }

    #[test]
    fn missing_origin_ignores_other_filters() {
        let criteria = SearchCriteria {
            equipment_type: Some("Flatbed".to_string()),
            destination_state: Some("ZZ".to_string()),
            ..SearchCriteria::default()
        };

        let result = SearchEngine::new(SubstringMatcher).search(
            &two_load_catalog(),
            &BookingTracker::default(),
            &criteria,
            10,
            false,
        );

        assert_eq!(ids(&result), vec!["L2", "L1"]);
    }

    #[test]
    fn blank_origin_counts_as_missing() {
        let criteria = SearchCriteria {
            origin_city: Some("   ".to_string()),
            ..SearchCriteria::default()
        };
        assert!(!criteria.has_origin());
    }

    #[test]
    fn booked_loads_are_hidden_unless_requested() {
        let catalog = Catalog::new(vec![
            load("L1", "Dallas, TX", 1000),
            load("L2", "Houston, TX", 2000),
            load("L3", "El Paso, TX", 1500),
        ]);
        let mut bookings = BookingTracker::default();
        bookings.mark_booked(&LoadId::from("L2"));
        let engine = SearchEngine::new(SubstringMatcher);

        let hidden = engine.search(&catalog, &bookings, &origin_state("TX"), 10, false);
        assert_eq!(ids(&hidden), vec!["L3", "L1"]);
        assert!(hidden.iter().all(|hit| !hit.is_booked));

        let shown = engine.search(&catalog, &bookings, &origin_state("TX"), 10, true);
        assert_eq!(ids(&shown), vec!["L2", "L3", "L1"]);
        assert!(shown[0].is_booked);
        assert!(!shown[1].is_booked);
    }

    #[test]
    fn city_or_state_is_sufficient_for_origin() {
        let catalog =
            Catalog::new(vec![load("L1", "Chicago, IL", 1000), load("L2", "Denver, CO", 2000)]);
        let criteria = SearchCriteria {
            origin_city: Some("chicago".to_string()),
            origin_state: Some("CO".to_string()),
            ..SearchCriteria::default()
        };

        let result =
            SearchEngine::new(SubstringMatcher).search(&catalog, &BookingTracker::default(), &criteria, 10, false);

        assert_eq!(ids(&result), vec!["L2", "L1"]);
    }

    #[test]
    fn state_filter_is_a_plain_substring_match() {
        // "Dextx Springs, NM" contains "tx" so a TX search picks it up.
        let catalog = Catalog::new(vec![
            load("L1", "Dextx Springs, NM", 1200),
            load("L2", "Reno, NV", 900),
        ]);

        let result = SearchEngine::new(SubstringMatcher).search(
            &catalog,
            &BookingTracker::default(),
            &origin_state("TX"),
            10,
            false,
        );

        assert_eq!(ids(&result), vec!["L1"]);
    }

    #[test]
    fn equipment_requires_exact_case_insensitive_match() {
        let catalog = Catalog::new(vec![
            load_with("L1", "Dallas, TX", "Atlanta, GA", "Dry Van", "2026-10-20T08:00:00", 1000),
            load_with("L2", "Dallas, TX", "Atlanta, GA", "Dry Van Team", "2026-10-20T08:00:00", 2000),
        ]);
        let criteria = SearchCriteria {
            origin_city: Some("Dallas".to_string()),
            equipment_type: Some("dry van".to_string()),
            ..SearchCriteria::default()
        };

        let result =
            SearchEngine::new(SubstringMatcher).search(&catalog, &BookingTracker::default(), &criteria, 10, false);

        assert_eq!(ids(&result), vec!["L1"]);
    }

    #[test]
    fn destination_and_pickup_date_narrow_results() {
        let catalog = Catalog::new(vec![
            load_with("L1", "Dallas, TX", "Atlanta, GA", "Reefer", "2026-10-20T08:00:00", 1000),
            load_with("L2", "Dallas, TX", "Miami, FL", "Reefer", "2026-10-20T14:00:00", 3000),
            load_with("L3", "Dallas, TX", "Atlanta, GA", "Reefer", "2026-10-21T08:00:00", 2000),
        ]);
        let criteria = SearchCriteria {
            origin_state: Some("TX".to_string()),
            destination_state: Some("GA".to_string()),
            pickup_date: Some("2026-10-20T23:59:00Z".to_string()),
            ..SearchCriteria::default()
        };

        let result =
            SearchEngine::new(SubstringMatcher).search(&catalog, &BookingTracker::default(), &criteria, 10, false);

        assert_eq!(ids(&result), vec!["L1"]);
    }

    #[test]
    fn results_are_rate_descending_and_stable_on_ties() {
        let catalog = Catalog::new(vec![
            load("A", "Dallas, TX", 1500),
            load("B", "Dallas, TX", 2500),
            load("C", "Dallas, TX", 1500),
            load("D", "Dallas, TX", 900),
        ]);

        let result = SearchEngine::new(SubstringMatcher).search(
            &catalog,
            &BookingTracker::default(),
            &origin_state("TX"),
            10,
            false,
        );

        assert_eq!(ids(&result), vec!["B", "A", "C", "D"]);
        assert!(result
            .windows(2)
            .all(|pair| pair[0].load.loadboard_rate >= pair[1].load.loadboard_rate));
    }

    #[test]
    fn results_are_capped_at_max_results() {
        let catalog = Catalog::new(
            (0..25).map(|n| load(&format!("L{n}"), "Dallas, TX", 1000 + n)).collect(),
        );
        let engine = SearchEngine::new(SubstringMatcher);
        let bookings = BookingTracker::default();

        for cap in [0, 1, 10, 100] {
            let filtered = engine.search(&catalog, &bookings, &origin_state("TX"), cap, false);
            assert!(filtered.len() <= cap);
            let everything = engine.list_all(&catalog, &bookings, cap, true);
            assert!(everything.len() <= cap);
        }
    }

    #[test]
    fn custom_matcher_replaces_substring_rule() {
        struct StateToken;

        impl LocationMatcher for StateToken {
            fn matches(&self, filter: &str, field: &str) -> bool {
                field
                    .rsplit(',')
                    .next()
                    .is_some_and(|state| state.trim().eq_ignore_ascii_case(filter))
            }
        }

        let catalog = Catalog::new(vec![
            load("L1", "Dextx Springs, NM", 1200),
            load("L2", "Austin, TX", 900),
        ]);

        let result = SearchEngine::new(StateToken).search(
            &catalog,
            &BookingTracker::default(),
            &origin_state("TX"),
            10,
            false,
        );

        assert_eq!(ids(&result), vec!["L2"]);
    }
}
