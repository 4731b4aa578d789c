use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::load::{Load, LoadId};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read load catalog `{path}`: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not parse load catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The load set posted at startup. Read-only after construction.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    loads: Vec<Load>,
    index: HashMap<LoadId, usize>,
}

impl Catalog {
    pub fn new(loads: Vec<Load>) -> Self {
        let mut index = HashMap::with_capacity(loads.len());
        for (position, load) in loads.iter().enumerate() {
            index.entry(load.load_id.clone()).or_insert(position);
        }
        Self { loads, index }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let loads: Vec<Load> = serde_json::from_str(raw)?;
        Ok(Self::new(loads))
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| CatalogError::Read { path: path.to_path_buf(), source })?;
        Self::from_json_str(&raw)
    }

    pub fn get(&self, load_id: &LoadId) -> Option<&Load> {
        self.index.get(load_id).map(|&position| &self.loads[position])
    }

    pub fn contains(&self, load_id: &LoadId) -> bool {
        self.index.contains_key(load_id)
    }

    pub fn all(&self) -> &[Load] {
        &self.loads
    }

    pub fn len(&self) -> usize {
        self.loads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loads.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{Catalog, CatalogError};
    use crate::domain::load::LoadId;
    use crate::loads::test_support::load;

    #[test]
    fn get_returns_none_for_unknown_ids() {
        let catalog = Catalog::new(vec![load("L1", "Los Angeles, CA", 1000)]);

        assert!(catalog.get(&LoadId::from("L1")).is_some());
        assert!(catalog.get(&LoadId::from("missing")).is_none());
    }

    #[test]
    fn all_preserves_load_order() {
        let catalog = Catalog::new(vec![
            load("L2", "Austin, TX", 2000),
            load("L1", "Los Angeles, CA", 1000),
        ]);

        let ids: Vec<&str> = catalog.all().iter().map(|load| load.load_id.as_str()).collect();
        assert_eq!(ids, vec!["L2", "L1"]);
    }

    #[test]
    fn first_duplicate_wins_lookup() {
        let catalog =
            Catalog::new(vec![load("L1", "Dallas, TX", 1500), load("L1", "Reno, NV", 900)]);

        let found = catalog.get(&LoadId::from("L1")).expect("duplicate id should resolve");
        assert_eq!(found.origin, "Dallas, TX");
    }

    #[test]
    fn load_reads_json_array_from_disk() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("loads.json");
        let catalog = Catalog::new(vec![load("L1", "Dallas, TX", 1500)]);
        fs::write(&path, serde_json::to_string(catalog.all()).expect("serialize"))
            .expect("write catalog");

        let loaded = Catalog::load(&path).expect("catalog should load");

        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains(&LoadId::from("L1")));
    }

    #[test]
    fn load_reports_missing_file_and_bad_json() {
        let dir = TempDir::new().expect("temp dir");

        let missing = Catalog::load(&dir.path().join("nope.json"));
        assert!(matches!(missing, Err(CatalogError::Read { .. })));

        let malformed = Catalog::from_json_str("{not json");
        assert!(matches!(malformed, Err(CatalogError::Parse(_))));
    }
}
