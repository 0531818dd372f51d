use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::IndexError;

/// The full set of doc-ids discovered during indexing.
///
/// Used only by `Not`: a top-level negation or an all-negative `And`
/// materializes its complement against this set.
#[derive(Debug, Default, Clone)]
pub struct Universe {
    ids: HashSet<u32>,
}

impl Universe {
    pub fn new() -> Self {
        Universe { ids: HashSet::new() }
    }

    pub fn insert(&mut self, doc_id: u32) {
        self.ids.insert(doc_id);
    }

    pub fn contains(&self, doc_id: u32) -> bool {
        self.ids.contains(&doc_id)
    }

    pub fn as_set(&self) -> &HashSet<u32> {
        &self.ids
    }

    /// Writes the universe as a single comma-separated line.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), IndexError> {
        let mut ids: Vec<u32> = self.ids.iter().copied().collect();
        ids.sort_unstable();
        let joined = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        fs::write(path, joined)?;
        Ok(())
    }

    /// Loads a universe previously written by `save`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, IndexError> {
        let content = fs::read_to_string(path)?;
        let ids = content
            .trim()
            .split(',')
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse().ok())
            .collect();
        Ok(Universe { ids })
    }

    /// Returns `universe - excluded`, sorted ascending.
    pub fn complement_of(&self, excluded: &[u32]) -> Vec<u32> {
        let excluded: HashSet<u32> = excluded.iter().copied().collect();
        let mut result: Vec<u32> = self
            .ids
            .iter()
            .copied()
            .filter(|id| !excluded.contains(id))
            .collect();
        result.sort_unstable();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn round_trips_through_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("document_id_list.txt");

        let mut universe = Universe::new();
        universe.insert(3);
        universe.insert(1);
        universe.insert(2);
        universe.save(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "1,2,3");

        let loaded = Universe::load(&path).unwrap();
        assert!(loaded.contains(1));
        assert!(loaded.contains(2));
        assert!(loaded.contains(3));
        assert!(!loaded.contains(4));
    }

    #[test]
    fn complement_excludes_given_ids_and_stays_sorted() {
        let mut universe = Universe::new();
        for id in 0..5 {
            universe.insert(id);
        }
        assert_eq!(universe.complement_of(&[1, 3]), vec![0, 2, 4]);
    }

    #[test]
    fn empty_universe_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("document_id_list.txt");
        let universe = Universe::new();
        universe.save(&path).unwrap();
        let loaded = Universe::load(&path).unwrap();
        assert!(loaded.as_set().is_empty());
    }
}
