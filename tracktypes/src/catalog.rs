use crate::record::SatelliteRecord;
use serde::Serialize;
use std::collections::BTreeMap;

pub type SatelliteName = String;

/// Satellite records keyed by name.
///
/// Ordered by name so cycling through the selection is stable across refreshes.
#[derive(Clone, PartialEq, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    records: BTreeMap<SatelliteName, SatelliteRecord>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&SatelliteRecord> {
        self.records.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.records.keys().map(String::as_str)
    }

    /// Returns the record for `name`, inserting an empty one if missing
    pub fn record_mut(&mut self, name: &str) -> &mut SatelliteRecord {
        self.records
            .entry(name.to_owned())
            .or_insert_with(|| SatelliteRecord::new(name))
    }

    /// Start a fresh record for `name`, dropping anything previously known
    pub fn reset_record(&mut self, name: &str) -> &mut SatelliteRecord {
        let rec = self.record_mut(name);
        *rec = SatelliteRecord::new(name);
        rec
    }

    pub fn insert(&mut self, record: SatelliteRecord) -> Option<SatelliteRecord> {
        self.records.insert(record.name.clone(), record)
    }

    /// Replace the whole catalog with `other`
    pub fn replace(&mut self, other: Catalog) {
        *self = other;
    }

    /// Merge `other` into this catalog record by record.
    /// Satellites unknown so far are inserted as is.
    pub fn merge(&mut self, other: Catalog) {
        for (name, rec) in other.records.into_iter() {
            match self.records.get_mut(&name) {
                Some(existing) => existing.merge(rec),
                None => {
                    self.records.insert(name, rec);
                }
            }
        }
    }
}

impl FromIterator<SatelliteRecord> for Catalog {
    fn from_iter<T: IntoIterator<Item = SatelliteRecord>>(iter: T) -> Self {
        let mut c = Catalog::new();
        for rec in iter {
            c.insert(rec);
        }
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lla::Lla;

    fn rec(name: &str, lat: f64) -> SatelliteRecord {
        let mut r = SatelliteRecord::new(name);
        r.lla = Some(Lla::new(lat, 0.0, 0.0));
        r
    }

    #[test]
    fn names_are_ordered() {
        let c: Catalog = [rec("b", 0.0), rec("a", 0.0), rec("c", 0.0)]
            .into_iter()
            .collect();
        assert_eq!(c.names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn replace_drops_old_satellites() {
        let mut c: Catalog = [rec("a", 1.0), rec("b", 2.0)].into_iter().collect();
        c.replace([rec("c", 3.0)].into_iter().collect());
        assert_eq!(c.len(), 1);
        assert!(c.get("a").is_none());
        assert!(c.contains("c"));
    }

    #[test]
    fn merge_updates_and_inserts() {
        let mut c: Catalog = [rec("a", 1.0), rec("b", 2.0)].into_iter().collect();
        c.record_mut("b").distance_to_ground = Some(500.0);

        c.merge([rec("b", 20.0), rec("d", 4.0)].into_iter().collect());
        assert_eq!(c.len(), 3);
        assert_eq!(c.get("a").unwrap().lla, Some(Lla::new(1.0, 0.0, 0.0)));
        let b = c.get("b").unwrap();
        assert_eq!(b.lla, Some(Lla::new(20.0, 0.0, 0.0)));
        assert_eq!(b.distance_to_ground, Some(500.0));
        assert!(c.contains("d"));
    }

    #[test]
    fn reset_record_clears_fields() {
        let mut c = Catalog::new();
        c.record_mut("a").distance_to_station = Some(3.0);
        assert!(c.reset_record("a").is_empty());
        assert_eq!(c.len(), 1);
    }
}
