use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Insertion-ordered map from a key (article URL or topic name) to bullets.
///
/// Re-inserting an existing key replaces its bullets without moving it, so
/// iteration order is always the order in which keys first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulletMap {
    entries: Vec<(String, Vec<String>)>,
}

impl BulletMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, bullets: Vec<String>) -> Option<Vec<String>> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, bullets)),
            None => {
                self.entries.push((key, bullets));
                None
            }
        }
    }

    /// Bullets for `key`, creating an empty slot at the end if it is new.
    pub fn entry(&mut self, key: &str) -> &mut Vec<String> {
        let idx = match self.entries.iter().position(|(k, _)| k == key) {
            Some(idx) => idx,
            None => {
                self.entries.push((key.to_string(), Vec::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, bullets)| bullets.as_slice())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Vec<String>)> for BulletMap {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        let mut map = BulletMap::new();
        for (key, bullets) in iter {
            map.insert(key, bullets);
        }
        map
    }
}

impl Serialize for BulletMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, bullets) in &self.entries {
            map.serialize_entry(key, bullets)?;
        }
        map.end()
    }
}

struct BulletMapVisitor;

impl<'de> Visitor<'de> for BulletMapVisitor {
    type Value = BulletMap;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of strings to string lists")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = BulletMap::new();
        while let Some((key, bullets)) = access.next_entry::<String, Vec<String>>()? {
            map.insert(key, bullets);
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for BulletMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(BulletMapVisitor)
    }
}
