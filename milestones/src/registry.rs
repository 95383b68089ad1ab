//! The milestone registry and its two edits.
//!
//! Entries live in an ordered map keyed by [`MilestoneNumber`], so the
//! registry is always in canonical (ascending numeric) order: `9` sorts
//! before `10`, which a map keyed by the decimal strings would get wrong.
//! Both edits check before they mutate, so a failed edit leaves the
//! registry untouched.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{MilestoneError, Result};
use crate::record::{MilestoneNumber, MilestoneRecord};

/// Active milestones, in ascending milestone order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MilestoneRegistry {
    entries: BTreeMap<MilestoneNumber, MilestoneRecord>,
}

impl MilestoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the canonical registry from entries given in any order.
    ///
    /// Sorting an already sorted registry yields an equal registry. When the
    /// same milestone appears more than once the last entry wins; callers
    /// that need to reject duplicates do so while parsing (see the
    /// `Deserialize` impl).
    pub fn sort<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (MilestoneNumber, MilestoneRecord)>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Activate `milestone`, cut from `branch`.
    ///
    /// Returns the newly created record.
    pub fn add(&mut self, milestone: MilestoneNumber, branch: &str) -> Result<&MilestoneRecord> {
        match self.entries.entry(milestone) {
            Entry::Occupied(_) => Err(MilestoneError::AlreadyExists { milestone }),
            Entry::Vacant(slot) => Ok(&*slot.insert(MilestoneRecord::new(milestone, branch))),
        }
    }

    /// Deactivate `milestone`, returning the record that was removed.
    pub fn remove(&mut self, milestone: MilestoneNumber) -> Result<MilestoneRecord> {
        self.entries
            .remove(&milestone)
            .ok_or(MilestoneError::NotFound { milestone })
    }

    pub fn get(&self, milestone: MilestoneNumber) -> Option<&MilestoneRecord> {
        self.entries.get(&milestone)
    }

    pub fn contains(&self, milestone: MilestoneNumber) -> bool {
        self.entries.contains_key(&milestone)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending milestone order.
    pub fn iter(&self) -> impl Iterator<Item = (MilestoneNumber, &MilestoneRecord)> {
        self.entries.iter().map(|(milestone, record)| (*milestone, record))
    }

    /// Active milestone numbers, ascending.
    pub fn milestones(&self) -> impl Iterator<Item = MilestoneNumber> + '_ {
        self.entries.keys().copied()
    }
}

impl FromIterator<(MilestoneNumber, MilestoneRecord)> for MilestoneRegistry {
    fn from_iter<I: IntoIterator<Item = (MilestoneNumber, MilestoneRecord)>>(iter: I) -> Self {
        Self::sort(iter)
    }
}

impl IntoIterator for MilestoneRegistry {
    type Item = (MilestoneNumber, MilestoneRecord);
    type IntoIter = std::collections::btree_map::IntoIter<MilestoneNumber, MilestoneRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for MilestoneRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(&self.entries)
    }
}

impl<'de> Deserialize<'de> for MilestoneRegistry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(RegistryVisitor)
    }
}

struct RegistryVisitor;

impl<'de> Visitor<'de> for RegistryVisitor {
    type Value = MilestoneRegistry;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map from milestone numbers to milestone records")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
        let mut entries = BTreeMap::new();
        while let Some((milestone, record)) = map.next_entry::<MilestoneNumber, MilestoneRecord>()? {
            if entries.insert(milestone, record).is_some() {
                return Err(de::Error::custom(format!(
                    "milestone {milestone} appears more than once"
                )));
            }
        }
        Ok(MilestoneRegistry { entries })
    }
}
