/**
 * SimReco
 * Copyright (C) 2018 Sebastian Schelter
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use std::iter::FromIterator;

use fnv::{FnvHashMap, FnvHashSet};

use crate::error::{Error, Result};

/// Sparse mapping from an integer key (a user, a tag or an item) to a value. Only present
/// entries are stored: a missing key means "unknown", which is not the same as 0.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseVector {
    entries: FnvHashMap<u32, f64>,
}

impl SparseVector {

    pub fn new() -> Self {
        SparseVector { entries: FnvHashMap::default() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        SparseVector {
            entries: FnvHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Inserts a value, overwriting a previously stored value for the same key.
    pub fn set(&mut self, key: u32, value: f64) {
        self.entries.insert(key, value);
    }

    pub fn contains(&self, key: u32) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn get(&self, key: u32) -> Option<f64> {
        self.entries.get(&key).cloned()
    }

    /// Like `get`, but treats an absent key as an error. Callers that cannot guarantee the key
    /// is present should check `contains` first.
    pub fn value(&self, key: u32) -> Result<f64> {
        self.get(key).ok_or(Error::KeyNotFound { key })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in no particular order.
    pub fn keys(&self) -> impl Iterator<Item=u32> + '_ {
        self.entries.keys().cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item=(u32, f64)> + '_ {
        self.entries.iter().map(|(key, value)| (*key, *value))
    }

    /// Keys present in both vectors. The keys of the smaller vector are looked up in the larger one.
    pub fn common_keys(&self, other: &SparseVector) -> FnvHashSet<u32> {

        let (smaller, larger) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };

        smaller.keys()
            .filter(|key| larger.contains(*key))
            .collect()
    }

    /// Euclidean norm over the stored values.
    pub fn norm(&self) -> f64 {
        self.entries.values()
            .map(|value| value * value)
            .sum::<f64>()
            .sqrt()
    }

    /// Arithmetic mean over the stored values only.
    pub fn mean(&self) -> Result<f64> {
        if self.is_empty() {
            return Err(Error::EmptyVector);
        }

        let sum: f64 = self.entries.values().sum();
        Ok(sum / self.len() as f64)
    }
}

impl FromIterator<(u32, f64)> for SparseVector {

    fn from_iter<I: IntoIterator<Item=(u32, f64)>>(iter: I) -> Self {
        let mut vector = SparseVector::new();
        for (key, value) in iter {
            vector.set(key, value);
        }
        vector
    }
}
