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

use std::collections::BTreeMap;

use fnv::{FnvHashMap, FnvHashSet};

use crate::error::{Error, Result};
use crate::types::SparseVector;

/// A recommendable item: its name, its genres and its genome (tag relevance) scores.
#[derive(Clone, Debug)]
pub struct Item {
    pub id: u32,
    pub name: String,
    pub genres: FnvHashSet<String>,
    pub genome: SparseVector,
}

impl Item {

    pub fn new<I, S>(id: u32, name: &str, genres: I) -> Self
        where I: IntoIterator<Item=S>, S: Into<String> {

        Item {
            id,
            name: name.to_owned(),
            genres: genres.into_iter().map(|genre| genre.into()).collect(),
            genome: SparseVector::new(),
        }
    }
}

/// The fixed set of items known to the system together with the training ratings. Items are
/// kept ordered by id, so that every pass over the catalogue visits them in the same order.
#[derive(Debug, Default)]
pub struct Catalogue {
    items: BTreeMap<u32, Item>,
    // item -> (user -> rating)
    item_profiles: FnvHashMap<u32, SparseVector>,
    // user -> (item -> rating)
    user_profiles: FnvHashMap<u32, SparseVector>,
    num_ratings: u64,
    unrated: SparseVector,
}

impl Catalogue {

    pub fn new() -> Self {
        Default::default()
    }

    /// Adds an item. For an id that is already known, the name and genres are replaced while
    /// the genome scores of both entries are merged and the ratings are kept. Returns false in
    /// that case.
    pub fn add_item(&mut self, item: Item) -> bool {
        match self.items.get_mut(&item.id) {
            Some(known_item) => {
                for (tag, relevance) in item.genome.iter() {
                    known_item.genome.set(tag, relevance);
                }
                known_item.name = item.name;
                known_item.genres = item.genres;
                false
            },
            None => {
                self.items.insert(item.id, item);
                true
            },
        }
    }

    /// Records a genome score for an item. Returns false if the item is unknown, in which case
    /// the score is dropped.
    pub fn add_genome_score(&mut self, item: u32, tag: u32, relevance: f64) -> bool {
        match self.items.get_mut(&item) {
            Some(known_item) => {
                known_item.genome.set(tag, relevance);
                true
            },
            None => false,
        }
    }

    /// Records a training rating. Returns false if the rated item is unknown, in which case the
    /// rating is dropped. A repeated rating of the same user for the same item overwrites the
    /// earlier one.
    pub fn add_rating(&mut self, user: u32, item: u32, rating: f64) -> bool {

        if !self.contains(item) {
            return false;
        }

        let item_profile = self.item_profiles.entry(item)
            .or_insert_with(SparseVector::new);

        if !item_profile.contains(user) {
            self.num_ratings += 1;
        }
        item_profile.set(user, rating);

        self.user_profiles.entry(user)
            .or_insert_with(SparseVector::new)
            .set(item, rating);

        true
    }

    pub fn item(&self, id: u32) -> Option<&Item> {
        self.items.get(&id)
    }

    /// Like `item`, but fails for ids outside of the catalogue.
    pub fn require_item(&self, id: u32) -> Result<&Item> {
        self.item(id).ok_or(Error::ItemNotFound { item: id })
    }

    pub fn contains(&self, id: u32) -> bool {
        self.items.contains_key(&id)
    }

    /// Item ids in ascending order.
    pub fn item_ids(&self) -> impl Iterator<Item=u32> + '_ {
        self.items.keys().cloned()
    }

    pub fn items(&self) -> impl Iterator<Item=&Item> + '_ {
        self.items.values()
    }

    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    /// Total number of raters in the system.
    pub fn num_users(&self) -> usize {
        self.user_profiles.len()
    }

    pub fn num_ratings(&self) -> u64 {
        self.num_ratings
    }

    /// The ratings an item received, keyed by user. `None` for items nobody rated.
    pub fn item_profile(&self, id: u32) -> Option<&SparseVector> {
        self.item_profiles.get(&id)
    }

    pub fn user_profile(&self, id: u32) -> Option<&SparseVector> {
        self.user_profiles.get(&id)
    }

    /// The rating profile of a catalogue item, empty if nobody rated it. Fails only for ids
    /// outside of the catalogue.
    pub(crate) fn ratings_of(&self, id: u32) -> Result<&SparseVector> {
        self.require_item(id)?;
        Ok(self.item_profiles.get(&id).unwrap_or(&self.unrated))
    }
}
