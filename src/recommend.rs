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

use std::cmp::Ordering;

use crate::catalogue::Catalogue;
use crate::error::Result;
use crate::metric::SimilarityMetric;
use crate::table::SimilarityTable;

/// Candidate for a recommendation list, ordered by descending similarity. Ties are broken by
/// ascending item id, which keeps the lists reproducible when they are cut off after k items.
#[derive(PartialEq,Debug)]
struct ScoredItem {
    item: u32,
    score: f64,
}

/// Note that we must use a special implementation here as there is no total order on floating
/// point numbers.
fn cmp_descending(scored_item_a: &ScoredItem, scored_item_b: &ScoredItem) -> Ordering {
    let by_score = match scored_item_a.score.partial_cmp(&scored_item_b.score) {
        Some(Ordering::Less) => Ordering::Greater,
        Some(Ordering::Greater) => Ordering::Less,
        Some(Ordering::Equal) => Ordering::Equal,
        None => Ordering::Equal
    };

    by_score.then_with(|| scored_item_a.item.cmp(&scored_item_b.item))
}

impl Eq for ScoredItem {}

impl Ord for ScoredItem {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_descending(self, other)
    }
}

impl PartialOrd for ScoredItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(cmp_descending(self, other))
    }
}

/// Non-personalised recommender: the items most similar to a target item.
#[derive(Debug)]
pub struct Recommender {
    table: SimilarityTable,
}

impl Recommender {

    pub fn new(table: SimilarityTable) -> Self {
        Recommender { table }
    }

    /// Precomputes the similarity table of the catalogue under the given metric.
    pub fn build(
        catalogue: &Catalogue,
        metric: &dyn SimilarityMetric,
        num_threads: usize,
    ) -> Result<Self> {
        let table = SimilarityTable::build(catalogue, metric, num_threads)?;
        Ok(Recommender::new(table))
    }

    pub fn table(&self) -> &SimilarityTable {
        &self.table
    }

    /// All items with a positive similarity to the target item, most similar first. The list is
    /// not truncated, it is empty for items without stored similarities.
    pub fn recommendations(&self, item: u32) -> Vec<u32> {

        let similarities = match self.table.similarities(item) {
            Some(similarities) => similarities,
            None => return Vec::new(),
        };

        let mut candidates: Vec<ScoredItem> = similarities.iter()
            .filter(|(other_item, score)| *other_item != item && *score > 0.0)
            .map(|(other_item, score)| ScoredItem { item: other_item, score })
            .collect();

        candidates.sort_unstable();

        candidates.into_iter()
            .map(|scored_item| scored_item.item)
            .collect()
    }

    /// The first `k` entries of `recommendations`.
    pub fn top_k(&self, item: u32, k: usize) -> Vec<u32> {
        let mut recommendations = self.recommendations(item);
        recommendations.truncate(k);
        recommendations
    }
}
