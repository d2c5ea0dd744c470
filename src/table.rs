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

use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use fnv::FnvHashMap;
use scoped_pool::Pool;
use tracing::{debug, info};

use crate::catalogue::Catalogue;
use crate::error::{Error, Result};
use crate::metric::{Pairing, SimilarityMetric};
use crate::types::SparseVector;
use crate::utils;

/// Precomputed item-item similarities. Row `a` holds the items `b` for which the metric scored
/// `similarity(a, b)` above its threshold. Self-pairs are never stored. Read-only once built.
#[derive(Debug, PartialEq)]
pub struct SimilarityTable {
    metric_name: &'static str,
    rows: FnvHashMap<u32, SparseVector>,
}

impl SimilarityTable {

    /// Evaluates the metric for every pair of catalogue items. Symmetric metrics are evaluated
    /// once per unordered pair and the score is stored in both directions, asymmetric metrics
    /// are evaluated in both directions independently. The rows are scored concurrently on
    /// `num_threads` workers, the result does not depend on the number of workers.
    pub fn build(
        catalogue: &Catalogue,
        metric: &dyn SimilarityMetric,
        num_threads: usize,
    ) -> Result<Self> {

        if num_threads == 0 {
            return Err(Error::invalid_config("at least one worker thread is required"));
        }

        let item_ids: Vec<u32> = catalogue.item_ids().collect();

        let rows: Vec<Mutex<SparseVector>> = item_ids.iter()
            .map(|_| Mutex::new(SparseVector::new()))
            .collect();

        let failure: Mutex<Option<Error>> = Mutex::new(None);

        debug!(metric = metric.name(), items = item_ids.len(), threads = num_threads,
            "computing pairwise similarities");

        let build_start = Instant::now();

        let pool = Pool::new(num_threads);

        pool.scoped(|scope| {
            for index in 0..item_ids.len() {

                let reference_to_item_ids = &item_ids;
                let reference_to_rows = &rows;
                let reference_to_failure = &failure;

                scope.execute(move || {
                    let scored = score_row(index, reference_to_item_ids, metric, reference_to_rows);

                    if let Err(error) = scored {
                        let mut first_failure = reference_to_failure.lock()
                            .unwrap_or_else(PoisonError::into_inner);

                        if first_failure.is_none() {
                            *first_failure = Some(error);
                        }
                    }
                });
            }
        });

        pool.shutdown();

        if let Some(error) = failure.into_inner().unwrap_or_else(PoisonError::into_inner) {
            return Err(error);
        }

        let rows: FnvHashMap<u32, SparseVector> = item_ids.into_iter()
            .zip(rows.into_iter())
            .map(|(item, row)| (item, row.into_inner().unwrap_or_else(PoisonError::into_inner)))
            .filter(|(_, row)| !row.is_empty())
            .collect();

        let table = SimilarityTable { metric_name: metric.name(), rows };

        info!(
            metric = table.metric_name,
            rows = table.num_rows(),
            entries = table.num_entries(),
            millis = utils::to_millis(build_start.elapsed()),
            "similarity table built"
        );

        Ok(table)
    }

    pub fn metric_name(&self) -> &'static str {
        self.metric_name
    }

    /// The stored similarity, or 0 if nothing was recorded for the pair.
    pub fn similarity(&self, item_a: u32, item_b: u32) -> f64 {
        self.rows.get(&item_a)
            .and_then(|row| row.get(item_b))
            .unwrap_or(0.0)
    }

    /// All stored similarities of an item, `None` if none were stored.
    pub fn similarities(&self, item: u32) -> Option<&SparseVector> {
        self.rows.get(&item)
    }

    /// Ids of the items with at least one stored similarity, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item=u32> + '_ {
        self.rows.keys().cloned()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_entries(&self) -> usize {
        self.rows.values().map(|row| row.len()).sum()
    }
}

/// Scores the item at `index` against all items with a smaller id. Writes to other rows are
/// guarded by their mutex, as the symmetric half of a pair belongs to a row owned by another
/// task.
fn score_row(
    index: usize,
    item_ids: &[u32],
    metric: &dyn SimilarityMetric,
    rows: &[Mutex<SparseVector>],
) -> Result<()> {

    let item = item_ids[index];
    let threshold = metric.threshold();

    for (other_index, other_item) in item_ids[..index].iter().enumerate() {

        match metric.pairing() {
            Pairing::Symmetric => {
                let similarity = metric.similarity(item, *other_item)?;

                if similarity > threshold {
                    store(&rows[index], *other_item, similarity);
                    store(&rows[other_index], item, similarity);
                }
            },
            Pairing::Asymmetric => {
                let similarity = metric.similarity(item, *other_item)?;
                if similarity > threshold {
                    store(&rows[index], *other_item, similarity);
                }

                let similarity = metric.similarity(*other_item, item)?;
                if similarity > threshold {
                    store(&rows[other_index], item, similarity);
                }
            },
        }
    }

    Ok(())
}

fn store(row: &Mutex<SparseVector>, item: u32, similarity: f64) {
    row.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .set(item, similarity);
}


#[cfg(test)]
mod tests {

    use proptest::prelude::*;

    use crate::catalogue::{Catalogue, Item};
    use crate::error::{self, Error};
    use crate::metric::{GenomeCosine, GenreOverlap, IncreaseInConfidence, MetricKind, Pairing,
        SimilarityMetric};
    use crate::table::SimilarityTable;

    fn movies() -> Catalogue {
        let mut catalogue = Catalogue::new();
        catalogue.add_item(Item::new(1, "Toy Story", vec!["Animation", "Children", "Comedy"]));
        catalogue.add_item(Item::new(2, "Jumanji", vec!["Adventure", "Children"]));
        catalogue.add_item(Item::new(3, "Heat", vec!["Action", "Crime", "Thriller"]));
        catalogue.add_item(Item::new(4, "Casino", vec!["Crime", "Drama"]));
        catalogue
    }

    #[test]
    fn symmetric_scores_are_stored_in_both_directions() {
        let catalogue = movies();
        let table = SimilarityTable::build(&catalogue, &GenreOverlap::new(&catalogue), 2).unwrap();

        assert_eq!(table.metric_name(), "Genre");
        assert_eq!(table.similarity(1, 2), 0.5);
        assert_eq!(table.similarity(2, 1), 0.5);
        assert_eq!(table.similarity(3, 4), 0.5);
        assert_eq!(table.similarity(4, 3), 0.5);

        // Nothing in common, nothing stored
        assert_eq!(table.similarities(1).unwrap().get(3), None);
        assert_eq!(table.similarity(1, 3), 0.0);

        assert_eq!(table.num_rows(), 4);
        assert_eq!(table.num_entries(), 4);
    }

    #[test]
    fn unknown_rows_are_zero() {
        let catalogue = movies();
        let table = SimilarityTable::build(&catalogue, &GenreOverlap::new(&catalogue), 1).unwrap();

        assert_eq!(table.similarity(42, 1), 0.0);
        assert!(table.similarities(42).is_none());
    }

    #[test]
    fn disjoint_genomes_are_not_stored() {
        let mut catalogue = Catalogue::new();
        catalogue.add_item(Item::new(1, "a", vec!["Drama"]));
        catalogue.add_item(Item::new(2, "b", vec!["Drama"]));
        catalogue.add_genome_score(1, 10, 0.5);
        catalogue.add_genome_score(2, 11, 0.5);

        let table = SimilarityTable::build(&catalogue, &GenomeCosine::new(&catalogue), 1).unwrap();

        assert_eq!(table.num_entries(), 0);
        assert!(table.similarities(1).is_none());
        assert!(table.similarities(2).is_none());
    }

    #[test]
    fn asymmetric_scores_need_a_lift_above_one() {
        let mut catalogue = movies();
        for &(user, item, rating) in &[
            (1, 1, 5.0), (2, 1, 4.0), (3, 1, 2.0), (4, 1, 1.0),
            (1, 2, 4.5), (2, 2, 4.0), (3, 2, 4.0), (5, 2, 3.0),
        ] {
            catalogue.add_rating(user, item, rating);
        }

        let metric = IncreaseInConfidence::new(&catalogue);
        let table = SimilarityTable::build(&catalogue, &metric, 3).unwrap();

        assert!((table.similarity(1, 2) - 2.0).abs() < 0.0001);
        assert_eq!(table.similarity(2, 1), 0.0);
        assert_eq!(table.num_entries(), 1);
    }

    #[test]
    fn identical_raters_are_not_stored() {
        let mut catalogue = movies();
        for &(user, rating) in &[(1, 5.0), (2, 4.0), (3, 2.0), (4, 1.0)] {
            catalogue.add_rating(user, 1, rating);
            catalogue.add_rating(user, 2, rating);
        }

        let metric = IncreaseInConfidence::new(&catalogue);
        let table = SimilarityTable::build(&catalogue, &metric, 1).unwrap();

        assert_eq!(table.similarity(1, 2), 0.0);
        assert_eq!(table.similarity(2, 1), 0.0);
    }

    #[test]
    fn zero_threads_is_a_configuration_error() {
        let catalogue = movies();
        let result = SimilarityTable::build(&catalogue, &GenreOverlap::new(&catalogue), 0);

        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn empty_catalogue() {
        let catalogue = Catalogue::new();
        let table = SimilarityTable::build(&catalogue, &GenreOverlap::new(&catalogue), 2).unwrap();

        assert_eq!(table.num_rows(), 0);
        assert_eq!(table.ids().count(), 0);
    }

    struct BrokenMetric;

    impl SimilarityMetric for BrokenMetric {
        fn name(&self) -> &'static str { "Broken" }
        fn pairing(&self) -> Pairing { Pairing::Symmetric }
        fn threshold(&self) -> f64 { 0.0 }
        fn similarity(&self, _: u32, item_b: u32) -> error::Result<f64> {
            if item_b == 3 {
                Err(Error::ItemNotFound { item: item_b })
            } else {
                Ok(1.0)
            }
        }
    }

    #[test]
    fn metric_failures_are_returned() {
        let catalogue = movies();
        let result = SimilarityTable::build(&catalogue, &BrokenMetric, 2);

        assert!(matches!(result, Err(Error::ItemNotFound { item: 3 })));
    }

    #[test]
    fn thread_count_does_not_change_the_result() {
        let mut catalogue = movies();
        for user in 0..20u32 {
            for item in 1..=4u32 {
                if (user + item) % 3 != 0 {
                    catalogue.add_rating(user, item, ((user * item) % 5 + 1) as f64);
                }
            }
        }

        for kind in MetricKind::ALL.iter() {
            let metric = kind.metric(&catalogue);
            let sequential = SimilarityTable::build(&catalogue, metric.as_ref(), 1).unwrap();
            let parallel = SimilarityTable::build(&catalogue, metric.as_ref(), 4).unwrap();

            assert_eq!(sequential, parallel);
        }
    }

    proptest! {
        #[test]
        fn stored_entries_respect_the_threshold(
            ratings in prop::collection::vec((0u32..12, 1u32..=6, 1u32..=5), 0..60)
        ) {
            let mut catalogue = Catalogue::new();
            for id in 1..=6u32 {
                catalogue.add_item(Item::new(id, "item", Vec::<String>::new()));
            }
            for (user, item, rating) in ratings {
                catalogue.add_rating(user, item, rating as f64);
            }

            for kind in &[MetricKind::Rating, MetricKind::IncConfidence] {
                let metric = kind.metric(&catalogue);
                let table = SimilarityTable::build(&catalogue, metric.as_ref(), 2).unwrap();

                for item in table.ids() {
                    let row = table.similarities(item).unwrap();
                    prop_assert!(!row.contains(item));
                    for (_, similarity) in row.iter() {
                        prop_assert!(similarity > metric.threshold());
                    }
                }
            }
        }
    }
}
