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

use fnv::FnvHashSet;

use crate::catalogue::Catalogue;
use crate::recommend::Recommender;
use crate::utils::ratio;

/// Catalogue-level quality statistics of a recommender, computed from its top-k lists.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationReport {
    pub k: usize,
    pub algorithm: String,
    pub relevance: f64,
    pub coverage: f64,
    pub recommendation_coverage: f64,
    pub item_space_coverage: f64,
    pub popularity: f64,
}

impl EvaluationReport {

    pub fn csv_header() -> &'static str {
        "k,algorithm,relevance,coverage,rec. coverage,item space coverage,rec. popularity"
    }

    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{}",
            self.k,
            self.algorithm,
            self.relevance,
            self.coverage,
            self.recommendation_coverage,
            self.item_space_coverage,
            self.popularity,
        )
    }
}

/// Evaluates a recommender over every item of the catalogue. Every statistic requests fresh
/// recommendation lists, nothing is shared between statistics.
pub struct Evaluator<'a> {
    recommender: &'a Recommender,
    catalogue: &'a Catalogue,
    k: usize,
}

impl<'a> Evaluator<'a> {

    pub fn new(recommender: &'a Recommender, catalogue: &'a Catalogue, k: usize) -> Self {
        Evaluator { recommender, catalogue, k }
    }

    /// Fraction of the items for which at least one recommendation can be made.
    pub fn coverage(&self) -> f64 {

        let num_covered = self.catalogue.item_ids()
            .filter(|item| !self.recommender.recommendations(*item).is_empty())
            .count();

        ratio(num_covered as f64, self.catalogue.num_items() as f64)
    }

    /// Fraction of the items which appear at least once in the top-k list of some item.
    pub fn recommendation_coverage(&self) -> f64 {

        let mut recommended: FnvHashSet<u32> = FnvHashSet::default();

        for item in self.catalogue.item_ids() {
            recommended.extend(self.recommender.top_k(item, self.k));
        }

        ratio(recommended.len() as f64, self.catalogue.num_items() as f64)
    }

    /// For each item with recommendations, the fraction of the other items that could be
    /// recommended for it, averaged over these items.
    pub fn item_space_coverage(&self) -> f64 {

        let num_other_items = self.catalogue.num_items().saturating_sub(1) as f64;

        let mut sum_of_coverages = 0.0;
        let mut num_covered = 0;

        for item in self.catalogue.item_ids() {
            let recommendations = self.recommender.recommendations(item);

            if !recommendations.is_empty() {
                sum_of_coverages += ratio(recommendations.len() as f64, num_other_items);
                num_covered += 1;
            }
        }

        ratio(sum_of_coverages, num_covered as f64)
    }

    /// Popularity of a recommended item is the fraction of all users who rated it. Averaged
    /// over each top-k list, then over all items with recommendations.
    pub fn recommendation_popularity(&self) -> f64 {

        let num_users = self.catalogue.num_users() as f64;

        self.mean_over_top_k(|recommended_item| {
            let num_raters = self.catalogue.item_profile(recommended_item)
                .map(|profile| profile.len())
                .unwrap_or(0);

            ratio(num_raters as f64, num_users)
        })
    }

    /// Relevance of a recommended item is its mean training rating. Averaged over each top-k
    /// list, then over all items with recommendations. Unrated items have relevance 0.
    pub fn recommendation_relevance(&self) -> f64 {

        self.mean_over_top_k(|recommended_item| {
            self.catalogue.item_profile(recommended_item)
                .and_then(|profile| profile.mean().ok())
                .unwrap_or(0.0)
        })
    }

    fn mean_over_top_k<F>(&self, score: F) -> f64 where F: Fn(u32) -> f64 {

        let mut sum_of_means = 0.0;
        let mut num_scored = 0;

        for item in self.catalogue.item_ids() {
            let top_k = self.recommender.top_k(item, self.k);

            if !top_k.is_empty() {
                let sum: f64 = top_k.iter().map(|recommended_item| score(*recommended_item)).sum();
                sum_of_means += sum / top_k.len() as f64;
                num_scored += 1;
            }
        }

        ratio(sum_of_means, num_scored as f64)
    }

    /// Average number of items that occur in the top-k lists of both recommenders.
    pub fn common_recommendations(
        &self,
        recommender_a: &Recommender,
        recommender_b: &Recommender,
    ) -> f64 {

        let mut num_common = 0;

        for item in self.catalogue.item_ids() {
            let top_k_a = recommender_a.top_k(item, self.k);
            let top_k_b = recommender_b.top_k(item, self.k);

            num_common += top_k_a.iter()
                .filter(|recommended_item| top_k_b.contains(*recommended_item))
                .count();
        }

        ratio(num_common as f64, self.catalogue.num_items() as f64)
    }

    /// Computes all statistics of the evaluated recommender.
    pub fn report(&self) -> EvaluationReport {
        EvaluationReport {
            k: self.k,
            algorithm: self.recommender.table().metric_name().to_owned(),
            relevance: self.recommendation_relevance(),
            coverage: self.coverage(),
            recommendation_coverage: self.recommendation_coverage(),
            item_space_coverage: self.item_space_coverage(),
            popularity: self.recommendation_popularity(),
        }
    }
}
