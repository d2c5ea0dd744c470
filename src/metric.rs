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

use std::fmt;
use std::str::FromStr;

use crate::catalogue::Catalogue;
use crate::error::{Error, Result};
use crate::utils::ratio;

/// Ratings at or above this value count as "liked".
pub const LIKED_RATING: f64 = 4.0;

/// Whether `similarity(a, b) == similarity(b, a)` holds for a metric. The similarity table
/// evaluates symmetric metrics once per unordered pair and asymmetric metrics once per
/// ordered pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pairing {
    Symmetric,
    Asymmetric,
}

/// An item-item similarity function over the catalogue. Implementations declare how they pair
/// items and which scores are worth storing, the similarity table never inspects their type.
pub trait SimilarityMetric: Sync {

    fn name(&self) -> &'static str;

    fn pairing(&self) -> Pairing;

    /// Only scores strictly greater than this value are stored in a similarity table.
    fn threshold(&self) -> f64;

    /// Fails with `ItemNotFound` if one of the ids is not part of the catalogue.
    fn similarity(&self, item_a: u32, item_b: u32) -> Result<f64>;
}

/// Overlap coefficient of the genre sets of two items.
pub struct GenreOverlap<'a> {
    catalogue: &'a Catalogue,
}

impl<'a> GenreOverlap<'a> {
    pub fn new(catalogue: &'a Catalogue) -> Self {
        GenreOverlap { catalogue }
    }
}

impl<'a> SimilarityMetric for GenreOverlap<'a> {

    fn name(&self) -> &'static str { "Genre" }

    fn pairing(&self) -> Pairing { Pairing::Symmetric }

    fn threshold(&self) -> f64 { 0.0 }

    fn similarity(&self, item_a: u32, item_b: u32) -> Result<f64> {

        let genres_a = &self.catalogue.require_item(item_a)?.genres;
        let genres_b = &self.catalogue.require_item(item_b)?.genres;

        let num_common = genres_a.intersection(genres_b).count();
        let denominator = genres_a.len().min(genres_b.len());

        if denominator > 0 {
            Ok(num_common as f64 / denominator as f64)
        } else {
            Ok(0.0)
        }
    }
}

/// Weighted Jaccard similarity over the genome scores of two items, restricted to the tags
/// scored for both items.
pub struct GenomeCosine<'a> {
    catalogue: &'a Catalogue,
}

impl<'a> GenomeCosine<'a> {
    pub fn new(catalogue: &'a Catalogue) -> Self {
        GenomeCosine { catalogue }
    }
}

impl<'a> SimilarityMetric for GenomeCosine<'a> {

    fn name(&self) -> &'static str { "Genome" }

    fn pairing(&self) -> Pairing { Pairing::Symmetric }

    fn threshold(&self) -> f64 { 0.0 }

    fn similarity(&self, item_a: u32, item_b: u32) -> Result<f64> {

        let genome_a = &self.catalogue.require_item(item_a)?.genome;
        let genome_b = &self.catalogue.require_item(item_b)?.genome;

        let mut numerator = 0.0;
        let mut denominator = 0.0;

        for tag in genome_a.common_keys(genome_b) {
            let relevance_a = genome_a.value(tag)?;
            let relevance_b = genome_b.value(tag)?;

            numerator += relevance_a.min(relevance_b);
            denominator += relevance_a.max(relevance_b);
        }

        if denominator > 0.0 {
            Ok(numerator / denominator)
        } else {
            Ok(0.0)
        }
    }
}

/// Cosine between the rating vectors of two items.
pub struct RatingCosine<'a> {
    catalogue: &'a Catalogue,
}

impl<'a> RatingCosine<'a> {
    pub fn new(catalogue: &'a Catalogue) -> Self {
        RatingCosine { catalogue }
    }
}

impl<'a> SimilarityMetric for RatingCosine<'a> {

    fn name(&self) -> &'static str { "Rating" }

    fn pairing(&self) -> Pairing { Pairing::Symmetric }

    fn threshold(&self) -> f64 { 0.0 }

    fn similarity(&self, item_a: u32, item_b: u32) -> Result<f64> {

        let ratings_a = self.catalogue.ratings_of(item_a)?;
        let ratings_b = self.catalogue.ratings_of(item_b)?;

        let mut dot_product = 0.0;
        for user in ratings_a.common_keys(ratings_b) {
            dot_product += ratings_a.value(user)? * ratings_b.value(user)?;
        }

        let denominator = ratings_a.norm() * ratings_b.norm();

        if denominator > 0.0 {
            Ok(dot_product / denominator)
        } else {
            Ok(0.0)
        }
    }
}

/// Increase in confidence (lift) of liking item Y given that a user liked item X, relative to
/// users who rated X but did not like it: `conf(X => Y) / conf(!X => Y)`. Asymmetric.
pub struct IncreaseInConfidence<'a> {
    catalogue: &'a Catalogue,
}

impl<'a> IncreaseInConfidence<'a> {
    pub fn new(catalogue: &'a Catalogue) -> Self {
        IncreaseInConfidence { catalogue }
    }
}

impl<'a> SimilarityMetric for IncreaseInConfidence<'a> {

    fn name(&self) -> &'static str { "IncConfidence" }

    fn pairing(&self) -> Pairing { Pairing::Asymmetric }

    // A lift of at most 1 indicates no positive association.
    fn threshold(&self) -> f64 { 1.0 }

    fn similarity(&self, item_x: u32, item_y: u32) -> Result<f64> {

        let ratings_x = self.catalogue.ratings_of(item_x)?;
        let ratings_y = self.catalogue.ratings_of(item_y)?;

        let common_users = ratings_x.common_keys(ratings_y);

        let n_x = ratings_x.len();
        let n_y = ratings_y.len();
        let n_xy = n_x + n_y - common_users.len();

        let liked_x = ratings_x.iter()
            .filter(|(_, rating)| *rating >= LIKED_RATING)
            .count();
        let not_liked_x = n_x - liked_x;

        let mut liked_x_and_y = 0;
        let mut not_liked_x_and_liked_y = 0;

        for user in common_users {
            let rating_x = ratings_x.value(user)?;
            let rating_y = ratings_y.value(user)?;

            if rating_y >= LIKED_RATING {
                if rating_x >= LIKED_RATING {
                    liked_x_and_y += 1;
                } else {
                    not_liked_x_and_liked_y += 1;
                }
            }
        }

        let support_x = ratio(liked_x as f64, n_x as f64);
        let support_not_x = ratio(not_liked_x as f64, n_x as f64);
        let support_x_and_y = ratio(liked_x_and_y as f64, n_xy as f64);
        let support_not_x_and_y = ratio(not_liked_x_and_liked_y as f64, n_xy as f64);

        let confidence_x_y = ratio(support_x_and_y, support_x);
        let confidence_not_x_y = ratio(support_not_x_and_y, support_not_x);

        Ok(ratio(confidence_x_y, confidence_not_x_y))
    }
}

/// The similarity metrics that can be selected by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Genre,
    Genome,
    Rating,
    IncConfidence,
}

impl MetricKind {

    pub const ALL: [MetricKind; 4] = [
        MetricKind::Genre,
        MetricKind::Genome,
        MetricKind::Rating,
        MetricKind::IncConfidence,
    ];

    pub fn metric<'a>(&self, catalogue: &'a Catalogue) -> Box<dyn SimilarityMetric + 'a> {
        match *self {
            MetricKind::Genre => Box::new(GenreOverlap::new(catalogue)),
            MetricKind::Genome => Box::new(GenomeCosine::new(catalogue)),
            MetricKind::Rating => Box::new(RatingCosine::new(catalogue)),
            MetricKind::IncConfidence => Box::new(IncreaseInConfidence::new(catalogue)),
        }
    }
}

impl FromStr for MetricKind {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "genre" => Ok(MetricKind::Genre),
            "genome" => Ok(MetricKind::Genome),
            "rating" => Ok(MetricKind::Rating),
            "inc-confidence" | "incconfidence" => Ok(MetricKind::IncConfidence),
            _ => Err(Error::UnknownMetric { name: name.to_owned() }),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            MetricKind::Genre => "Genre",
            MetricKind::Genome => "Genome",
            MetricKind::Rating => "Rating",
            MetricKind::IncConfidence => "IncConfidence",
        };
        write!(f, "{}", name)
    }
}
