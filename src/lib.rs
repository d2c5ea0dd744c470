//! Non-personalised item-to-item recommendations. Item-item similarities are precomputed for
//! the whole catalogue under one of several similarity metrics, turned into ranked lists of
//! related items, and these lists are scored with offline quality statistics.

pub mod catalogue;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod io;
pub mod metric;
pub mod recommend;
pub mod table;
pub mod types;
pub mod utils;


pub use crate::catalogue::{Catalogue, Item};
pub use crate::error::{Error, Result};
pub use crate::evaluate::{EvaluationReport, Evaluator};
pub use crate::metric::{MetricKind, Pairing, SimilarityMetric};
pub use crate::recommend::Recommender;
pub use crate::table::SimilarityTable;
pub use crate::types::SparseVector;

/// Builds a recommender for the catalogue under the given metric and computes its evaluation
/// report for top-`k` recommendation lists.
pub fn evaluate(
    catalogue: &Catalogue,
    kind: MetricKind,
    k: usize,
    num_threads: usize,
) -> Result<EvaluationReport> {

    let metric = kind.metric(catalogue);
    let recommender = Recommender::build(catalogue, metric.as_ref(), num_threads)?;

    Ok(Evaluator::new(&recommender, catalogue, k).report())
}
