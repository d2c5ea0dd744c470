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

use thiserror::Error;

/// Errors raised while loading data, configuring or building a recommender. Degenerate
/// arithmetic (empty vectors, zero norms) is never an error, the metrics return 0 instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no value stored for key {key}")]
    KeyNotFound { key: u32 },

    #[error("mean of an empty vector is undefined")]
    EmptyVector,

    #[error("item {item} is not part of the catalogue")]
    ItemNotFound { item: u32 },

    #[error("unknown similarity metric '{name}', expected one of genre, genome, rating, inc-confidence")]
    UnknownMetric { name: String },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Error::InvalidConfig { reason: reason.into() }
    }
}
