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

use getopts::{Matches, Options};

use crate::error::{Error, Result};
use crate::metric::MetricKind;

/// Settings of an experiment run: where to read the dataset from, which recommenders to build
/// and evaluate, and what to output.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub items_path: String,
    pub genome_path: String,
    pub ratings_path: String,
    pub metrics: Vec<MetricKind>,
    /// Length of the recommendation lists which are evaluated and output.
    pub k: usize,
    pub num_threads: usize,
    pub output_path: Option<String>,
    /// Items to print the top-k recommendations for.
    pub show: Vec<u32>,
    /// Print the number of common recommendations for every pair of metrics.
    pub compare: bool,
}

impl Config {

    pub const DEFAULT_K: usize = 10;

    pub fn new(items_path: &str, genome_path: &str, ratings_path: &str) -> Self {
        Config {
            items_path: items_path.to_owned(),
            genome_path: genome_path.to_owned(),
            ratings_path: ratings_path.to_owned(),
            metrics: MetricKind::ALL.to_vec(),
            k: Config::DEFAULT_K,
            num_threads: num_cpus::get(),
            output_path: None,
            show: Vec::new(),
            compare: false,
        }
    }

    /// The command line options understood by `from_matches`.
    pub fn options() -> Options {
        let mut opts = Options::new();
        opts.optopt("i", "items", "Items file (required). A header line followed by \
            'id,name,genres' per line, genres are separated by '|'.", "PATH");
        opts.optopt("g", "genome", "Genome scores file (required). A header line followed by \
            'item,tag,relevance' per line.", "PATH");
        opts.optopt("r", "ratings", "Training ratings file (required). A header line followed \
            by 'user,item,rating' per line.", "PATH");
        opts.optmulti("m", "metric", "Similarity metric to evaluate, one of genre, genome, \
            rating, inc-confidence or all (optional, repeatable, defaults to all).", "NAME");
        opts.optopt("k", "num-recommendations", "Number of recommendations per item (optional, \
            defaults to 10).", "NUMBER");
        opts.optopt("t", "threads", "Number of threads used to compute similarities (optional, \
            defaults to the number of CPUs).", "NUMBER");
        opts.optopt("o", "outputfile", "Write the recommendations of each metric as JSON lines \
            to this file (optional, the metric name is appended to the file name).", "PATH");
        opts.optmulti("s", "show", "Print the recommendations for this item id (optional, \
            repeatable).", "ID");
        opts.optflag("c", "compare", "Print the number of common recommendations for every \
            pair of metrics.");
        opts.optflag("h", "help", "Print this help menu");
        opts
    }

    /// Builds and validates a configuration from parsed command line options.
    pub fn from_matches(matches: &Matches) -> Result<Self> {

        let items_path = required(matches, "i", "--items")?;
        let genome_path = required(matches, "g", "--genome")?;
        let ratings_path = required(matches, "r", "--ratings")?;

        let mut config = Config::new(&items_path, &genome_path, &ratings_path);

        let metric_names = matches.opt_strs("m");
        if !metric_names.is_empty() && !metric_names.iter().any(|name| name == "all") {
            config.metrics = Vec::with_capacity(metric_names.len());
            for name in metric_names.iter() {
                let kind: MetricKind = name.parse()?;
                if !config.metrics.contains(&kind) {
                    config.metrics.push(kind);
                }
            }
        }

        config.k = matches.opt_get_default("k", Config::DEFAULT_K)
            .map_err(|failure| Error::invalid_config(format!("Problem with option 'k': {}", failure)))?;

        config.num_threads = matches.opt_get_default("t", config.num_threads)
            .map_err(|failure| Error::invalid_config(format!("Problem with option 't': {}", failure)))?;

        config.output_path = matches.opt_str("o");

        for id in matches.opt_strs("s") {
            let item: u32 = id.parse()
                .map_err(|_| Error::invalid_config(format!("'{}' is not an item id", id)))?;
            config.show.push(item);
        }

        config.compare = matches.opt_present("c");

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(Error::invalid_config("at least one recommendation per item is required"));
        }
        if self.num_threads == 0 {
            return Err(Error::invalid_config("at least one worker thread is required"));
        }
        if self.metrics.is_empty() {
            return Err(Error::invalid_config("no similarity metric selected"));
        }
        Ok(())
    }

    /// The file to write the recommendations of a metric to, if any.
    pub fn output_path_for(&self, kind: MetricKind) -> Option<String> {
        self.output_path.as_ref()
            .map(|path| format!("{}.{}", path, kind.to_string().to_lowercase()))
    }
}

fn required(matches: &Matches, name: &str, long_name: &str) -> Result<String> {
    matches.opt_str(name)
        .ok_or_else(|| Error::invalid_config(format!("Please specify a file via {}.", long_name)))
}
