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

use std::env;
use std::error::Error;

use getopts::Options;
use tracing::info;
use tracing_subscriber::EnvFilter;

use simreco::config::Config;
use simreco::io;
use simreco::{Catalogue, EvaluationReport, Evaluator, Recommender};

fn main() {

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let opts = Config::options();

    let matches = match opts.parse(&args[1..]) {
        Ok(matches) => matches,
        Err(failure) => {
            let hint = failure.to_string();
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    if matches.opt_present("h") {
        return print_usage_and_exit(&program, opts, None);
    }

    let config = match Config::from_matches(&matches) {
        Ok(config) => config,
        Err(failure) => {
            let hint = failure.to_string();
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    init_logging();

    if let Err(failure) = run_experiment(&config) {
        eprintln!("{}", failure);
        std::process::exit(1);
    }
}

/// Logs go to stderr, stdout only carries the results. The verbosity can be changed via RUST_LOG.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_usage_and_exit(
    program: &str,
    opts: Options,
    hint: Option<&str>
) {

    if let Some(hint) = hint {
        eprintln!("\n{}\n", hint);
    }

    let brief = format!("Usage: {} [options]", program);
    eprint!("{}", opts.usage(&brief));

    if hint.is_some() {
        std::process::exit(2);
    }
}

fn run_experiment(config: &Config) -> Result<(), Box<dyn Error>> {

    info!("Reading {}, {} and {}", config.items_path, config.genome_path, config.ratings_path);

    let catalogue = io::load_catalogue(
        config.items_path.as_str(),
        config.genome_path.as_str(),
        config.ratings_path.as_str(),
    )?;

    let mut recommenders: Vec<Recommender> = Vec::with_capacity(config.metrics.len());

    println!("{}", EvaluationReport::csv_header());

    for kind in config.metrics.iter() {

        info!("Computing {} similarities using {} threads", kind, config.num_threads);

        let metric = kind.metric(&catalogue);
        let recommender = Recommender::build(&catalogue, metric.as_ref(), config.num_threads)?;

        let report = Evaluator::new(&recommender, &catalogue, config.k).report();
        println!("{}", report.to_csv_row());

        for item in config.show.iter() {
            print_recommendations(&recommender, &catalogue, *item, config.k);
        }

        if let Some(path) = config.output_path_for(*kind) {
            info!("Writing {} recommendations to {}", kind, path);
            io::write_recommendations(&recommender, &catalogue, config.k, Some(path.as_str()))?;
        }

        recommenders.push(recommender);
    }

    if config.compare {
        println!("k,algorithm a,algorithm b,common recommendations");

        for (index, recommender_a) in recommenders.iter().enumerate() {
            for recommender_b in recommenders[index + 1..].iter() {

                let evaluator = Evaluator::new(recommender_a, &catalogue, config.k);
                let num_common = evaluator.common_recommendations(recommender_a, recommender_b);

                println!(
                    "{},{},{},{}",
                    config.k,
                    recommender_a.table().metric_name(),
                    recommender_b.table().metric_name(),
                    num_common,
                );
            }
        }
    }

    Ok(())
}

fn print_recommendations(recommender: &Recommender, catalogue: &Catalogue, item: u32, k: usize) {

    match catalogue.item(item) {
        Some(target) => {
            println!("Title: {} ({})", target.name, recommender.table().metric_name());

            for (rank, recommended_item) in recommender.top_k(item, k).into_iter().enumerate() {
                if let Some(recommended) = catalogue.item(recommended_item) {
                    println!("\tRec {}: {}", rank + 1, recommended.name);
                }
            }
            println!();
        },
        None => eprintln!("Item {} is not part of the catalogue.", item),
    }
}
