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

use std::fs::File;
use std::io;
use std::io::prelude::*;
use std::io::stdout;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_derive::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalogue::{Catalogue, Item};
use crate::error::Result;
use crate::recommend::Recommender;

/// Genre entry of items without genres in MovieLens exports.
const NO_GENRES: &str = "(no genres listed)";

/// Reads a CSV input file. We expect a header line and comma separated fields, additional
/// trailing fields (such as rating timestamps) are ignored.
pub fn csv_reader<P: AsRef<Path>>(file: P) -> Result<csv::Reader<File>> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(file)?;

    Ok(reader)
}

/// Deserializes the first `num_fields` fields of each record by position, the header names
/// differ between dataset exports.
fn deserialize_records<'a, R, T>(
    reader: &'a mut csv::Reader<R>,
    num_fields: usize,
) -> impl Iterator<Item=Result<T>> + 'a
    where R: io::Read + 'a, T: DeserializeOwned + 'a {

    reader.records()
        .map(move |record| -> Result<T> {
            let mut record = record?;
            record.truncate(num_fields);
            let decoded: T = record.deserialize(None)?;
            Ok(decoded)
        })
}

#[derive(Deserialize)]
struct ItemRecord {
    id: u32,
    name: String,
    genres: String,
}

#[derive(Deserialize)]
struct GenomeRecord {
    item: u32,
    tag: u32,
    relevance: f64,
}

#[derive(Deserialize)]
struct RatingRecord {
    user: u32,
    item: u32,
    rating: f64,
}

/// Reads items with their `|` separated genres. A repeated item id replaces the name and genres
/// read before.
pub fn read_items<R: io::Read>(reader: &mut csv::Reader<R>, catalogue: &mut Catalogue) -> Result<()> {

    let mut num_repeated: u64 = 0;

    for record in deserialize_records(reader, 3) {
        let record: ItemRecord = record?;

        let genres = record.genres.split('|')
            .map(|genre| genre.trim())
            .filter(|genre| !genre.is_empty() && *genre != NO_GENRES);

        if !catalogue.add_item(Item::new(record.id, &record.name, genres)) {
            num_repeated += 1;
        }
    }

    if num_repeated > 0 {
        warn!(repeated = num_repeated, "items with repeated ids replaced");
    }
    debug!(items = catalogue.num_items(), "items read");

    Ok(())
}

/// Reads `item,tag,relevance` genome scores. Scores of unknown items are skipped.
pub fn read_genome_scores<R: io::Read>(
    reader: &mut csv::Reader<R>,
    catalogue: &mut Catalogue,
) -> Result<()> {

    let mut num_scores: u64 = 0;
    let mut num_skipped: u64 = 0;

    for record in deserialize_records(reader, 3) {
        let record: GenomeRecord = record?;

        if catalogue.add_genome_score(record.item, record.tag, record.relevance) {
            num_scores += 1;
        } else {
            num_skipped += 1;
        }
    }

    if num_skipped > 0 {
        warn!(skipped = num_skipped, "genome scores for unknown items skipped");
    }
    debug!(scores = num_scores, "genome scores read");

    Ok(())
}

/// Reads `user,item,rating` training ratings. Ratings of unknown items are skipped.
pub fn read_ratings<R: io::Read>(reader: &mut csv::Reader<R>, catalogue: &mut Catalogue) -> Result<()> {

    let mut num_skipped: u64 = 0;

    for record in deserialize_records(reader, 3) {
        let record: RatingRecord = record?;

        if !catalogue.add_rating(record.user, record.item, record.rating) {
            num_skipped += 1;
        }
    }

    if num_skipped > 0 {
        warn!(skipped = num_skipped, "ratings for unknown items skipped");
    }
    debug!(ratings = catalogue.num_ratings(), users = catalogue.num_users(), "ratings read");

    Ok(())
}

/// Loads the catalogue from an items file, a genome scores file and a training ratings file.
pub fn load_catalogue<P: AsRef<Path>>(
    items_path: P,
    genome_path: P,
    ratings_path: P,
) -> Result<Catalogue> {

    let mut catalogue = Catalogue::new();

    read_items(&mut csv_reader(items_path)?, &mut catalogue)?;
    read_genome_scores(&mut csv_reader(genome_path)?, &mut catalogue)?;
    read_ratings(&mut csv_reader(ratings_path)?, &mut catalogue)?;

    info!(
        items = catalogue.num_items(),
        users = catalogue.num_users(),
        ratings = catalogue.num_ratings(),
        "catalogue loaded"
    );

    Ok(catalogue)
}

/// Struct used for JSON serialization of computed recommendations. Field names will be used in
/// JSON.
#[derive(Serialize)]
struct Recommendations<'a> {
    for_item: &'a str,
    recommended_items: Vec<&'a str>,
}

/// Output the top-k recommendations for every item in JSON format, one item per line, using
/// the item names. If a `recommendations_path` is supplied, we write to a file at the specified
/// path, otherwise, we output to stdout.
pub fn write_recommendations(
    recommender: &Recommender,
    catalogue: &Catalogue,
    k: usize,
    recommendations_path: Option<&str>,
) -> Result<()> {

    let mut out: Box<dyn Write> = match recommendations_path {
        Some(path) => Box::new(io::BufWriter::new(File::create(&Path::new(path))?)),
        _ => Box::new(stdout())
    };

    for item in catalogue.items() {

        let recommended_items: Vec<&str> = recommender.top_k(item.id, k).into_iter()
            .filter_map(|recommended_item| catalogue.item(recommended_item))
            .map(|recommended_item| recommended_item.name.as_str())
            .collect();

        let recommendations = Recommendations { for_item: &item.name, recommended_items };

        serde_json::to_writer(&mut out, &recommendations)?;
        writeln!(out)?;
    }

    out.flush()?;

    Ok(())
}


#[cfg(test)]
mod tests {

    use std::fs;
    use std::io::Write;

    use tempfile::NamedTempFile;

    use crate::error::Error;
    use crate::io;
    use crate::metric::GenreOverlap;
    use crate::recommend::Recommender;

    fn file_with(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn load_catalogue() {
        let items = file_with("\
            movieId,title,genres\n\
            1,Toy Story (1995),Adventure|Animation|Children\n\
            2,Jumanji (1995),Adventure|Children\n\
            3,\"American President, The (1995)\",Comedy|Drama|Romance\n\
            4,Unknown,(no genres listed)\n\
            2,Jumanji (1995),Adventure|Children|Fantasy\n");

        let genome = file_with("\
            movieId,tagId,relevance\n\
            1,1,0.025\n\
            1,2,0.75\n\
            2,2,0.5\n\
            99,1,0.5\n");

        let ratings = file_with("\
            userId,movieId,rating,timestamp\n\
            1,1,4.0,964982703\n\
            1,3,4.5,964981247\n\
            2,1,3.5,964982224\n\
            2,99,5.0,964982224\n");

        let catalogue = io::load_catalogue(items.path(), genome.path(), ratings.path()).unwrap();

        assert_eq!(catalogue.num_items(), 4);
        assert_eq!(catalogue.num_users(), 2);
        assert_eq!(catalogue.num_ratings(), 3);

        let toy_story = catalogue.item(1).unwrap();
        assert_eq!(toy_story.name, "Toy Story (1995)");
        assert_eq!(toy_story.genres.len(), 3);
        assert!(toy_story.genres.contains("Animation"));
        assert_eq!(toy_story.genome.get(2), Some(0.75));

        assert_eq!(catalogue.item(3).unwrap().name, "American President, The (1995)");
        assert!(catalogue.item(4).unwrap().genres.is_empty());
        assert_eq!(catalogue.item(2).unwrap().genres.len(), 3);
        assert_eq!(catalogue.item(2).unwrap().genome.get(2), Some(0.5));
        assert_eq!(catalogue.item_profile(1).unwrap().len(), 2);
    }

    #[test]
    fn malformed_ratings() {
        let items = file_with("movieId,title,genres\n1,a,Drama\n");
        let genome = file_with("movieId,tagId,relevance\n");
        let ratings = file_with("userId,movieId,rating\n1,1,four\n");

        let result = io::load_catalogue(items.path(), genome.path(), ratings.path());
        assert!(matches!(result, Err(Error::Csv(_))));
    }

    #[test]
    fn missing_file() {
        let result = io::csv_reader("/this/path/does/not/exist.csv");
        assert!(result.is_err());
    }

    #[test]
    fn write_recommendations() {
        let items = file_with("movieId,title,genres\n1,Heat,Crime\n2,Ronin,Crime|Action\n3,Up,Animation\n");
        let genome = file_with("movieId,tagId,relevance\n");
        let ratings = file_with("userId,movieId,rating\n");

        let catalogue = io::load_catalogue(items.path(), genome.path(), ratings.path()).unwrap();
        let recommender = Recommender::build(&catalogue, &GenreOverlap::new(&catalogue), 1).unwrap();

        let output = NamedTempFile::new().unwrap();
        let output_path = output.path().to_str().unwrap();
        io::write_recommendations(&recommender, &catalogue, 10, Some(output_path)).unwrap();

        let written = fs::read_to_string(output_path).unwrap();
        let lines: Vec<&str> = written.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], r#"{"for_item":"Heat","recommended_items":["Ronin"]}"#);
        assert_eq!(lines[1], r#"{"for_item":"Ronin","recommended_items":["Heat"]}"#);
        assert_eq!(lines[2], r#"{"for_item":"Up","recommended_items":[]}"#);
    }
}
