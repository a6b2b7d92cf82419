//! JSON export command
//!
//! Writes the per-file aggregates and the totals, including the raw streak
//! lists and their summaries, as a single JSON document.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::PathBuf,
};

use chrono::{DateTime, Utc};
use clap::Args;
use relstreak_analysis::{
    aggregate::RelationAggregate,
    summary::{StreakSummary, StreakSummaryRecord, SummaryOptions},
    triplet::{Combination, Triplet},
};
use serde::Serialize;

use crate::{
    load::{self, Corpus, CorpusArg},
    util::Output,
};

#[derive(Debug, Clone, Args)]
pub(crate) struct ExportArg {
    #[clap(flatten)]
    pub corpus: CorpusArg,

    /// Output file path (defaults to stdout)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ExportDocument<'a> {
    generated_at: DateTime<Utc>,
    boundary: &'static str,
    min_streak_len: u32,
    files: Vec<FileRecord<'a>>,
    skipped: &'a [String],
    total: AggregateRecord<'a>,
}

#[derive(Debug, Serialize)]
struct FileRecord<'a> {
    name: &'a str,
    #[serde(flatten)]
    aggregate: AggregateRecord<'a>,
}

#[derive(Debug, Serialize)]
struct AggregateRecord<'a> {
    frames: usize,
    frame_sizes: BTreeMap<usize, usize>,
    relations: BTreeMap<&'a str, usize>,
    triplets: Vec<TripletRecord<'a>>,
    combinations: Vec<CombinationRecord<'a>>,
}

#[derive(Debug, Serialize)]
struct TripletRecord<'a> {
    triplet: &'a Triplet,
    count: usize,
    streaks: &'a [u32],
    summary: StreakSummaryRecord,
}

#[derive(Debug, Serialize)]
struct CombinationRecord<'a> {
    triplets: &'a Combination,
    count: usize,
    streaks: &'a [u32],
    summary: StreakSummaryRecord,
}

impl<'a> AggregateRecord<'a> {
    fn new(aggregate: &'a RelationAggregate, options: &SummaryOptions) -> Self {
        let triplets = aggregate
            .triplets
            .iter()
            .map(|(triplet, &count)| {
                let streaks = streaks_of(&aggregate.triplet_streaks, triplet);
                TripletRecord {
                    triplet,
                    count,
                    streaks,
                    summary: (&StreakSummary::from_lengths(streaks, options)).into(),
                }
            })
            .collect();

        // Legacy mode may record streaks for a combination that was never counted.
        let combination_keys = aggregate
            .combinations
            .iter()
            .map(|(combination, _)| combination)
            .chain(aggregate.combination_streaks.keys())
            .collect::<BTreeSet<_>>();
        let combinations = combination_keys
            .into_iter()
            .map(|combination| {
                let streaks = streaks_of(&aggregate.combination_streaks, combination);
                CombinationRecord {
                    triplets: combination,
                    count: aggregate.combinations.get(combination),
                    streaks,
                    summary: (&StreakSummary::from_lengths(streaks, options)).into(),
                }
            })
            .collect();

        Self {
            frames: aggregate.total_frames(),
            frame_sizes: aggregate
                .frame_sizes
                .iter()
                .map(|(size, count)| (*size, *count))
                .collect(),
            relations: aggregate
                .relations
                .iter()
                .map(|(relation, count)| (relation.as_str(), *count))
                .collect(),
            triplets,
            combinations,
        }
    }
}

fn streaks_of<'a, K>(streaks: &'a BTreeMap<K, Vec<u32>>, key: &K) -> &'a [u32]
where
    K: Ord,
{
    streaks.get(key).map_or(&[][..], Vec::as_slice)
}

fn build_document<'a>(
    corpus: &'a Corpus,
    arg: &CorpusArg,
    generated_at: DateTime<Utc>,
) -> ExportDocument<'a> {
    let options = arg.summary_options();
    ExportDocument {
        generated_at,
        boundary: arg.boundary.as_str(),
        min_streak_len: options.min_streak_len,
        files: corpus
            .files
            .iter()
            .map(|file| FileRecord {
                name: &file.name,
                aggregate: AggregateRecord::new(&file.aggregate, &options),
            })
            .collect(),
        skipped: &corpus.skipped,
        total: AggregateRecord::new(&corpus.total, &options),
    }
}

pub(crate) fn run(arg: &ExportArg) -> anyhow::Result<()> {
    let corpus = load::load_corpus(&arg.corpus)?;
    let document = build_document(&corpus, &arg.corpus, Utc::now());

    let mut output = Output::from_output_path(arg.output.clone())?;
    output.write_json(&document)?;

    if let Output::File { path, .. } = &output {
        tracing::info!(path = %path.display(), "export written");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use relstreak_analysis::aggregate::BoundaryMode;
    use serde_json::{Value, json};

    use crate::load::{BoundaryArg, FileAggregate};

    use super::*;

    fn corpus_arg(boundary: BoundaryArg) -> CorpusArg {
        CorpusArg {
            dir: Path::new("frames").to_owned(),
            recursive: false,
            boundary,
            min_streak_len: 1,
            skip_invalid: false,
            jobs: None,
        }
    }

    fn corpus(mode: BoundaryMode) -> Corpus {
        let arb = Triplet::new("a", "r", "b");
        let frames = vec![vec![arb.clone()], vec![arb.clone()], vec![], vec![arb]];
        let aggregate = RelationAggregate::from_frames(&frames, mode);
        Corpus {
            files: vec![FileAggregate {
                name: "scene.json".to_owned(),
                aggregate: aggregate.clone(),
            }],
            skipped: vec!["broken.json".to_owned()],
            total: aggregate,
        }
    }

    #[test]
    fn test_export_document_shape() {
        let corpus = corpus(BoundaryMode::Closed);
        let document = build_document(&corpus, &corpus_arg(BoundaryArg::Closed), Utc::now());
        let value = serde_json::to_value(&document).unwrap();

        assert_eq!(value["boundary"], "closed");
        assert_eq!(value["min_streak_len"], 1);
        assert_eq!(value["skipped"], json!(["broken.json"]));
        assert_eq!(value["files"][0]["name"], "scene.json");
        assert_eq!(value["files"][0]["frames"], 4);

        let total = &value["total"];
        assert_eq!(total["frame_sizes"], json!({ "0": 1, "1": 3 }));
        assert_eq!(total["relations"], json!({ "r": 3 }));
        assert_eq!(
            total["triplets"],
            json!([{
                "triplet": ["a", "r", "b"],
                "count": 3,
                "streaks": [2, 1],
                "summary": {
                    "streak_count": 2,
                    "multi_frame_count": 1,
                    "mean": 1.5,
                    "std_dev": std::f64::consts::FRAC_1_SQRT_2,
                    "median": 1.5,
                    "max": 2.0,
                },
            }])
        );
        assert_eq!(total["combinations"].as_array().unwrap().len(), 1);
        assert_eq!(total["combinations"][0]["count"], 3);
    }

    #[test]
    fn test_legacy_export_includes_uncounted_empty_combination() {
        let corpus = corpus(BoundaryMode::Legacy);
        let document = build_document(&corpus, &corpus_arg(BoundaryArg::Legacy), Utc::now());
        let value = serde_json::to_value(&document).unwrap();

        let combinations = value["total"]["combinations"].as_array().unwrap();
        let empty = combinations
            .iter()
            .find(|c| c["triplets"] == json!([]))
            .unwrap();
        assert_eq!(empty["count"], 0);
        assert_eq!(empty["streaks"], json!([0, 2]));
        assert_eq!(empty["summary"]["mean"], Value::from(1.0));
    }
}
