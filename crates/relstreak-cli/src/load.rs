//! Frame file discovery and per-file aggregation
//!
//! Files are decoded and aggregated in parallel, one task per file. Results are
//! folded into the totals afterwards in file-name order, so the output does not
//! depend on scheduling.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, ValueEnum};
use rayon::prelude::*;
use relstreak_analysis::{
    aggregate::{BoundaryMode, RelationAggregate},
    source::FrameSequence,
    summary::SummaryOptions,
};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Input selection and aggregation settings shared by all commands.
#[derive(Debug, Clone, Args)]
pub(crate) struct CorpusArg {
    /// Directory containing the JSON frame files
    pub dir: PathBuf,

    /// Also descend into subdirectories
    #[arg(long)]
    pub recursive: bool,

    /// How runs still open at the end of a file are recorded
    #[arg(long, value_enum, default_value_t = BoundaryArg::Closed)]
    pub boundary: BoundaryArg,

    /// Shortest streak included in the streak statistics
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub min_streak_len: u32,

    /// Skip files that cannot be read or parsed instead of aborting
    #[arg(long)]
    pub skip_invalid: bool,

    /// Number of worker threads (defaults to the number of CPUs)
    #[arg(long)]
    pub jobs: Option<usize>,
}

impl CorpusArg {
    pub fn summary_options(&self) -> SummaryOptions {
        SummaryOptions {
            min_streak_len: self.min_streak_len,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum BoundaryArg {
    /// Close runs still open at the end of a file
    Closed,
    /// Reproduce the historical analyzer output
    Legacy,
}

impl BoundaryArg {
    pub fn as_str(self) -> &'static str {
        match self {
            BoundaryArg::Closed => "closed",
            BoundaryArg::Legacy => "legacy",
        }
    }
}

impl From<BoundaryArg> for BoundaryMode {
    fn from(arg: BoundaryArg) -> Self {
        match arg {
            BoundaryArg::Closed => BoundaryMode::Closed,
            BoundaryArg::Legacy => BoundaryMode::Legacy,
        }
    }
}

/// The aggregate of one frame file.
#[derive(Debug, Clone)]
pub(crate) struct FileAggregate {
    /// Path relative to the input directory
    pub name: String,
    pub aggregate: RelationAggregate,
}

/// Per-file aggregates and their totals.
#[derive(Debug, Clone, Default)]
pub(crate) struct Corpus {
    pub files: Vec<FileAggregate>,
    pub skipped: Vec<String>,
    pub total: RelationAggregate,
}

/// Lists the `*.json` files under `dir`, sorted by file name.
pub(crate) fn discover_frame_files(dir: &Path, recursive: bool) -> anyhow::Result<Vec<PathBuf>> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut paths = vec![];
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
    {
        let entry =
            entry.with_context(|| format!("Failed to read directory: {}", dir.display()))?;
        let is_json = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if entry.file_type().is_file() && is_json {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}

pub(crate) fn load_corpus(arg: &CorpusArg) -> anyhow::Result<Corpus> {
    let paths = discover_frame_files(&arg.dir, arg.recursive)?;
    info!(
        dir = %arg.dir.display(),
        files = paths.len(),
        "found frame files"
    );

    let mode = BoundaryMode::from(arg.boundary);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(arg.jobs.unwrap_or(0))
        .build()
        .context("Failed to build worker thread pool")?;
    let results = pool.install(|| {
        paths
            .into_par_iter()
            .map(|path| {
                let result = FrameSequence::load(&path).map(|frames| frames.aggregate(mode));
                (path, result)
            })
            .collect::<Vec<_>>()
    });

    let mut corpus = Corpus::default();
    for (path, result) in results {
        let name = display_name(&arg.dir, &path);
        match result {
            Ok(aggregate) => {
                debug!(
                    file = %name,
                    frames = aggregate.total_frames(),
                    triplets = aggregate.triplets.len(),
                    combinations = aggregate.combinations.len(),
                    "aggregated frame file"
                );
                corpus.total.merge(aggregate.clone());
                corpus.files.push(FileAggregate { name, aggregate });
            }
            Err(err) if arg.skip_invalid => {
                let err = anyhow::Error::from(err);
                warn!("skipping {name}: {err:#}");
                corpus.skipped.push(name);
            }
            Err(err) => return Err(err.into()),
        }
    }

    info!(
        files = corpus.files.len(),
        skipped = corpus.skipped.len(),
        frames = corpus.total.total_frames(),
        "aggregation finished"
    );
    Ok(corpus)
}

fn display_name(dir: &Path, path: &Path) -> String {
    path.strip_prefix(dir)
        .unwrap_or(path)
        .display()
        .to_string()
}
