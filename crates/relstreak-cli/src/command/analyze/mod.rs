//! Text report command
//!
//! Aggregates every frame file in a directory and writes a plain-text report
//! with per-file sections followed by the totals.

mod report;

use std::{io::Write as _, path::PathBuf};

use anyhow::Context;
use clap::Args;

use crate::{
    load::{self, CorpusArg},
    util::Output,
};

use self::report::ReportSettings;

#[derive(Debug, Clone, Args)]
pub(crate) struct AnalyzeArg {
    #[clap(flatten)]
    pub corpus: CorpusArg,

    /// Report file path (defaults to stdout)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Number of triplets listed per file, ranked by mean streak length
    #[arg(long, default_value_t = 10)]
    pub top_triplets: usize,

    /// Number of combinations listed in the totals, ranked by mean streak length
    #[arg(long, default_value_t = 20)]
    pub top_combinations: usize,
}

pub(crate) fn run(arg: &AnalyzeArg) -> anyhow::Result<()> {
    let corpus = load::load_corpus(&arg.corpus)?;

    let settings = ReportSettings {
        boundary: arg.corpus.boundary,
        options: arg.corpus.summary_options(),
        top_triplets: arg.top_triplets,
        top_combinations: arg.top_combinations,
    };

    let mut output = Output::from_output_path(arg.output.clone())?;
    report::write_report(&mut output, &corpus, &settings)
        .and_then(|()| output.flush())
        .with_context(|| format!("Failed to write report to {}", output.display_path()))?;

    if let Output::File { path, .. } = &output {
        tracing::info!(path = %path.display(), "report written");
    }
    Ok(())
}
