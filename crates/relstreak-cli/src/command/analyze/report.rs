//! Text report layout
//!
//! Means and standard deviations are always printed with two decimals
//! (`2.00`), and medians and maxima in their shortest form (`2`, `1.5`). The
//! statistics are shown only when the standard deviation rounded to two
//! decimals is non-zero.

use std::io::{self, Write};

use relstreak_analysis::{
    aggregate::RelationAggregate,
    summary::{StreakSummary, SummaryOptions, TripletSummary},
};

use crate::load::{BoundaryArg, Corpus};

/// Width of the triplet label column
const LABEL_WIDTH: usize = 46;

#[derive(Debug, Clone)]
pub(super) struct ReportSettings {
    pub boundary: BoundaryArg,
    pub options: SummaryOptions,
    pub top_triplets: usize,
    pub top_combinations: usize,
}

pub(super) fn write_report<W>(w: &mut W, corpus: &Corpus, settings: &ReportSettings) -> io::Result<()>
where
    W: Write,
{
    writeln!(
        w,
        "Streak analysis (boundary: {}, min streak length: {})",
        settings.boundary.as_str(),
        settings.options.min_streak_len
    )?;
    if !corpus.skipped.is_empty() {
        writeln!(w, "Skipped files: {}", corpus.skipped.join(", "))?;
    }

    writeln!(w)?;
    writeln!(w, "Per File Analysis:")?;
    for file in &corpus.files {
        writeln!(w)?;
        writeln!(w, "{}:", file.name)?;
        write_overview(w, &file.aggregate)?;

        writeln!(
            w,
            "Top {} highest average streak triplets:",
            settings.top_triplets
        )?;
        let total_frames = file.aggregate.total_frames();
        for summary in file
            .aggregate
            .triplets_by_mean_streak(&settings.options, settings.top_triplets)
        {
            write_triplet_line(w, &summary, total_frames)?;
        }
    }

    writeln!(w)?;
    writeln!(w, "Total Analysis:")?;
    let total = &corpus.total;
    write_overview(w, total)?;

    writeln!(w)?;
    writeln!(w, "Total triplet counts and streak statistics:")?;
    let total_frames = total.total_frames();
    for summary in total.triplets_by_count(&settings.options) {
        write_triplet_line(w, &summary, total_frames)?;
    }

    writeln!(w)?;
    writeln!(
        w,
        "Top {} highest average streak triplet combinations:",
        settings.top_combinations
    )?;
    for summary in total.combinations_by_mean_streak(&settings.options, settings.top_combinations)
    {
        writeln!(w)?;
        for triplet in summary.combination {
            writeln!(w, "  {triplet}")?;
        }
        write!(w, "  Count: {}", summary.count)?;
        match &summary.streaks.stats {
            Some(stats) if summary.streaks.has_spread() => writeln!(
                w,
                "; Streak Info: Avg: {:.2}\tStd_Dev: {:.2}\tMedian: {}\tMax: {}",
                stats.mean, stats.std_dev, stats.median, stats.max
            )?,
            _ => writeln!(w)?,
        }
    }

    Ok(())
}

/// Frame size histogram and relation label counts.
fn write_overview<W>(w: &mut W, aggregate: &RelationAggregate) -> io::Result<()>
where
    W: Write,
{
    let total_frames = aggregate.total_frames();

    writeln!(w, "Frames with x triplets:")?;
    for (size, count) in &aggregate.frame_sizes {
        let share = aggregate.frame_sizes.percentage(size, total_frames);
        writeln!(w, "  {size}: {count} ({:.2}%)", share.unwrap_or(0.0))?;
    }
    writeln!(w, "Frames Total: {total_frames}")?;

    writeln!(w, "Relation labels:")?;
    for (relation, count) in aggregate.relations.sorted_by_count() {
        // Share of frames, not of relations.
        let share = aggregate.relations.percentage(relation, total_frames);
        writeln!(w, "  {relation}: {count} ({:.2}%)", share.unwrap_or(0.0))?;
    }
    Ok(())
}

fn write_triplet_line<W>(w: &mut W, summary: &TripletSummary, total_frames: usize) -> io::Result<()>
where
    W: Write,
{
    let TripletSummary {
        triplet,
        count,
        streaks,
    } = summary;
    let label = format!("{triplet}:");
    write!(
        w,
        "{label:<LABEL_WIDTH$} {count:>5} ({:5.2}%); Streak Info:  Streak_Num: {:>3}  Num_of_streaks>1: {:>3}",
        percent(*count, total_frames),
        streaks.streak_count,
        streaks.multi_frame_count,
    )?;
    write_streak_stats(w, streaks)?;
    writeln!(w)
}

/// Mean, deviation, median and max, printed only when the streaks vary.
fn write_streak_stats<W>(w: &mut W, streaks: &StreakSummary) -> io::Result<()>
where
    W: Write,
{
    match &streaks.stats {
        Some(stats) if streaks.has_spread() => write!(
            w,
            "  Avg: {:>7.2}  Std_Dev: {:>7.2}  Median: {:>7}  Max: {:>7}",
            stats.mean, stats.std_dev, stats.median, stats.max
        ),
        _ => Ok(()),
    }
}

#[expect(clippy::cast_precision_loss)]
fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
