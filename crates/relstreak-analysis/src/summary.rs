//! Streak length summaries and rankings
//!
//! Turns the raw streak lists of a [`RelationAggregate`] into descriptive
//! statistics and ranks triplets and combinations by them.
//!
//! Which streaks enter the statistics is controlled by
//! [`SummaryOptions::min_streak_len`]. With the default of `1` no filter is
//! applied and every recorded length enters the statistics, including the `0`
//! entries of [`BoundaryMode::Legacy`]; `2` restricts the statistics to streaks
//! spanning more than one frame. The streak counts are always taken over the
//! unfiltered list.
//!
//! [`BoundaryMode::Legacy`]: crate::aggregate::BoundaryMode::Legacy
//!
//! # Examples
//!
//! ```
//! use relstreak_analysis::summary::{StreakSummary, SummaryOptions};
//!
//! let summary = StreakSummary::from_lengths(&[1, 3, 5], &SummaryOptions::default());
//! assert_eq!(summary.streak_count, 3);
//! assert_eq!(summary.multi_frame_count, 2);
//! assert_eq!(summary.stats.unwrap().mean, 3.0);
//!
//! let options = SummaryOptions { min_streak_len: 2 };
//! let summary = StreakSummary::from_lengths(&[1, 3, 5], &options);
//! assert_eq!(summary.stats.unwrap().mean, 4.0);
//! ```

use relstreak_stats::descriptive::DescriptiveStats;
use serde::Serialize;

use crate::{
    aggregate::RelationAggregate,
    triplet::{Combination, Triplet},
};

/// Options controlling how streak lists are summarized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    /// Shortest streak included in the statistics. `1` disables filtering.
    pub min_streak_len: u32,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self { min_streak_len: 1 }
    }
}

/// Distribution summary of one streak list.
#[derive(Debug, Clone, PartialEq)]
pub struct StreakSummary {
    /// Number of recorded streaks.
    pub streak_count: usize,
    /// Number of recorded streaks longer than one frame.
    pub multi_frame_count: usize,
    /// Statistics over the streaks of at least `min_streak_len` frames, or
    /// `None` if no streak qualifies.
    pub stats: Option<DescriptiveStats>,
}

impl StreakSummary {
    #[must_use]
    pub fn from_lengths(lengths: &[u32], options: &SummaryOptions) -> Self {
        let stats = DescriptiveStats::from_counts(
            lengths
                .iter()
                .copied()
                .filter(|&len| options.min_streak_len <= 1 || len >= options.min_streak_len),
        );
        Self {
            streak_count: lengths.len(),
            multi_frame_count: lengths.iter().filter(|&&len| len > 1).count(),
            stats,
        }
    }

    /// Mean streak length, if any streak qualified.
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        self.stats.as_ref().map(|s| s.mean)
    }

    /// Returns `true` if the standard deviation is non-zero at two decimal
    /// places.
    #[must_use]
    pub fn has_spread(&self) -> bool {
        self.stats
            .as_ref()
            .is_some_and(|s| (s.std_dev * 100.0).round() > 0.0)
    }
}

/// Occurrence count and streak summary of one triplet.
#[derive(Debug, Clone)]
pub struct TripletSummary<'a> {
    pub triplet: &'a Triplet,
    pub count: usize,
    pub streaks: StreakSummary,
}

/// Occurrence count and streak summary of one combination.
#[derive(Debug, Clone)]
pub struct CombinationSummary<'a> {
    pub combination: &'a Combination,
    pub count: usize,
    pub streaks: StreakSummary,
}

impl RelationAggregate {
    /// Summarizes every counted triplet, most frequent first.
    ///
    /// Triplets with equal counts keep triplet order.
    #[must_use]
    pub fn triplets_by_count(&self, options: &SummaryOptions) -> Vec<TripletSummary<'_>> {
        self.triplets
            .sorted_by_count()
            .into_iter()
            .map(|(triplet, count)| TripletSummary {
                triplet,
                count,
                streaks: self.triplet_streak_summary(triplet, options),
            })
            .collect()
    }

    /// Returns up to `limit` triplets with the highest mean streak length.
    ///
    /// Triplets whose streak list has no qualifying entry are left out.
    #[must_use]
    pub fn triplets_by_mean_streak(
        &self,
        options: &SummaryOptions,
        limit: usize,
    ) -> Vec<TripletSummary<'_>> {
        let summaries: Vec<TripletSummary<'_>> = self
            .triplet_streaks
            .iter()
            .map(|(triplet, lengths)| TripletSummary {
                triplet,
                count: self.triplets.get(triplet),
                streaks: StreakSummary::from_lengths(lengths, options),
            })
            .collect();
        top_by_mean(summaries, |s| &s.streaks, limit)
    }

    /// Returns up to `limit` combinations with the highest mean streak length.
    ///
    /// Combinations whose streak list has no qualifying entry are left out.
    #[must_use]
    pub fn combinations_by_mean_streak(
        &self,
        options: &SummaryOptions,
        limit: usize,
    ) -> Vec<CombinationSummary<'_>> {
        let summaries: Vec<CombinationSummary<'_>> = self
            .combination_streaks
            .iter()
            .map(|(combination, lengths)| CombinationSummary {
                combination,
                count: self.combinations.get(combination),
                streaks: StreakSummary::from_lengths(lengths, options),
            })
            .collect();
        top_by_mean(summaries, |s| &s.streaks, limit)
    }

    fn triplet_streak_summary(&self, triplet: &Triplet, options: &SummaryOptions) -> StreakSummary {
        let lengths = self
            .triplet_streaks
            .get(triplet)
            .map_or(&[][..], Vec::as_slice);
        StreakSummary::from_lengths(lengths, options)
    }
}

fn top_by_mean<T, F>(mut summaries: Vec<T>, streaks: F, limit: usize) -> Vec<T>
where
    F: Fn(&T) -> &StreakSummary,
{
    summaries.retain(|s| streaks(s).stats.is_some());
    // Stable sort: equal means keep key order.
    summaries.sort_by(|a, b| {
        let a = streaks(a).mean().unwrap_or(f64::NEG_INFINITY);
        let b = streaks(b).mean().unwrap_or(f64::NEG_INFINITY);
        b.total_cmp(&a)
    });
    summaries.truncate(limit);
    summaries
}

/// Serializable form of [`StreakSummary`].
#[derive(Debug, Clone, Serialize)]
pub struct StreakSummaryRecord {
    pub streak_count: usize,
    pub multi_frame_count: usize,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub median: Option<f64>,
    pub max: Option<f64>,
}

impl From<&StreakSummary> for StreakSummaryRecord {
    fn from(summary: &StreakSummary) -> Self {
        let stats = summary.stats.as_ref();
        Self {
            streak_count: summary.streak_count,
            multi_frame_count: summary.multi_frame_count,
            mean: stats.map(|s| s.mean),
            std_dev: stats.map(|s| s.std_dev),
            median: stats.map(|s| s.median),
            max: stats.map(|s| s.max),
        }
    }
}
