//! Streak analysis of per-frame semantic relation records
//!
//! This crate decodes frame files, scans their frames for persisting relation
//! triplets, and summarizes how long each triplet and each exact triplet
//! combination stays unchanged.
//!
//! # Overview
//!
//! 1. **Load Frames** ([`source::FrameSequence`]): Decode one frame file in
//!    document order
//! 2. **Aggregate** ([`aggregate::RelationAggregate`]): Count labels, triplets
//!    and combinations and collect streak lengths in a single pass
//! 3. **Merge** ([`aggregate::RelationAggregate::merge`]): Fold per-file
//!    aggregates into totals
//! 4. **Summarize** ([`summary::StreakSummary`]): Descriptive statistics and
//!    rankings over the streak lists
//!
//! Each file is aggregated independently, so files can be processed in
//! parallel and merged afterwards in any order.
//!
//! # Examples
//!
//! ```
//! use relstreak_analysis::{
//!     aggregate::{BoundaryMode, RelationAggregate},
//!     source::FrameSequence,
//!     summary::SummaryOptions,
//! };
//!
//! let first = FrameSequence::from_json_str(
//!     r#"{
//!         "1": { "semantic_relations": [["person", "holding", "cup"]] },
//!         "2": { "semantic_relations": [["person", "holding", "cup"]] },
//!         "3": { "semantic_relations": [] }
//!     }"#,
//! )?;
//! let second = FrameSequence::from_json_str(
//!     r#"{ "1": { "semantic_relations": [["person", "holding", "cup"]] } }"#,
//! )?;
//!
//! let total = [first, second]
//!     .iter()
//!     .map(|frames| frames.aggregate(BoundaryMode::Closed))
//!     .collect::<RelationAggregate>();
//!
//! let ranked = total.triplets_by_mean_streak(&SummaryOptions::default(), 10);
//! assert_eq!(ranked[0].count, 3);
//! assert_eq!(ranked[0].streaks.streak_count, 2);
//! assert_eq!(ranked[0].streaks.mean(), Some(1.5));
//! # Ok::<(), serde_json::Error>(())
//! ```

pub mod aggregate;
pub mod source;
pub mod summary;
pub mod triplet;
