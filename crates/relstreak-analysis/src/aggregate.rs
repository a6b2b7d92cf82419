//! Streak-tracking aggregation over frame sequences
//!
//! This module scans the ordered frames of one file and counts how long each
//! triplet, and each exact combination of triplets, persists across
//! consecutive frames.
//!
//! # Overview
//!
//! A single forward pass over the frames produces a [`RelationAggregate`]:
//!
//! - **Frame sizes**: how many frames listed `n` triplets
//! - **Relation labels**: occurrences of each relation label
//! - **Triplets**: occurrences of each triplet (duplicates within a frame count)
//! - **Combinations**: occurrences of each non-empty deduplicated frame set
//! - **Triplet streaks**: run lengths over which each triplet stayed present
//! - **Combination streaks**: run lengths over which the frame set stayed equal
//!
//! ```text
//! frame:        1      2      3         4         5
//! set:        {A}    {A}    {A, B}    {A, B}    {}
//!
//! {A}      : |--2--|
//! {A, B}   :               |----2----|
//! A        : |-------------4---------|
//! B        :               |----2----|
//! ```
//!
//! Streaks never span file boundaries. Per-file aggregates are combined with
//! [`RelationAggregate::merge`], which sums counts and concatenates streak
//! lists key by key.
//!
//! # Boundary Mode
//!
//! A run is closed when a later frame differs from it. What happens to runs
//! still open when the sequence ends is selected by [`BoundaryMode`].
//!
//! # Examples
//!
//! ```
//! use relstreak_analysis::{
//!     aggregate::{BoundaryMode, RelationAggregate},
//!     triplet::{Combination, Triplet},
//! };
//!
//! let holding = Triplet::new("person", "holding", "cup");
//! let frames = vec![
//!     vec![holding.clone()],
//!     vec![holding.clone()],
//!     vec![],
//!     vec![holding.clone()],
//! ];
//!
//! let aggregate = RelationAggregate::from_frames(&frames, BoundaryMode::Closed);
//! let set = Combination::from_iter([holding.clone()]);
//!
//! assert_eq!(aggregate.triplets.get(&holding), 3);
//! assert_eq!(aggregate.combination_streaks[&set], vec![2, 1]);
//! assert_eq!(aggregate.triplet_streaks[&holding], vec![2, 1]);
//! ```

use std::{collections::BTreeMap, mem};

use relstreak_stats::frequency::FrequencyTable;

use crate::triplet::{Combination, Triplet};

/// How runs still open at the end of a sequence, and runs "closed" on the
/// empty set, are recorded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryMode {
    /// Runs still open after the last frame are closed as if an empty frame
    /// followed. Nothing is ever recorded for the empty combination, so every
    /// recorded streak is at least one frame long and the streak lengths of a
    /// triplet always sum to the number of frames containing it.
    #[default]
    Closed,
    /// Output-compatible with the historical analyzer.
    ///
    /// Runs still open after the last frame are dropped. When a non-empty
    /// frame follows an empty one (or starts the sequence) the stale
    /// combination counter is recorded under the empty combination, which
    /// yields a `0` entry at the start of every sequence.
    Legacy,
}

/// Counters and streak lists for one file, or merged over many files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationAggregate {
    /// Number of frames by the length of their triplet list.
    pub frame_sizes: FrequencyTable<usize>,
    /// Occurrences of each relation label.
    pub relations: FrequencyTable<String>,
    /// Occurrences of each triplet.
    pub triplets: FrequencyTable<Triplet>,
    /// Occurrences of each non-empty frame set.
    pub combinations: FrequencyTable<Combination>,
    /// Observed run lengths of each triplet, in the order the runs closed.
    pub triplet_streaks: BTreeMap<Triplet, Vec<u32>>,
    /// Observed run lengths of each frame set, in the order the runs closed.
    pub combination_streaks: BTreeMap<Combination, Vec<u32>>,
}

impl RelationAggregate {
    /// Aggregates one ordered frame sequence.
    pub fn from_frames<I, F>(frames: I, mode: BoundaryMode) -> Self
    where
        I: IntoIterator<Item = F>,
        F: AsRef<[Triplet]>,
    {
        let mut aggregator = StreakAggregator::new(mode);
        for frame in frames {
            aggregator.push_frame(frame.as_ref());
        }
        aggregator.finish()
    }

    /// Returns the number of frames scanned.
    #[must_use]
    pub fn total_frames(&self) -> usize {
        self.frame_sizes.total()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frame_sizes.is_empty()
    }

    /// Folds `other` into `self`.
    ///
    /// Counts are summed and streak lists are concatenated key by key; no
    /// adjacency between the two sources is introduced.
    pub fn merge(&mut self, other: Self) {
        let Self {
            frame_sizes,
            relations,
            triplets,
            combinations,
            triplet_streaks,
            combination_streaks,
        } = other;

        self.frame_sizes.merge(frame_sizes);
        self.relations.merge(relations);
        self.triplets.merge(triplets);
        self.combinations.merge(combinations);
        concat_streaks(&mut self.triplet_streaks, triplet_streaks);
        concat_streaks(&mut self.combination_streaks, combination_streaks);
    }
}

fn concat_streaks<K>(dest: &mut BTreeMap<K, Vec<u32>>, src: BTreeMap<K, Vec<u32>>)
where
    K: Ord,
{
    for (key, lengths) in src {
        dest.entry(key).or_default().extend(lengths);
    }
}

impl Extend<RelationAggregate> for RelationAggregate {
    fn extend<I: IntoIterator<Item = RelationAggregate>>(&mut self, iter: I) {
        for aggregate in iter {
            self.merge(aggregate);
        }
    }
}

impl FromIterator<RelationAggregate> for RelationAggregate {
    fn from_iter<I: IntoIterator<Item = RelationAggregate>>(iter: I) -> Self {
        let mut total = Self::default();
        total.extend(iter);
        total
    }
}

/// Running state of a single left-to-right scan over one frame sequence.
///
/// Feed frames in order with [`push_frame`](Self::push_frame) and call
/// [`finish`](Self::finish) once the sequence is exhausted.
#[derive(Debug, Clone)]
pub struct StreakAggregator {
    mode: BoundaryMode,
    aggregate: RelationAggregate,
    previous: Combination,
    // Invariant: keys are exactly the triplets of `previous`.
    running: BTreeMap<Triplet, u32>,
    combination_run: u32,
}

impl StreakAggregator {
    #[must_use]
    pub fn new(mode: BoundaryMode) -> Self {
        Self {
            mode,
            aggregate: RelationAggregate::default(),
            previous: Combination::new(),
            running: BTreeMap::new(),
            combination_run: 0,
        }
    }

    /// Consumes the next frame of the sequence.
    ///
    /// `triplets` is the frame's triplet list as it appears in the source,
    /// duplicates included.
    pub fn push_frame(&mut self, triplets: &[Triplet]) {
        self.aggregate.frame_sizes.add(triplets.len());
        for triplet in triplets {
            self.aggregate.relations.add(triplet.relation.clone());
            self.aggregate.triplets.add(triplet.clone());
        }

        let current = triplets.iter().collect::<Combination>();

        if !current.is_empty() {
            self.aggregate.combinations.add(current.clone());

            if current == self.previous {
                self.combination_run += 1;
                for run in self.running.values_mut() {
                    *run += 1;
                }
            } else {
                self.close_combination_run();
                self.combination_run = 1;

                for triplet in &current {
                    if self.previous.contains(triplet) {
                        *self.running.entry(triplet.clone()).or_default() += 1;
                    } else {
                        self.running.insert(triplet.clone(), 1);
                    }
                }
                for triplet in self.previous.iter().filter(|t| !current.contains(t)) {
                    if let Some(run) = self.running.remove(triplet) {
                        self.aggregate
                            .triplet_streaks
                            .entry(triplet.clone())
                            .or_default()
                            .push(run);
                    }
                }
            }
        } else if !self.previous.is_empty() {
            self.close_all_runs();
        }

        self.previous = current;
    }

    /// Ends the sequence and returns the aggregate.
    #[must_use]
    pub fn finish(mut self) -> RelationAggregate {
        if self.mode == BoundaryMode::Closed && !self.previous.is_empty() {
            self.close_all_runs();
            self.previous = Combination::new();
        }
        self.aggregate
    }

    fn close_all_runs(&mut self) {
        for (triplet, run) in mem::take(&mut self.running) {
            self.aggregate
                .triplet_streaks
                .entry(triplet)
                .or_default()
                .push(run);
        }
        self.close_combination_run();
    }

    fn close_combination_run(&mut self) {
        if self.previous.is_empty() && self.mode == BoundaryMode::Closed {
            return;
        }
        self.aggregate
            .combination_streaks
            .entry(self.previous.clone())
            .or_default()
            .push(self.combination_run);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(subject: &str, relation: &str, object: &str) -> Triplet {
        Triplet::new(subject, relation, object)
    }

    fn set(triplets: &[Triplet]) -> Combination {
        triplets.iter().collect()
    }

    fn sorted(mut lengths: Vec<u32>) -> Vec<u32> {
        lengths.sort_unstable();
        lengths
    }

    fn normalized(aggregate: &RelationAggregate) -> RelationAggregate {
        let mut aggregate = aggregate.clone();
        for lengths in aggregate.triplet_streaks.values_mut() {
            lengths.sort_unstable();
        }
        for lengths in aggregate.combination_streaks.values_mut() {
            lengths.sort_unstable();
        }
        aggregate
    }

    /// `[{arb}, {arb}, {arb, csd}, {arb, csd}, {}]`
    fn two_phase_frames() -> Vec<Vec<Triplet>> {
        let arb = t("a", "r", "b");
        let csd = t("c", "s", "d");
        vec![
            vec![arb.clone()],
            vec![arb.clone()],
            vec![arb.clone(), csd.clone()],
            vec![arb, csd],
            vec![],
        ]
    }

    #[test]
    fn test_two_phase_scenario() {
        let arb = t("a", "r", "b");
        let csd = t("c", "s", "d");

        for mode in [BoundaryMode::Closed, BoundaryMode::Legacy] {
            let aggregate = RelationAggregate::from_frames(two_phase_frames(), mode);

            assert_eq!(aggregate.triplets.get(&arb), 4);
            assert_eq!(aggregate.triplets.get(&csd), 2);
            assert_eq!(aggregate.relations.get(&"r".to_owned()), 4);
            assert_eq!(aggregate.relations.get(&"s".to_owned()), 2);

            let single = set(&[arb.clone()]);
            let pair = set(&[arb.clone(), csd.clone()]);
            assert_eq!(aggregate.combinations.get(&single), 2);
            assert_eq!(aggregate.combinations.get(&pair), 2);
            assert_eq!(aggregate.combination_streaks[&single], vec![2]);
            assert_eq!(aggregate.combination_streaks[&pair], vec![2]);

            assert_eq!(aggregate.triplet_streaks[&arb], vec![4]);
            assert_eq!(aggregate.triplet_streaks[&csd], vec![2]);

            assert_eq!(aggregate.frame_sizes.get(&0), 1);
            assert_eq!(aggregate.frame_sizes.get(&1), 2);
            assert_eq!(aggregate.frame_sizes.get(&2), 2);
            assert_eq!(aggregate.total_frames(), 5);
        }
    }

    #[test]
    fn test_legacy_records_empty_combination_counter() {
        let aggregate = RelationAggregate::from_frames(two_phase_frames(), BoundaryMode::Legacy);
        assert_eq!(aggregate.combination_streaks[&Combination::new()], vec![0]);
        assert_eq!(aggregate.combinations.get(&Combination::new()), 0);

        let closed = RelationAggregate::from_frames(two_phase_frames(), BoundaryMode::Closed);
        assert!(!closed.combination_streaks.contains_key(&Combination::new()));
    }

    #[test]
    fn test_empty_frame_breaks_streak() {
        let s = vec![t("a", "r", "b"), t("c", "s", "d")];
        let frames = vec![s.clone(), s.clone(), vec![], s.clone()];

        let closed = RelationAggregate::from_frames(&frames, BoundaryMode::Closed);
        assert_eq!(closed.combination_streaks[&set(&s)], vec![2, 1]);
        assert_eq!(closed.triplet_streaks[&s[0]], vec![2, 1]);

        // Legacy drops the final open run and records the stale counter for
        // the empty set when `s` resumes.
        let legacy = RelationAggregate::from_frames(&frames, BoundaryMode::Legacy);
        assert_eq!(legacy.combination_streaks[&set(&s)], vec![2]);
        assert_eq!(legacy.combination_streaks[&Combination::new()], vec![0, 2]);
        assert_eq!(legacy.triplet_streaks[&s[0]], vec![2]);
    }

    #[test]
    fn test_duplicates_count_individually_but_collapse_in_set() {
        let arb = t("a", "r", "b");
        let frames = vec![vec![arb.clone(), arb.clone()], vec![arb.clone()]];
        let aggregate = RelationAggregate::from_frames(&frames, BoundaryMode::Closed);

        assert_eq!(aggregate.triplets.get(&arb), 3);
        assert_eq!(aggregate.frame_sizes.get(&2), 1);
        assert_eq!(aggregate.frame_sizes.get(&1), 1);

        let single = set(&[arb.clone()]);
        assert_eq!(aggregate.combinations.get(&single), 2);
        assert_eq!(aggregate.combination_streaks[&single], vec![2]);
        assert_eq!(aggregate.triplet_streaks[&arb], vec![2]);
    }

    #[test]
    fn test_vanished_triplet_is_closed_while_others_continue() {
        let a = t("a", "r", "b");
        let b = t("c", "s", "d");
        let c = t("e", "q", "f");
        let frames = vec![
            vec![a.clone(), b.clone()],
            vec![a.clone(), c.clone()],
            vec![a.clone(), c.clone()],
            vec![c.clone()],
        ];
        let aggregate = RelationAggregate::from_frames(&frames, BoundaryMode::Closed);

        assert_eq!(aggregate.triplet_streaks[&a], vec![3]);
        assert_eq!(aggregate.triplet_streaks[&b], vec![1]);
        assert_eq!(aggregate.triplet_streaks[&c], vec![3]);
        assert_eq!(aggregate.combination_streaks[&set(&[a.clone(), b])], vec![1]);
        assert_eq!(aggregate.combination_streaks[&set(&[a, c.clone()])], vec![2]);
        assert_eq!(aggregate.combination_streaks[&set(&[c])], vec![1]);
    }

    #[test]
    fn test_one_combination_count_per_non_empty_frame() {
        let a = t("a", "r", "b");
        let b = t("c", "s", "d");
        let frames = vec![
            vec![a.clone()],
            vec![a.clone(), b.clone()],
            vec![],
            vec![b.clone(), a.clone(), b.clone()],
            vec![b.clone()],
        ];
        let aggregate = RelationAggregate::from_frames(&frames, BoundaryMode::Closed);

        assert_eq!(aggregate.combinations.total(), 4);
        assert_eq!(aggregate.combinations.get(&set(&[a.clone()])), 1);
        assert_eq!(aggregate.combinations.get(&set(&[b.clone()])), 1);
        assert_eq!(aggregate.combinations.get(&set(&[a, b])), 2);
    }

    #[test]
    fn test_closed_mode_conserves_streak_lengths() {
        let pool = [
            t("a", "r", "b"),
            t("c", "s", "d"),
            t("e", "q", "f"),
            t("g", "r", "h"),
        ];
        // Each frame takes the triplets whose bit is set in the mask.
        let masks = [
            0b0001, 0b0011, 0b0011, 0b0000, 0b0110, 0b0110, 0b0111, 0b1111, 0b1000, 0b1000,
            0b0000, 0b0000, 0b0101, 0b0101, 0b0101,
        ];
        let frames = masks
            .iter()
            .map(|mask| {
                pool.iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, triplet)| triplet.clone())
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        let aggregate = RelationAggregate::from_frames(&frames, BoundaryMode::Closed);
        for triplet in &pool {
            let present = frames.iter().filter(|f| f.contains(triplet)).count();
            let recorded = aggregate.triplet_streaks[triplet].iter().sum::<u32>();
            assert_eq!(recorded as usize, present, "{triplet}");
            assert!(aggregate.triplet_streaks[triplet].iter().all(|&n| n >= 1));
        }
        for (combination, lengths) in &aggregate.combination_streaks {
            let present = frames
                .iter()
                .filter(|f| f.iter().collect::<Combination>() == *combination)
                .count();
            assert_eq!(lengths.iter().sum::<u32>() as usize, present, "{combination}");
        }

        // Legacy loses at most the final open run of each triplet.
        let legacy = RelationAggregate::from_frames(&frames, BoundaryMode::Legacy);
        let last = &frames[frames.len() - 1];
        for triplet in &pool {
            let closed_sum = aggregate.triplet_streaks[triplet].iter().sum::<u32>();
            let legacy_sum = legacy
                .triplet_streaks
                .get(triplet)
                .map_or(0, |l| l.iter().sum::<u32>());
            if last.contains(triplet) {
                assert!(legacy_sum < closed_sum, "{triplet}");
            } else {
                assert_eq!(legacy_sum, closed_sum, "{triplet}");
            }
        }
    }

    #[test]
    fn test_empty_sequence() {
        let frames: Vec<Vec<Triplet>> = vec![];
        let aggregate = RelationAggregate::from_frames(&frames, BoundaryMode::Closed);
        assert!(aggregate.is_empty());
        assert_eq!(aggregate, RelationAggregate::default());

        let empty_frames: Vec<Vec<Triplet>> = vec![vec![], vec![]];
        let aggregate = RelationAggregate::from_frames(&empty_frames, BoundaryMode::Legacy);
        assert_eq!(aggregate.frame_sizes.get(&0), 2);
        assert!(aggregate.combination_streaks.is_empty());
        assert!(aggregate.triplet_streaks.is_empty());
    }

    #[test]
    fn test_merge_sums_and_concatenates() {
        let a = t("a", "r", "b");
        let first = RelationAggregate::from_frames(
            &[vec![a.clone()], vec![a.clone()]],
            BoundaryMode::Closed,
        );
        let second = RelationAggregate::from_frames(&[vec![a.clone()]], BoundaryMode::Closed);

        let mut total = first.clone();
        total.merge(second);

        assert_eq!(total.triplets.get(&a), 3);
        assert_eq!(total.total_frames(), 3);
        // File boundaries are never bridged.
        assert_eq!(total.triplet_streaks[&a], vec![2, 1]);
        assert_eq!(total.combination_streaks[&set(&[a])], vec![2, 1]);
    }

    #[test]
    fn test_merge_order_independent() {
        let a = t("a", "r", "b");
        let b = t("c", "s", "d");
        let files = [
            RelationAggregate::from_frames(
                &[vec![a.clone()], vec![a.clone(), b.clone()], vec![]],
                BoundaryMode::Closed,
            ),
            RelationAggregate::from_frames(
                &[vec![b.clone()], vec![b.clone()], vec![b.clone()]],
                BoundaryMode::Closed,
            ),
            RelationAggregate::from_frames(
                &[vec![a.clone(), b.clone()], vec![a.clone()]],
                BoundaryMode::Closed,
            ),
        ];

        let forward = files.iter().cloned().collect::<RelationAggregate>();
        let backward = files.iter().rev().cloned().collect::<RelationAggregate>();

        let mut nested = files[1].clone();
        nested.merge(files[2].clone());
        let mut grouped = files[0].clone();
        grouped.merge(nested);

        assert_eq!(normalized(&forward), normalized(&backward));
        assert_eq!(normalized(&forward), normalized(&grouped));
        assert_eq!(sorted(forward.triplet_streaks[&b].clone()), vec![1, 1, 3]);
    }
}
