//! Statistical utilities for the relstreak project.
//!
//! This crate provides:
//!
//! - **Descriptive statistics**: count, min, max, mean, median, sample variance
//!   and standard deviation
//! - **Frequency tables**: mergeable occurrence counts for categorical data
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`frequency`]: Frequency tables with key-wise merging
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use relstreak_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Counting occurrences
//!
//! ```
//! use relstreak_stats::frequency::FrequencyTable;
//!
//! let table = ["on", "near", "on"].into_iter().collect::<FrequencyTable<_>>();
//! assert_eq!(table.sorted_by_count()[0], (&"on", 2));
//! ```

pub mod descriptive;
pub mod frequency;
