// Copyright (c) 2021 10x Genomics, Inc. All rights reserved.

use crate::aggregator::{MaxClonotypeAggregator, MaxClonotypeAggregatorFactory, SampleAggregator};
use anyhow::Result;
use clonotype_key::ClonotypeKeyGen;
use vdj_sample::{Clonotype, ClonotypeFilter, Sample};

/// Configuration errors of pool filters.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum PoolError {
    /// Threshold ratio that is zero, negative or not finite.
    #[error("The ratio filter threshold must be a positive number, got {ratio}")]
    InvalidThresholdRatio {
        /// The rejected ratio.
        ratio: f64,
    },
}

/// Noise and cross-sample contamination filter.
///
/// A clonotype passes if its frequency scaled by the threshold ratio exceeds
/// the largest frequency of its equivalence class in any of the bound samples.
/// Classes absent from the bound samples always pass.
pub struct RatioFilter<'a> {
    sample_aggregator: SampleAggregator<'a, MaxClonotypeAggregator>,
    threshold_ratio: f64,
    negative: bool,
}

impl<'a> RatioFilter<'a> {
    /// Filter bound to `samples`, comparing classes defined by `key_gen`.
    /// With `negative`, only the clonotypes the positive filter rejects pass.
    pub fn new<I>(
        samples: I,
        key_gen: ClonotypeKeyGen,
        threshold_ratio: f64,
        negative: bool,
    ) -> Result<Self, PoolError>
    where
        I: IntoIterator<Item = &'a Sample>,
    {
        if !(threshold_ratio > 0.0 && threshold_ratio.is_finite()) {
            return Err(PoolError::InvalidThresholdRatio {
                ratio: threshold_ratio,
            });
        }
        Ok(RatioFilter {
            sample_aggregator: SampleAggregator::new(
                samples,
                &MaxClonotypeAggregatorFactory,
                key_gen,
            ),
            threshold_ratio,
            negative,
        })
    }

    /// Positive filter using the configured `ratio_filter_threshold`.
    pub fn with_defaults<I>(samples: I, key_gen: ClonotypeKeyGen) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Sample>,
    {
        let threshold_ratio = *parameters_toml::ratio_filter_threshold()?;
        Ok(RatioFilter::new(samples, key_gen, threshold_ratio, false)?)
    }

    /// Ratio a clonotype frequency is scaled by before the comparison.
    pub fn threshold_ratio(&self) -> f64 {
        self.threshold_ratio
    }

    /// Key generator the classes are defined by.
    pub fn key_gen(&self) -> ClonotypeKeyGen {
        self.sample_aggregator.key_gen()
    }
}

impl ClonotypeFilter for RatioFilter<'_> {
    fn check_pass(&self, clonotype: &Clonotype) -> bool {
        match self.sample_aggregator.get_at(clonotype) {
            Some(aggregate) => aggregate.max_freq() < clonotype.freq() * self.threshold_ratio,
            None => true,
        }
    }

    fn is_negative(&self) -> bool {
        self.negative
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use vdj_sample::{ClonotypeIdentity, IngestOptions, IterSource, SampleMetadata};
    use vdj_types::OverlapType;

    fn sample(id: &str, rows: &[(u64, f64, &str, &str)]) -> Sample {
        let rows: Vec<_> = rows
            .iter()
            .map(|&(count, freq, nt, v)| {
                Some(Clonotype::new(
                    count,
                    freq,
                    ClonotypeIdentity::new(nt, "CA", v, ".", "J1"),
                ))
            })
            .collect();
        Sample::from_source(
            IterSource::new(rows),
            Arc::new(SampleMetadata::new(id)),
            IngestOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_dwarfed_clonotype() {
        let s1 = sample("s1", &[(100, 0.5, "AAA", "V1"), (100, 0.5, "CCC", "V1")]);
        let s2 = sample("s2", &[(1, 0.01, "AAA", "V2"), (99, 0.99, "GGG", "V1")]);
        let key_gen = ClonotypeKeyGen::new(OverlapType::Nucleotide);
        let filter = RatioFilter::new([&s1, &s2], key_gen, 20.0, false).unwrap();
        // 0.01 * 20 = 0.2 < 0.5 found in s1.
        assert!(!filter.pass(s2.get_at(1).unwrap()));
        assert!(filter.pass(s2.get_at(0).unwrap()));
        assert!(filter.pass(s1.get_at(0).unwrap()));

        let negative = RatioFilter::new([&s1, &s2], key_gen, 20.0, true).unwrap();
        assert!(negative.pass(s2.get_at(1).unwrap()));
        assert!(!negative.pass(s2.get_at(0).unwrap()));

        // Under nucleotide + V the two AAA clonotypes are different classes.
        let strict_v = RatioFilter::new(
            [&s1, &s2],
            ClonotypeKeyGen::new(OverlapType::NucleotideV),
            20.0,
            false,
        )
        .unwrap();
        assert!(strict_v.pass(s2.get_at(1).unwrap()));
    }

    #[test]
    fn test_filtered_copy_with_ratio_filter() {
        let s1 = sample("s1", &[(100, 0.5, "AAA", "V1"), (100, 0.5, "CCC", "V1")]);
        let s2 = sample("s2", &[(99, 0.99, "GGG", "V1"), (1, 0.01, "AAA", "V1")]);
        let filter =
            RatioFilter::new([&s1, &s2], ClonotypeKeyGen::default(), 20.0, false).unwrap();
        let cleaned = s2.filtered_copy(&filter, None);
        assert_eq!(cleaned.diversity(), 1);
        assert_eq!(cleaned.get_at(0).unwrap().cdr3nt(), "GGG");
    }

    #[test]
    fn test_unknown_class_passes() {
        let s1 = sample("s1", &[(100, 0.5, "AAA", "V1")]);
        let filter = RatioFilter::new([&s1], ClonotypeKeyGen::default(), 20.0, false).unwrap();
        let other = Clonotype::new(1, 1e-6, ClonotypeIdentity::new("TTT", "F", "V1", ".", "J1"));
        assert!(filter.pass(&other));
    }

    #[test]
    fn test_invalid_threshold() {
        let s1 = sample("s1", &[(100, 0.5, "AAA", "V1")]);
        for ratio in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = RatioFilter::new([&s1], ClonotypeKeyGen::default(), ratio, false)
                .err()
                .unwrap();
            assert!(matches!(err, PoolError::InvalidThresholdRatio { .. }));
        }
        assert_eq!(
            PoolError::InvalidThresholdRatio { ratio: 0.0 }.to_string(),
            "The ratio filter threshold must be a positive number, got 0"
        );
    }

    #[test]
    fn test_with_defaults() {
        if std::env::var_os(parameters_toml::PARAMETERS_ENV_VAR).is_none() {
            let s1 = sample("s1", &[(100, 0.5, "AAA", "V1")]);
            let filter = RatioFilter::with_defaults([&s1], ClonotypeKeyGen::default()).unwrap();
            assert_eq!(filter.threshold_ratio(), 20.0);
            assert_eq!(filter.key_gen(), ClonotypeKeyGen::default());
        }
    }

    proptest! {
        #[test]
        fn prop_negation_flips_every_decision(
            freqs in proptest::collection::vec((0.001f64..1.0, 0u8..4), 1..20),
            ratio in 0.5f64..50.0,
        ) {
            let rows: Vec<(u64, f64, String)> = freqs
                .iter()
                .map(|&(f, id)| (((f * 1000.0) as u64).max(1), f, format!("N{id}")))
                .collect();
            let (left, right) = rows.split_at(rows.len() / 2);
            let to_sample = |id: &str, rows: &[(u64, f64, String)]| {
                let mut rows: Vec<_> = rows.iter().map(|(c, f, nt)| (*c, *f, nt.as_str(), "V1")).collect();
                rows.sort_by(|a, b| b.0.cmp(&a.0));
                sample(id, &rows)
            };
            let s1 = to_sample("s1", left);
            let s2 = to_sample("s2", right);
            let key_gen = ClonotypeKeyGen::new(OverlapType::Nucleotide);
            let positive = RatioFilter::new([&s1, &s2], key_gen, ratio, false).unwrap();
            let negative = RatioFilter::new([&s1, &s2], key_gen, ratio, true).unwrap();
            for c in s1.iter().chain(s2.iter()) {
                prop_assert_ne!(positive.pass(c), negative.pass(c));
                let max_freq = s1
                    .iter()
                    .chain(s2.iter())
                    .filter(|o| o.cdr3nt() == c.cdr3nt())
                    .map(Clonotype::freq)
                    .fold(0.0, f64::max);
                prop_assert_eq!(positive.pass(c), max_freq < c.freq() * ratio);
            }
        }
    }
}
