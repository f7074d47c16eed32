// Copyright (c) 2021 10x Genomics, Inc. All rights reserved.

use crate::sample::Sample;
use anyhow::Result;
use fxhash::FxHashMap;
use log::debug;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Draw reads without replacement from a sample.
pub struct DownSampler<'a> {
    sample: &'a Sample,
    // Running totals of stored clonotype counts; read r belongs to the first
    // clonotype whose running total exceeds r.
    cumulative: Vec<u64>,
}

impl<'a> DownSampler<'a> {
    /// Prepare to down-sample `sample`.
    pub fn new(sample: &'a Sample) -> Self {
        let cumulative = sample
            .iter()
            .scan(0u64, |total, c| {
                *total += c.count();
                Some(*total)
            })
            .collect();
        DownSampler { sample, cumulative }
    }

    /// Number of reads that can be drawn.
    pub fn total(&self) -> u64 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    /// Per-position counts of `size` reads drawn uniformly without replacement.
    /// Asking for at least `total()` reads returns every count unchanged.
    pub fn draw_counts(&self, size: u64, seed: u64) -> FxHashMap<usize, u64> {
        let total = self.total();
        if size >= total {
            return self
                .sample
                .iter()
                .map(|c| c.count())
                .enumerate()
                .collect();
        }
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut counts = FxHashMap::default();
        for read in rand::seq::index::sample(&mut rng, total as usize, size as usize) {
            let index = self.cumulative.partition_point(|&c| c <= read as u64);
            *counts.entry(index).or_insert(0) += 1;
        }
        counts
    }

    /// Sample holding `size` reads drawn from the source sample.
    pub fn reshuffle(&self, size: u64, seed: u64) -> Sample {
        debug!(
            "down-sampling {} from {} to {size} reads",
            self.sample.metadata().sample_id,
            self.total()
        );
        self.sample.resample(&self.draw_counts(size, seed))
    }

    /// `reshuffle` seeded with the configured `downsample_seed`.
    pub fn reshuffle_with_configured_seed(&self, size: u64) -> Result<Sample> {
        Ok(self.reshuffle(size, *parameters_toml::downsample_seed()?))
    }
}
