// Copyright (c) 2021 10x Genomics, Inc. All rights reserved.

use clonotype_key::{ClonotypeKey, ClonotypeKeyGen};
use fxhash::FxHashMap;
use log::debug;
use vdj_sample::{Clonotype, Sample};

/// Accumulates a statistic over the clonotypes of one equivalence class.
pub trait ClonotypeAggregator {
    /// Add a clonotype found in the sample at `sample_index`. Samples are
    /// visited in increasing index order.
    fn combine(&mut self, clonotype: &Clonotype, sample_index: usize);
}

/// Creates empty aggregators, one per equivalence class.
pub trait AggregatorFactory {
    /// The aggregator type produced.
    type Aggregator: ClonotypeAggregator;

    /// A fresh aggregator.
    fn create(&self) -> Self::Aggregator;
}

/// Largest frequency and count of an equivalence class across samples.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MaxClonotypeAggregator {
    max_freq: f64,
    max_count: u64,
    incidence: usize,
    last_sample: Option<usize>,
}

impl MaxClonotypeAggregator {
    /// Largest frequency seen.
    pub fn max_freq(&self) -> f64 {
        self.max_freq
    }

    /// Largest count seen.
    pub fn max_count(&self) -> u64 {
        self.max_count
    }

    /// Number of samples the class was found in.
    pub fn incidence(&self) -> usize {
        self.incidence
    }
}

impl ClonotypeAggregator for MaxClonotypeAggregator {
    fn combine(&mut self, clonotype: &Clonotype, sample_index: usize) {
        self.max_freq = self.max_freq.max(clonotype.freq());
        self.max_count = self.max_count.max(clonotype.count());
        if self.last_sample != Some(sample_index) {
            self.incidence += 1;
            self.last_sample = Some(sample_index);
        }
    }
}

/// Factory of `MaxClonotypeAggregator`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaxClonotypeAggregatorFactory;

impl AggregatorFactory for MaxClonotypeAggregatorFactory {
    type Aggregator = MaxClonotypeAggregator;

    fn create(&self) -> MaxClonotypeAggregator {
        MaxClonotypeAggregator::default()
    }
}

/// Total count and frequency of an equivalence class across samples.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SumClonotypeAggregator {
    count: u64,
    freq: f64,
    incidence: usize,
    last_sample: Option<usize>,
}

impl SumClonotypeAggregator {
    /// Summed count.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Summed frequency.
    pub fn freq(&self) -> f64 {
        self.freq
    }

    /// Number of samples the class was found in.
    pub fn incidence(&self) -> usize {
        self.incidence
    }
}

impl ClonotypeAggregator for SumClonotypeAggregator {
    fn combine(&mut self, clonotype: &Clonotype, sample_index: usize) {
        self.count += clonotype.count();
        self.freq += clonotype.freq();
        if self.last_sample != Some(sample_index) {
            self.incidence += 1;
            self.last_sample = Some(sample_index);
        }
    }
}

/// Factory of `SumClonotypeAggregator`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SumClonotypeAggregatorFactory;

impl AggregatorFactory for SumClonotypeAggregatorFactory {
    type Aggregator = SumClonotypeAggregator;

    fn create(&self) -> SumClonotypeAggregator {
        SumClonotypeAggregator::default()
    }
}

/// Per equivalence class aggregates over a fixed, ordered set of samples.
///
/// Every class is aggregated once, when the aggregator is built; lookups do
/// not mutate anything, so a built aggregator can be shared between threads.
pub struct SampleAggregator<'a, A> {
    key_gen: ClonotypeKeyGen,
    // Buckets by key hash code, so that lookups accept clonotypes of any
    // lifetime, not only those borrowed from the bound samples.
    aggregates: FxHashMap<u64, Vec<(ClonotypeKey<'a>, A)>>,
    number_of_classes: usize,
    number_of_samples: usize,
}

impl<'a, A> SampleAggregator<'a, A>
where
    A: ClonotypeAggregator,
{
    /// Aggregate every stored clonotype of `samples`, grouped by the keys of `key_gen`.
    pub fn new<I, F>(samples: I, factory: &F, key_gen: ClonotypeKeyGen) -> Self
    where
        I: IntoIterator<Item = &'a Sample>,
        F: AggregatorFactory<Aggregator = A> + ?Sized,
    {
        let mut aggregates: FxHashMap<u64, Vec<(ClonotypeKey<'a>, A)>> = FxHashMap::default();
        let mut number_of_classes = 0;
        let mut number_of_samples = 0;
        for (sample_index, sample) in samples.into_iter().enumerate() {
            for clonotype in sample {
                let key = key_gen.generate_key(clonotype);
                let bucket = aggregates.entry(key.hash_code()).or_default();
                let slot = match bucket.iter().position(|(k, _)| *k == key) {
                    Some(slot) => slot,
                    None => {
                        bucket.push((key, factory.create()));
                        number_of_classes += 1;
                        bucket.len() - 1
                    }
                };
                bucket[slot].1.combine(clonotype, sample_index);
            }
            number_of_samples += 1;
        }
        debug!(
            "aggregated {number_of_classes} {} keys across {number_of_samples} samples",
            key_gen.overlap_type()
        );
        SampleAggregator {
            key_gen,
            aggregates,
            number_of_classes,
            number_of_samples,
        }
    }

    /// Aggregate of the equivalence class of `clonotype`, None if the class is
    /// absent from every sample.
    pub fn get_at(&self, clonotype: &Clonotype) -> Option<&A> {
        let key = self.key_gen.generate_key(clonotype);
        self.aggregates
            .get(&key.hash_code())?
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, aggregate)| aggregate)
    }

    /// Key generator the classes are defined by.
    pub fn key_gen(&self) -> ClonotypeKeyGen {
        self.key_gen
    }

    /// Number of samples aggregated.
    pub fn number_of_samples(&self) -> usize {
        self.number_of_samples
    }

    /// Number of distinct equivalence classes.
    pub fn len(&self) -> usize {
        self.number_of_classes
    }

    /// True if no clonotype was aggregated.
    pub fn is_empty(&self) -> bool {
        self.number_of_classes == 0
    }

    /// Iterate over the classes and their aggregates, in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&ClonotypeKey<'a>, &A)> {
        self.aggregates
            .values()
            .flatten()
            .map(|(key, aggregate)| (key, aggregate))
    }
}
