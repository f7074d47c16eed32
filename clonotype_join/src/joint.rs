// Copyright (c) 2021 10x Genomics, Inc. All rights reserved.

use crate::join_filter::JoinFilter;
use clonotype_key::{ClonotypeKey, ClonotypeKeyGen};
use fxhash::FxHashMap;
use log::debug;
use vdj_sample::{Clonotype, Sample};
use vdj_types::OverlapType;

/// One equivalence class seen across the ordered samples of a join.
#[derive(Debug, Clone, PartialEq)]
pub struct JointClonotype {
    /// Highest-count clonotype of the class, the first one on ties.
    representative: Clonotype,
    /// Summed count and frequency per sample, None where the class is absent.
    entries: Vec<Option<(u64, f64)>>,
}

impl JointClonotype {
    fn new(representative: Clonotype, number_of_samples: usize) -> Self {
        JointClonotype {
            representative,
            entries: vec![None; number_of_samples],
        }
    }

    fn add(&mut self, sample_index: usize, clonotype: &Clonotype) {
        let (count, freq) = self.entries[sample_index].get_or_insert((0, 0.0));
        *count += clonotype.count();
        *freq += clonotype.freq();
        if clonotype.count() > self.representative.count() {
            self.representative = clonotype.clone();
        }
    }

    /// True if the class was found in the sample at `sample_index`.
    pub fn present(&self, sample_index: usize) -> bool {
        matches!(self.entries.get(sample_index), Some(Some(_)))
    }

    /// Count in the sample at `sample_index`, 0 when absent.
    pub fn count(&self, sample_index: usize) -> u64 {
        match self.entries.get(sample_index) {
            Some(Some((count, _))) => *count,
            _ => 0,
        }
    }

    /// Frequency in the sample at `sample_index`, 0 when absent.
    pub fn freq(&self, sample_index: usize) -> f64 {
        match self.entries.get(sample_index) {
            Some(Some((_, freq))) => *freq,
            _ => 0.0,
        }
    }

    /// Number of samples in the join.
    pub fn number_of_samples(&self) -> usize {
        self.entries.len()
    }

    /// Number of samples the class is present in.
    pub fn incidence(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    /// Clonotype standing for the class.
    pub fn representative(&self) -> &Clonotype {
        &self.representative
    }

    /// Frequency averaged over all samples of the join, absent counting as 0.
    pub fn mean_freq(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        self.entries.iter().flatten().map(|(_, freq)| freq).sum::<f64>()
            / self.entries.len() as f64
    }
}

/// Samples joined under one overlap mode.
///
/// Joint clonotypes are ordered by decreasing mean frequency.
#[derive(Debug)]
pub struct JointSample {
    overlap_type: OverlapType,
    sample_counts: Vec<u64>,
    clonotypes: Vec<JointClonotype>,
}

impl JointSample {
    /// Join `samples` by the keys of `key_gen`, keeping the joint clonotypes
    /// that pass `filter`.
    pub fn new<'a, I, F>(samples: I, key_gen: ClonotypeKeyGen, filter: &F) -> Self
    where
        I: IntoIterator<Item = &'a Sample>,
        F: JoinFilter + ?Sized,
    {
        let samples: Vec<&Sample> = samples.into_iter().collect();
        let number_of_samples = samples.len();

        let mut slots: FxHashMap<ClonotypeKey<'a>, usize> = FxHashMap::default();
        let mut joint: Vec<JointClonotype> = Vec::new();
        for (sample_index, &sample) in samples.iter().enumerate() {
            for clonotype in sample.iter() {
                let slot = *slots
                    .entry(key_gen.generate_key(clonotype))
                    .or_insert_with(|| {
                        joint.push(JointClonotype::new(clonotype.clone(), number_of_samples));
                        joint.len() - 1
                    });
                joint[slot].add(sample_index, clonotype);
            }
        }

        let total = joint.len();
        let mut clonotypes: Vec<JointClonotype> =
            joint.into_iter().filter(|j| filter.pass(j)).collect();
        clonotypes.sort_by(|a, b| b.mean_freq().total_cmp(&a.mean_freq()));
        debug!(
            "joined {number_of_samples} samples by {}: kept {} of {total} joint clonotypes",
            key_gen.overlap_type(),
            clonotypes.len()
        );

        JointSample {
            overlap_type: key_gen.overlap_type(),
            sample_counts: samples.iter().map(|s| s.count()).collect(),
            clonotypes,
        }
    }

    /// Overlap mode the samples were joined by.
    pub fn overlap_type(&self) -> OverlapType {
        self.overlap_type
    }

    /// Number of samples joined.
    pub fn number_of_samples(&self) -> usize {
        self.sample_counts.len()
    }

    /// Total count of the sample at `sample_index`, including clonotypes
    /// removed by the join filter. None outside the join.
    pub fn sample_count(&self, sample_index: usize) -> Option<u64> {
        self.sample_counts.get(sample_index).copied()
    }

    /// Number of joint clonotypes kept.
    pub fn len(&self) -> usize {
        self.clonotypes.len()
    }

    /// True if no joint clonotype was kept.
    pub fn is_empty(&self) -> bool {
        self.clonotypes.is_empty()
    }

    /// Joint clonotype at `index`, in decreasing mean frequency order.
    pub fn get_at(&self, index: usize) -> Option<&JointClonotype> {
        self.clonotypes.get(index)
    }

    /// Iterate over the kept joint clonotypes.
    pub fn iter(&self) -> std::slice::Iter<'_, JointClonotype> {
        self.clonotypes.iter()
    }

    /// Number of kept joint clonotypes present in both samples.
    pub fn intersection_diversity(&self, i: usize, j: usize) -> usize {
        self.clonotypes
            .iter()
            .filter(|c| c.present(i) && c.present(j))
            .count()
    }
}
