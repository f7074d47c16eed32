// Copyright (c) 2021 10x Genomics, Inc. All rights reserved.

use crate::clonotype::{Clonotype, ClonotypeIdentity};
use crate::filter::{BlankClonotypeFilter, ClonotypeFilter};
use crate::metadata::SampleMetadata;
use crate::parser::{ClonotypeStreamParser, TabularParser};
use anyhow::Result;
use fxhash::FxHashMap;
use log::{debug, info};
use std::cmp::Reverse;
use std::io::Read;
use std::sync::Arc;
use vdj_types::Software;

/// Errors raised when accessing a sample.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SampleError {
    /// Index beyond the stored clonotypes.
    #[error("Clonotype index {index} is out of range for a sample storing {len} clonotypes")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of stored clonotypes.
        len: usize,
    },
}

/// How a clonotype stream is turned into a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    /// Stop reading once this many distinct clonotypes were accepted.
    pub top: Option<usize>,
    /// Keep the clonotypes. Without it only the totals are computed.
    pub store: bool,
    /// Merge rows with identical clonotype identity.
    pub collapse: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        IngestOptions {
            top: None,
            store: true,
            collapse: false,
        }
    }
}

/// An ordered collection of clonotypes sorted by decreasing count.
///
/// `count` and `frequency` include every accepted row, also rows that were
/// merged into another clonotype or were not stored. `diversity` is the number
/// of distinct accepted clonotypes.
#[derive(Debug)]
pub struct Sample {
    clonotypes: Vec<Clonotype>,
    metadata: Arc<SampleMetadata>,
    frequency: f64,
    count: u64,
    diversity: usize,
}

impl Sample {
    fn empty(metadata: Arc<SampleMetadata>) -> Self {
        Sample {
            clonotypes: Vec::new(),
            metadata,
            frequency: 0.0,
            count: 0,
            diversity: 0,
        }
    }

    /// Build a sample by consuming `source`.
    pub fn from_source<P>(
        mut source: P,
        metadata: Arc<SampleMetadata>,
        options: IngestOptions,
    ) -> Result<Sample>
    where
        P: ClonotypeStreamParser,
    {
        let mut sample = Sample::empty(metadata);

        // Merged rows change counts after the fact.
        let mut sorted = !options.collapse;
        let mut prev_count = u64::MAX;

        // Identity -> position of the stored clonotype, if stored.
        let mut existing: FxHashMap<ClonotypeIdentity, Option<usize>> = FxHashMap::default();

        while !options.top.is_some_and(|top| sample.diversity >= top) {
            let Some(item) = source.next() else {
                break;
            };
            let Some(clonotype) = item? else {
                continue;
            };

            if clonotype.count() > prev_count {
                sorted = false;
            }
            prev_count = clonotype.count();

            if options.collapse {
                if let Some(&slot) = existing.get(clonotype.identity()) {
                    sample.merge(clonotype, slot);
                    continue;
                }
                let slot = options.store.then_some(sample.clonotypes.len());
                existing.insert(clonotype.identity().clone(), slot);
            }
            sample.accept(clonotype, options.store);
        }

        source.finish();

        if !sorted {
            debug!("sorting sample {}", sample.metadata.sample_id);
            sample.sort();
        }

        if source.is_per_read_output() {
            let total = sample.count;
            for clonotype in &mut sample.clonotypes {
                clonotype.recalculate_frequency(total);
            }
        }

        info!(
            "loaded sample {}: {} clonotypes stored, diversity {}, count {}",
            sample.metadata.sample_id,
            sample.clonotypes.len(),
            sample.diversity,
            sample.count
        );
        Ok(sample)
    }

    /// Build a sample from a tab-delimited table written by `software`.
    pub fn from_reader<R: Read>(
        reader: R,
        metadata: Arc<SampleMetadata>,
        software: Software,
        options: IngestOptions,
    ) -> Result<Sample> {
        let parser = TabularParser::new(reader, software)?;
        Sample::from_source(parser, metadata, options)
    }

    /// `from_reader` keeping every row, without collapsing.
    pub fn from_reader_default<R: Read>(
        reader: R,
        metadata: Arc<SampleMetadata>,
        software: Software,
    ) -> Result<Sample> {
        Sample::from_reader(reader, metadata, software, IngestOptions::default())
    }

    /// New sample whose clonotypes carry the counts in `counts`, keyed by
    /// position in this sample. Positions absent from the map, or mapped to
    /// zero, are dropped. Frequencies are recomputed against the new total.
    pub fn resample(&self, counts: &FxHashMap<usize, u64>) -> Sample {
        let mut sample = Sample::empty(Arc::clone(&self.metadata));
        for (index, clonotype) in self.clonotypes.iter().enumerate() {
            match counts.get(&index) {
                Some(&count) if count > 0 => sample.accept(clonotype.with_count(count), true),
                _ => {}
            }
        }

        let total = sample.count;
        sample.frequency = 0.0;
        for clonotype in &mut sample.clonotypes {
            clonotype.recalculate_frequency(total);
            clonotype.reset_input_frequency();
            sample.frequency += clonotype.freq_as_in_input();
        }
        sample.sort();
        sample
    }

    /// Copy of the clonotypes passing `filter`, in the current order, stopping
    /// once `top` clonotypes were copied.
    pub fn filtered_copy<F>(&self, filter: &F, top: Option<usize>) -> Sample
    where
        F: ClonotypeFilter + ?Sized,
    {
        let mut sample = Sample::empty(Arc::clone(&self.metadata));
        for clonotype in &self.clonotypes {
            if top.is_some_and(|top| sample.diversity >= top) {
                break;
            }
            if filter.pass(clonotype) {
                sample.accept(clonotype.clone(), true);
            }
        }
        sample
    }

    /// Copy of every stored clonotype.
    pub fn copy(&self) -> Sample {
        self.filtered_copy(&BlankClonotypeFilter, None)
    }

    fn accept(&mut self, clonotype: Clonotype, store: bool) {
        self.count += clonotype.count();
        self.frequency += clonotype.freq_as_in_input();
        self.diversity += 1;
        if store {
            self.clonotypes.push(clonotype);
        }
    }

    fn merge(&mut self, clonotype: Clonotype, slot: Option<usize>) {
        self.count += clonotype.count();
        self.frequency += clonotype.freq_as_in_input();
        if let Some(index) = slot {
            self.clonotypes[index].append(&clonotype);
        }
    }

    // Stable, so clonotypes with equal counts keep their input order.
    fn sort(&mut self) {
        self.clonotypes.sort_by_key(|c| Reverse(c.count()));
    }

    /// Metadata shared with every sample derived from this one.
    pub fn metadata(&self) -> &Arc<SampleMetadata> {
        &self.metadata
    }

    /// Sum of input frequencies of all accepted rows.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Sum of counts of all accepted rows.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Number of distinct accepted clonotypes.
    pub fn diversity(&self) -> usize {
        self.diversity
    }

    /// Number of stored clonotypes.
    pub fn len(&self) -> usize {
        self.clonotypes.len()
    }

    /// True if no clonotype is stored.
    pub fn is_empty(&self) -> bool {
        self.clonotypes.is_empty()
    }

    /// Samples are exposed sorted by decreasing count.
    pub fn is_sorted(&self) -> bool {
        true
    }

    /// Clonotype at `index`.
    pub fn get_at(&self, index: usize) -> Result<&Clonotype, SampleError> {
        self.clonotypes
            .get(index)
            .ok_or(SampleError::IndexOutOfRange {
                index,
                len: self.clonotypes.len(),
            })
    }

    /// Iterate over the stored clonotypes.
    pub fn iter(&self) -> std::slice::Iter<'_, Clonotype> {
        self.clonotypes.iter()
    }
}

impl<'a> IntoIterator for &'a Sample {
    type Item = &'a Clonotype;
    type IntoIter = std::slice::Iter<'a, Clonotype>;

    fn into_iter(self) -> Self::IntoIter {
        self.clonotypes.iter()
    }
}
