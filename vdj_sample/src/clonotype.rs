// Copyright (c) 2021 10x Genomics, Inc. All rights reserved.

use serde::{Deserialize, Serialize};

/// The full set of identity attributes of a clonotype.
///
/// Two rows with equal identities are the same clonotype for the purpose of
/// collapsing during ingestion, regardless of the overlap mode used later on
/// to compare clonotypes across samples.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ClonotypeIdentity {
    /// CDR3 nucleotide sequence.
    pub cdr3nt: String,
    /// CDR3 amino acid sequence.
    pub cdr3aa: String,
    /// V segment name.
    pub v: String,
    /// D segment name, `.` when undetermined.
    pub d: String,
    /// J segment name.
    pub j: String,
}

impl ClonotypeIdentity {
    /// Build an identity from its attributes.
    pub fn new(
        cdr3nt: impl Into<String>,
        cdr3aa: impl Into<String>,
        v: impl Into<String>,
        d: impl Into<String>,
        j: impl Into<String>,
    ) -> Self {
        ClonotypeIdentity {
            cdr3nt: cdr3nt.into(),
            cdr3aa: cdr3aa.into(),
            v: v.into(),
            d: d.into(),
            j: j.into(),
        }
    }
}

/// A quantified immune receptor sequence variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Clonotype {
    count: u64,
    freq: f64,
    freq_as_in_input: f64,
    identity: ClonotypeIdentity,
}

impl Clonotype {
    /// A clonotype as read from input: `freq` is also recorded as the input frequency.
    pub fn new(count: u64, freq: f64, identity: ClonotypeIdentity) -> Self {
        Clonotype {
            count,
            freq,
            freq_as_in_input: freq,
            identity,
        }
    }

    /// Number of reads or molecules supporting the clonotype.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Frequency within the owning sample.
    pub fn freq(&self) -> f64 {
        self.freq
    }

    /// Frequency as it was read from input. Sample totals are accumulated from
    /// this value, so they remain correct when rows are merged or not stored.
    pub fn freq_as_in_input(&self) -> f64 {
        self.freq_as_in_input
    }

    /// Full identity of the clonotype.
    pub fn identity(&self) -> &ClonotypeIdentity {
        &self.identity
    }

    /// CDR3 nucleotide sequence.
    pub fn cdr3nt(&self) -> &str {
        &self.identity.cdr3nt
    }

    /// CDR3 amino acid sequence.
    pub fn cdr3aa(&self) -> &str {
        &self.identity.cdr3aa
    }

    /// V segment name.
    pub fn v(&self) -> &str {
        &self.identity.v
    }

    /// D segment name.
    pub fn d(&self) -> &str {
        &self.identity.d
    }

    /// J segment name.
    pub fn j(&self) -> &str {
        &self.identity.j
    }

    /// The CDR3 contains no stop codon.
    pub fn is_coding(&self) -> bool {
        !self.identity.cdr3aa.contains('*')
    }

    /// The CDR3 nucleotide length is a multiple of three and its translation has
    /// no frame-shift marker.
    pub fn is_in_frame(&self) -> bool {
        self.identity.cdr3nt.len() % 3 == 0 && !self.identity.cdr3aa.contains('?')
    }

    /// Merge a duplicate row into this one.
    pub(crate) fn append(&mut self, other: &Clonotype) {
        self.count += other.count;
        self.freq += other.freq;
        self.freq_as_in_input += other.freq_as_in_input;
    }

    /// Renormalize against the total count of the owning sample.
    pub(crate) fn recalculate_frequency(&mut self, sample_count: u64) {
        if sample_count > 0 {
            self.freq = self.count as f64 / sample_count as f64;
        }
    }

    /// Copy carrying a replacement count; frequencies are fixed up by the
    /// sample that takes ownership.
    pub(crate) fn with_count(&self, count: u64) -> Clonotype {
        Clonotype {
            count,
            freq: 0.0,
            freq_as_in_input: 0.0,
            identity: self.identity.clone(),
        }
    }

    pub(crate) fn reset_input_frequency(&mut self) {
        self.freq_as_in_input = self.freq;
    }
}
