// Copyright (c) 2021 10x Genomics, Inc. All rights reserved.

use crate::key::ClonotypeKey;
use anyhow::Result;
use fxhash::FxHashSet;
use vdj_sample::{Clonotype, Sample};
use vdj_types::OverlapType;

/// Generates clonotype keys for one overlap mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ClonotypeKeyGen {
    overlap_type: OverlapType,
}

impl ClonotypeKeyGen {
    /// Key generator for `overlap_type`.
    pub fn new(overlap_type: OverlapType) -> Self {
        ClonotypeKeyGen { overlap_type }
    }

    /// Key generator for the configured `overlap_type` parameter.
    pub fn from_parameters() -> Result<Self> {
        Ok(ClonotypeKeyGen::new(*parameters_toml::overlap_type()?))
    }

    /// The overlap mode keys are generated for.
    pub fn overlap_type(&self) -> OverlapType {
        self.overlap_type
    }

    /// Key of a single clonotype.
    pub fn generate_key<'a>(&self, clonotype: &'a Clonotype) -> ClonotypeKey<'a> {
        ClonotypeKey::new(self.overlap_type, clonotype)
    }

    /// Distinct keys of the clonotypes stored in `sample`.
    pub fn generate_key_set<'a>(&self, sample: &'a Sample) -> FxHashSet<ClonotypeKey<'a>> {
        sample.iter().map(|c| self.generate_key(c)).collect()
    }
}
