//! vdj_sample
// Copyright (c) 2021 10x Genomics, Inc. All rights reserved.
//!
//! Clonotype records and the samples that own them. A `Sample` is built by
//! streaming clonotypes out of a `ClonotypeStreamParser`, optionally
//! collapsing identical rows, and is immutable afterwards.
#![deny(missing_docs)]

mod clonotype;
mod downsample;
mod filter;
mod metadata;
mod parser;
mod sample;

pub use clonotype::{Clonotype, ClonotypeIdentity};
pub use downsample::DownSampler;
pub use filter::{BlankClonotypeFilter, ClonotypeFilter, FunctionalClonotypeFilter};
pub use metadata::SampleMetadata;
pub use parser::{ClonotypeStreamParser, IterSource, TabularParser};
pub use sample::{IngestOptions, Sample, SampleError};
