//! clonotype_pool
// Copyright (c) 2021 10x Genomics, Inc. All rights reserved.
//!
//! Statistics of clonotype equivalence classes across a set of samples, and
//! the filters built on them.
#![deny(missing_docs)]

mod aggregator;
mod ratio_filter;

pub use aggregator::{
    AggregatorFactory, ClonotypeAggregator, MaxClonotypeAggregator,
    MaxClonotypeAggregatorFactory, SampleAggregator, SumClonotypeAggregator,
    SumClonotypeAggregatorFactory,
};
pub use ratio_filter::{PoolError, RatioFilter};
