// Copyright (c) 2021 10x Genomics, Inc. All rights reserved.

//! Join of several samples into joint clonotypes, one per equivalence class.
#![deny(missing_docs)]

mod join_filter;
mod joint;

pub use join_filter::{BlankJoinFilter, JoinFilter, SampleSpecificJoinFilter};
pub use joint::{JointClonotype, JointSample};
