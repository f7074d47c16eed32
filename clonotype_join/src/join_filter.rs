// Copyright (c) 2021 10x Genomics, Inc. All rights reserved.

use crate::joint::JointClonotype;

/// Decide whether a joint clonotype is kept by a join.
pub trait JoinFilter {
    /// True if `joint_clonotype` is kept.
    fn pass(&self, joint_clonotype: &JointClonotype) -> bool;
}

impl<F> JoinFilter for F
where
    F: Fn(&JointClonotype) -> bool,
{
    fn pass(&self, joint_clonotype: &JointClonotype) -> bool {
        self(joint_clonotype)
    }
}

/// Keeps every joint clonotype.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlankJoinFilter;

impl JoinFilter for BlankJoinFilter {
    fn pass(&self, _joint_clonotype: &JointClonotype) -> bool {
        true
    }
}

/// Keep joint clonotypes found in one sample of the join.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SampleSpecificJoinFilter {
    sample_index: usize,
}

impl SampleSpecificJoinFilter {
    /// Filter anchored on the sample at `sample_index` of the join.
    pub fn new(sample_index: usize) -> Self {
        SampleSpecificJoinFilter { sample_index }
    }

    /// Index of the anchor sample.
    pub fn sample_index(&self) -> usize {
        self.sample_index
    }
}

impl JoinFilter for SampleSpecificJoinFilter {
    fn pass(&self, joint_clonotype: &JointClonotype) -> bool {
        joint_clonotype.present(self.sample_index)
    }
}
