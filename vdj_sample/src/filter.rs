// Copyright (c) 2021 10x Genomics, Inc. All rights reserved.

use crate::clonotype::Clonotype;

/// Accept or reject individual clonotypes.
///
/// Implementors decide with `check_pass`; a negative filter accepts exactly
/// the clonotypes the positive one rejects.
pub trait ClonotypeFilter {
    /// Raw decision, before negation.
    fn check_pass(&self, clonotype: &Clonotype) -> bool;

    /// True if the decision of `check_pass` is inverted.
    fn is_negative(&self) -> bool {
        false
    }

    /// Final decision.
    fn pass(&self, clonotype: &Clonotype) -> bool {
        self.check_pass(clonotype) != self.is_negative()
    }
}

impl<F> ClonotypeFilter for F
where
    F: Fn(&Clonotype) -> bool,
{
    fn check_pass(&self, clonotype: &Clonotype) -> bool {
        self(clonotype)
    }
}

/// Passes everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlankClonotypeFilter;

impl ClonotypeFilter for BlankClonotypeFilter {
    fn check_pass(&self, _clonotype: &Clonotype) -> bool {
        true
    }
}

/// Passes clonotypes with a coding, in-frame CDR3.
#[derive(Debug, Default, Clone, Copy)]
pub struct FunctionalClonotypeFilter {
    negative: bool,
}

impl FunctionalClonotypeFilter {
    /// With `negative`, only non-functional clonotypes pass.
    pub fn new(negative: bool) -> Self {
        FunctionalClonotypeFilter { negative }
    }
}

impl ClonotypeFilter for FunctionalClonotypeFilter {
    fn check_pass(&self, clonotype: &Clonotype) -> bool {
        clonotype.is_coding() && clonotype.is_in_frame()
    }

    fn is_negative(&self) -> bool {
        self.negative
    }
}
