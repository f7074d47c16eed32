//! clonotype_key
// Copyright (c) 2021 10x Genomics, Inc. All rights reserved.
//!
//! What "the same clonotype" means across samples. An `OverlapType` selects
//! the attributes compared; `ClonotypeKeyGen` turns clonotypes into keys that
//! can be stored in hash maps and sets.
#![deny(missing_docs)]

mod key;
mod key_gen;

pub use key::ClonotypeKey;
pub use key_gen::ClonotypeKeyGen;
