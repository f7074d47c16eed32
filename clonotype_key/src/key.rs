// Copyright (c) 2021 10x Genomics, Inc. All rights reserved.

use arrayvec::ArrayVec;
use fxhash::FxHasher;
use std::hash::{Hash, Hasher};
use vdj_sample::Clonotype;
use vdj_types::OverlapType;

const HASH_MULTIPLIER: u64 = 31;

/// Attributes defining the equivalence class of `clonotype` under `overlap_type`,
/// in a fixed order.
fn class_fields(overlap_type: OverlapType, clonotype: &Clonotype) -> ArrayVec<[&str; 5]> {
    use OverlapType::*;
    let mut fields = ArrayVec::new();
    match overlap_type {
        Strict => {
            fields.push(clonotype.cdr3nt());
            fields.push(clonotype.cdr3aa());
            fields.push(clonotype.v());
            fields.push(clonotype.d());
            fields.push(clonotype.j());
        }
        Nucleotide => fields.push(clonotype.cdr3nt()),
        NucleotideV => {
            fields.push(clonotype.cdr3nt());
            fields.push(clonotype.v());
        }
        NucleotideVJ => {
            fields.push(clonotype.cdr3nt());
            fields.push(clonotype.v());
            fields.push(clonotype.j());
        }
        AminoAcid | AminoAcidNonNucleotide => fields.push(clonotype.cdr3aa()),
        AminoAcidV => {
            fields.push(clonotype.cdr3aa());
            fields.push(clonotype.v());
        }
        AminoAcidVJ => {
            fields.push(clonotype.cdr3aa());
            fields.push(clonotype.v());
            fields.push(clonotype.j());
        }
    }
    fields
}

fn field_hash(field: &str) -> u64 {
    let mut hasher = FxHasher::default();
    field.hash(&mut hasher);
    hasher.finish()
}

/// A clonotype seen through one overlap mode.
///
/// Keys only make sense for lookups in hash-based collections. Keys built
/// under different overlap modes must never be compared.
///
/// For `AminoAcidNonNucleotide` two keys are equal when the amino acid CDR3
/// matches; `matches` additionally requires the nucleotide CDR3 to differ.
#[derive(Debug, Clone, Copy)]
pub struct ClonotypeKey<'a> {
    overlap_type: OverlapType,
    clonotype: &'a Clonotype,
}

impl<'a> ClonotypeKey<'a> {
    /// Key of `clonotype` under `overlap_type`.
    pub fn new(overlap_type: OverlapType, clonotype: &'a Clonotype) -> Self {
        ClonotypeKey {
            overlap_type,
            clonotype,
        }
    }

    /// Overlap mode the key was built under.
    pub fn overlap_type(&self) -> OverlapType {
        self.overlap_type
    }

    /// Clonotype the key was derived from.
    pub fn clonotype(&self) -> &'a Clonotype {
        self.clonotype
    }

    /// True if `other` is the same clonotype as the key's under its overlap mode.
    pub fn matches(&self, other: &Clonotype) -> bool {
        let same_class = class_fields(self.overlap_type, self.clonotype)
            == class_fields(self.overlap_type, other);
        match self.overlap_type {
            OverlapType::AminoAcidNonNucleotide => {
                same_class && self.clonotype.cdr3nt() != other.cdr3nt()
            }
            _ => same_class,
        }
    }

    /// Hash code combining the class attributes with a prime multiplier, so keys
    /// of attribute-equal clonotypes always hash the same.
    pub fn hash_code(&self) -> u64 {
        class_fields(self.overlap_type, self.clonotype)
            .iter()
            .fold(0u64, |acc, field| {
                acc.wrapping_mul(HASH_MULTIPLIER)
                    .wrapping_add(field_hash(field))
            })
    }
}

impl PartialEq for ClonotypeKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        debug_assert_eq!(
            self.overlap_type, other.overlap_type,
            "comparing clonotype keys of different overlap types"
        );
        std::ptr::eq(self.clonotype, other.clonotype)
            || class_fields(self.overlap_type, self.clonotype)
                == class_fields(other.overlap_type, other.clonotype)
    }
}

impl Eq for ClonotypeKey<'_> {}

impl Hash for ClonotypeKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use vdj_sample::ClonotypeIdentity;

    fn clonotype(nt: &str, aa: &str, v: &str, d: &str, j: &str) -> Clonotype {
        Clonotype::new(10, 0.1, ClonotypeIdentity::new(nt, aa, v, d, j))
    }

    fn key_eq(overlap_type: OverlapType, a: &Clonotype, b: &Clonotype) -> bool {
        ClonotypeKey::new(overlap_type, a) == ClonotypeKey::new(overlap_type, b)
    }

    #[test]
    fn test_attribute_sets() {
        use OverlapType::*;
        let base = clonotype("TGTGCCAGC", "CAS", "V1", "D1", "J1");
        let other_v = clonotype("TGTGCCAGC", "CAS", "V2", "D1", "J1");
        let other_j = clonotype("TGTGCCAGC", "CAS", "V1", "D1", "J2");
        let other_d = clonotype("TGTGCCAGC", "CAS", "V1", "D2", "J1");
        let synonymous = clonotype("TGTGCTAGC", "CAS", "V1", "D1", "J1");

        assert!(!key_eq(Strict, &base, &other_d));
        assert!(key_eq(NucleotideVJ, &base, &other_d));

        assert!(key_eq(Nucleotide, &base, &other_v));
        assert!(!key_eq(NucleotideV, &base, &other_v));
        assert!(key_eq(NucleotideV, &base, &other_j));
        assert!(!key_eq(NucleotideVJ, &base, &other_j));
        assert!(!key_eq(Nucleotide, &base, &synonymous));

        assert!(key_eq(AminoAcid, &base, &synonymous));
        assert!(key_eq(AminoAcidV, &base, &other_j));
        assert!(!key_eq(AminoAcidV, &base, &other_v));
        assert!(!key_eq(AminoAcidVJ, &base, &other_j));
        assert!(key_eq(AminoAcidVJ, &base, &synonymous));
    }

    #[test]
    fn test_amino_acid_non_nucleotide() {
        let base = clonotype("TGTGCCAGC", "CAS", "V1", ".", "J1");
        let same_nt = clonotype("TGTGCCAGC", "CAS", "V2", ".", "J2");
        let synonymous = clonotype("TGTGCTAGC", "CAS", "V1", ".", "J1");
        let key = ClonotypeKey::new(OverlapType::AminoAcidNonNucleotide, &base);
        assert!(key.matches(&synonymous));
        assert!(!key.matches(&same_nt));
        assert!(!key.matches(&base));
        // Hashed equality groups by amino acid CDR3 only.
        assert!(key_eq(OverlapType::AminoAcidNonNucleotide, &base, &same_nt));
        assert_eq!(key, key);
    }

    #[test]
    fn test_hash_code_combination() {
        let c = clonotype("TGT", "C", "V1", ".", "J1");
        let expected = (field_hash("C")
            .wrapping_mul(31)
            .wrapping_add(field_hash("V1")))
        .wrapping_mul(31)
        .wrapping_add(field_hash("J1"));
        assert_eq!(
            ClonotypeKey::new(OverlapType::AminoAcidVJ, &c).hash_code(),
            expected
        );
    }

    fn arb_identity() -> impl Strategy<Value = (String, String, String, String, String)> {
        (
            "[ACGT]{1,4}",
            "[CAS]{1,2}",
            "V[12]",
            "D[12]",
            "J[12]",
        )
    }

    proptest! {
        #[test]
        fn prop_equal_attributes_equal_keys((nt, aa, v, d, j) in arb_identity()) {
            let a = clonotype(&nt, &aa, &v, &d, &j);
            let b = clonotype(&nt, &aa, &v, &d, &j);
            for overlap_type in OverlapType::all() {
                let ka = ClonotypeKey::new(overlap_type, &a);
                let kb = ClonotypeKey::new(overlap_type, &b);
                prop_assert_eq!(ka, kb);
                prop_assert_eq!(fxhash::hash64(&ka), fxhash::hash64(&kb));
            }
        }

        #[test]
        fn prop_eq_implies_hash_eq(x in arb_identity(), y in arb_identity()) {
            let a = clonotype(&x.0, &x.1, &x.2, &x.3, &x.4);
            let b = clonotype(&y.0, &y.1, &y.2, &y.3, &y.4);
            for overlap_type in OverlapType::all() {
                let ka = ClonotypeKey::new(overlap_type, &a);
                let kb = ClonotypeKey::new(overlap_type, &b);
                prop_assert_eq!(ka == kb, kb == ka);
                if ka == kb {
                    prop_assert_eq!(ka.hash_code(), kb.hash_code());
                }
                if overlap_type != OverlapType::AminoAcidNonNucleotide {
                    prop_assert_eq!(ka.matches(&b), ka == kb);
                }
            }
        }
    }
}
