//! vdj_types
// Copyright (c) 2021 10x Genomics, Inc. All rights reserved.
#![expect(missing_docs)]

use serde::{Deserialize, Serialize};
use std::fmt;

// From https://danielkeep.github.io/tlborm/book/blk-counting.html
macro_rules! replace_expr {
    ($_t:tt $sub:expr) => {
        $sub
    };
}

macro_rules! count_tts {
    ($($tts:tt)*) => {0usize $(+ replace_expr!($tts 1usize))*};
}

macro_rules! make_enum {
    (
        name: $name:ident,
        variants:[$( ($field:ident, $lit: literal) ,)*],
        const_var_name: $const_var_name:ident,
    ) => {
        pub const $const_var_name: [&str; count_tts!($($field)*)] = [
            $($lit,)*
        ];

        #[derive(
            Debug,
            Copy,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Serialize,
            Deserialize,
            Hash,
        )]
        pub enum $name {
            $(
                #[serde(rename = $lit)]
                $field,
            )*
        }

        impl $name {
            pub fn all() -> [Self; count_tts!($($field)*)] {
                [
                    $($name::$field,)*
                ]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", match self {
                    $(
                        $name::$field => $lit,
                    )*
                })
            }
        }

        impl From<$name> for &'static str {
            fn from(src: $name) -> &'static str {
                match src {
                    $(
                        $name::$field => $lit,
                    )*
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(
                        $lit => Ok($name::$field),
                    )*
                    unknown => Err(
                        format!("Unknown variant '{}' for {}. Supported variants are: [{}]", unknown, stringify!($name), $const_var_name.join(", "))
                    )
                }
            }
        }
    };
}

make_enum! {
    name: OverlapType,
    variants: [
        (Strict, "strict"),
        (Nucleotide, "nt"),
        (NucleotideV, "ntV"),
        (NucleotideVJ, "ntVJ"),
        (AminoAcid, "aa"),
        (AminoAcidV, "aaV"),
        (AminoAcidVJ, "aaVJ"),
        (AminoAcidNonNucleotide, "aa!nt"),
    ],
    const_var_name: OVERLAP_TYPES,
}

/// Strict is the most granular mode and collapses the fewest clonotypes.
impl Default for OverlapType {
    fn default() -> Self {
        OverlapType::Strict
    }
}

// Tab-delimited clonotype table layouts understood by the sample parser.
make_enum! {
    name: Software,
    variants: [
        (VdjTools, "vdjtools"),
        (MiGec, "migec"),
        (MiTcr, "mitcr"),
    ],
    const_var_name: SOFTWARE_DIALECTS,
}
