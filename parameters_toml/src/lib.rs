// Warning groups (as of rust 1.55)
#![deny(
    future_incompatible,
    nonstandard_style,
    rust_2018_compatibility,
    rust_2021_compatibility,
    rust_2018_idioms,
    unused
)]
// Other warnings (as of rust 1.55)
#![deny(
    bindings_with_variant_name,
    confusable_idents,
    const_item_mutation,
    deprecated,
    elided_lifetimes_in_paths,
    exported_private_dependencies,
    irrefutable_let_patterns,
    mixed_script_confusables,
    non_shorthand_field_patterns,
    overlapping_range_endpoints,
    renamed_and_removed_lints,
    stable_features,
    trivial_bounds,
    type_alias_bounds,
    unconditional_recursion,
    unknown_lints,
    unused_comparisons,
    while_true
)]

use anyhow::{Context, Result};
use log::warn;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use vdj_types::OverlapType;

/// Environment variable overriding the location of parameters.toml.
pub const PARAMETERS_ENV_VAR: &str = "VDJ_PARAMETERS_TOML";

#[derive(Debug, Deserialize, Clone, PartialEq)]
struct Parameters {
    /// Overlap mode used when none is given explicitly.
    overlap_type: OverlapType,
    /// RatioFilter rejects a clonotype whose frequency times this ratio does not
    /// exceed the largest frequency of its equivalence class in the pool.
    ratio_filter_threshold: f64,
    /// Seed of the random generator used for down-sampling.
    downsample_seed: u64,
}

const DEFAULT_PARAMETERS: Parameters = Parameters {
    overlap_type: OverlapType::Strict,
    ratio_filter_threshold: 20.0,
    downsample_seed: 0,
};
static PARAMETERS: OnceLock<Result<Parameters>> = OnceLock::new();

fn parameters_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(PARAMETERS_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }
    Ok(std::env::current_exe()
        .context("Unable to locate the running executable")?
        .with_file_name("parameters.toml"))
}

fn load_parameters(path: &Path) -> Result<Parameters> {
    if !path.exists() {
        warn!(
            "could not find parameters.toml at {}, falling back to defaults",
            path.display()
        );
        return Ok(DEFAULT_PARAMETERS);
    }
    let s = std::fs::read_to_string(path).with_context(|| path.display().to_string())?;
    toml::from_str(&s).with_context(|| path.display().to_string())
}

/// Return a reference to the global parameters.
/// The parameters may need to be loaded; if loading fails, return Err.
fn parameters() -> &'static Result<Parameters> {
    PARAMETERS.get_or_init(|| load_parameters(&parameters_path()?))
}

macro_rules! parameter_getter {
    ($a:ident, $t:ty) => {
        pub fn $a() -> Result<&'static $t> {
            let val = match parameters() {
                Err(e) => return Err(anyhow::anyhow!("{e:#}")),
                Ok(p) => &p.$a,
            };
            if DEFAULT_PARAMETERS.$a != *val {
                warn!("using non-default {} = {:?}", stringify!($a), val);
            }
            Ok(val)
        }
    };
}

parameter_getter!(overlap_type, OverlapType);
parameter_getter!(ratio_filter_threshold, f64);
parameter_getter!(downsample_seed, u64);
