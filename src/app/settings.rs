use clap::{Parser, ValueEnum};
use fm_feature_lib::{FeatureKind, FixedWeirScheme};
use std::path::PathBuf;

/// Kind of the features stored in the input files
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    FixedWeir,
    BridgePillar,
}

impl From<Kind> for FeatureKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::FixedWeir => FeatureKind::FixedWeir,
            Kind::BridgePillar => FeatureKind::BridgePillar,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// FM Feature Sync - Carry per-vertex fixed weir and bridge pillar data over to edited polylines
pub struct Settings {
    /// Polyline files (.pliz) with the current geometries and column values
    #[clap(short, long, value_name = "FILE", required = true)]
    pub input: Vec<PathBuf>,

    /// Polyline file (.pli) with edited geometries, matched to the input by feature name
    #[clap(short, long, value_name = "FILE")]
    pub geometry: Option<PathBuf>,

    /// Polyline file to write the resynchronized features to
    #[clap(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Kind of the features in the input files
    #[clap(short, long, value_enum, default_value_t = Kind::FixedWeir)]
    pub kind: Kind,

    /// Fixed weir scheme deciding which columns are kept (0, 6, 8 or 9)
    #[clap(short, long, default_value = "8")]
    pub scheme: FixedWeirScheme,
}
