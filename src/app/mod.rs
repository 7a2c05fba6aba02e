//! The resynchronization pipeline behind the command line

pub(crate) mod settings;

use fm_feature_lib::io::{self, PolylineRecord};
use fm_feature_lib::{Config, FeatureDataModel, FeatureKind, Result};
use settings::Settings;

/// What a run did, for the final log line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Features read from the input files
    pub features: usize,
    /// Features that received an edited geometry
    pub updated: usize,
    /// Edited geometries without a matching input feature
    pub skipped: usize,
}

/// Load `records` into a fresh model, apply `edited` geometries by name and export the result
pub fn sync_records(
    config: Config,
    kind: FeatureKind,
    records: &[PolylineRecord],
    edited: Vec<PolylineRecord>,
) -> (Vec<PolylineRecord>, SyncSummary) {
    let mut model = FeatureDataModel::new(config);
    let features = io::import_records(&mut model, kind, records);

    let mut summary = SyncSummary {
        features: features.len(),
        ..SyncSummary::default()
    };

    for record in edited {
        // Duplicate names resolve to the first feature, like the file reader's order
        let Some(feature) = features.iter().find(|f| f.name() == record.name) else {
            tracing::warn!("No feature named '{}' in the input; geometry skipped", record.name);
            summary.skipped += 1;
            continue;
        };

        tracing::debug!(
            feature = %feature,
            before = feature.vertex_count(),
            after = record.geometry.0.len(),
            "applying edited geometry"
        );
        feature.set_geometry(record.geometry);
        summary.updated += 1;
    }

    (io::export_records(&model, kind), summary)
}

/// Read, resynchronize and write according to `settings`
pub fn run(settings: &Settings) -> Result<SyncSummary> {
    #[cfg(feature = "profiling")]
    profiling::scope!("app::run");

    let records = io::read_files_parallel(settings.input.clone())?;
    let edited = match &settings.geometry {
        Some(path) => io::read_file(path)?,
        None => Vec::new(),
    };

    let config = Config {
        fixed_weir_scheme: settings.scheme,
    };
    let (output, summary) = sync_records(config, settings.kind.into(), &records, edited);

    io::write_file(&settings.output, &output)?;
    Ok(summary)
}
