//! Moving column values between polyline records and coordinate data

use super::polyline::PolylineRecord;
use crate::coordinate_data::ModelFeatureCoordinateData;
use crate::feature::Feature;
use crate::fixed_weir::FixedWeirScheme;
use crate::model::{FeatureDataModel, FeatureKind};

use std::rc::Rc;

/// Outcome of loading record columns into coordinate data
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ColumnLoad {
    /// Columns copied from the record
    pub loaded: usize,
    /// Record columns without a matching data column
    pub ignored: usize,
    /// Data columns the record had no values for (left at their defaults)
    pub defaulted: usize,
}

/// Copy record column `k` into data column `k`, positionally
pub fn load_columns(data: &mut ModelFeatureCoordinateData, record: &PolylineRecord) -> ColumnLoad {
    let column_count = data.data_column_count();
    let mut load = ColumnLoad {
        ignored: record.columns.len().saturating_sub(column_count),
        defaulted: column_count.saturating_sub(record.columns.len()),
        ..ColumnLoad::default()
    };

    for (index, values) in record.columns.iter().enumerate().take(column_count) {
        let Some(mut column) = data.data_column_at_mut(index) else {
            break;
        };
        match column.load_doubles(values) {
            Ok(_) => load.loaded += 1,
            Err(err) => {
                tracing::warn!("column {} of '{}' not loaded: {err}", index + 3, record.name);
                load.ignored += 1;
            }
        }
    }
    load
}

/// Record holding the feature geometry and the leading run of active numeric columns
///
/// Returns `None` when no feature is attached.
pub fn record_from(data: &ModelFeatureCoordinateData) -> Option<PolylineRecord> {
    let feature = data.feature()?;
    let geometry = feature.geometry().clone();

    let columns = data
        .data_columns()
        .iter()
        .take_while(|column| column.is_active())
        .map_while(|column| column.doubles().map(<[f64]>::to_vec))
        .collect();

    Some(PolylineRecord::new(feature.name(), geometry).with_columns(columns))
}

/// Create features for `records`, register them in `model` and load their column values
///
/// Returns the created features in record order.
pub fn import_records(
    model: &mut FeatureDataModel,
    kind: FeatureKind,
    records: &[PolylineRecord],
) -> Vec<Rc<Feature>> {
    let scheme = model.fixed_weir_scheme();
    let mut features = Vec::with_capacity(records.len());

    for record in records {
        let feature = Feature::new(record.name.clone(), record.geometry.clone());
        let mut data = model.create_coordinate_data(kind, feature.clone());
        let load = load_columns(&mut data, record);

        let check_columns = kind == FeatureKind::BridgePillar || scheme != FixedWeirScheme::None;
        if check_columns && load.ignored > 0 {
            tracing::warn!(
                "Based on {} there are too many column(s) defined for {}; the last {} column(s) have been ignored",
                source_label(kind, scheme),
                record.name,
                load.ignored
            );
        }
        if check_columns && load.defaulted > 0 {
            tracing::warn!(
                "Based on {} there are not enough column(s) defined for {}; the last {} column(s) have been generated using default values",
                source_label(kind, scheme),
                record.name,
                load.defaulted
            );
        }

        model.insert(kind, data);
        features.push(feature);
    }

    tracing::info!(%kind, count = features.len(), "imported features");
    features
}

/// Records for every feature of `kind` in the model
pub fn export_records(model: &FeatureDataModel, kind: FeatureKind) -> Vec<PolylineRecord> {
    model.iter(kind).filter_map(record_from).collect()
}

fn source_label(kind: FeatureKind, scheme: FixedWeirScheme) -> String {
    match kind {
        FeatureKind::FixedWeir => format!("the fixed weir scheme {scheme}"),
        FeatureKind::BridgePillar => "the bridge pillar file".to_string(),
    }
}
