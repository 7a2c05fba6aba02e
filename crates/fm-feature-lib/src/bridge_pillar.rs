//! Data columns carried by bridge pillars

use crate::column::DataColumn;
use crate::coordinate_data::ModelFeatureCoordinateData;

pub const DIAMETER_COLUMN_NAME: &str = "Diameter";
pub const DRAG_COEFFICIENT_COLUMN_NAME: &str = "Drag Coefficient";

/// (name, default) in file column order
pub const COLUMNS: [(&str, f64); 2] = [
    (DIAMETER_COLUMN_NAME, 1.0),
    (DRAG_COEFFICIENT_COLUMN_NAME, 1.0),
];

/// Make sure `data` carries both bridge pillar columns, active
pub fn update_data_columns(data: &mut ModelFeatureCoordinateData) {
    for (name, default) in COLUMNS {
        if let Some(mut column) = data.data_column_mut(name) {
            column.set_active(true);
            continue;
        }
        data.add_data_column(DataColumn::double(name, default));
    }
}
