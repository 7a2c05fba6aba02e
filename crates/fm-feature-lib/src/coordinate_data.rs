//! ModelFeatureCoordinateData - per-vertex data columns kept in step with a feature
//!
//! The synchronizer subscribes to its feature's geometry changes and rebuilds every
//! data column whenever the vertex count changes. Vertex identity is recovered by
//! exact 2D coordinate equality between the previous and the new geometry:
//!
//! - each previous vertex maps to the **first** equal vertex of the new geometry,
//!   or is dropped when there is none;
//! - new vertices get the column default (no interpolation);
//! - a geometry with the same vertex count is treated as a pure move, values stay
//!   where they are.
//!
//! Repeated coincident vertices defeat the first-match rule: both old vertices map
//! onto the first occurrence and the later one overwrites the earlier. Column data is
//! therefore best effort, never an exact record.

use crate::column::DataColumn;
use crate::feature::{Feature, GeometryObserver, ObserverId};

use geo::{Coord, LineString};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// For every vertex of `previous`, the index of the first exactly equal vertex in `current`
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn map_vertices(previous: &[Coord<f64>], current: &[Coord<f64>]) -> Vec<Option<usize>> {
    previous
        .iter()
        .map(|old| current.iter().position(|new| new.x == old.x && new.y == old.y))
        .collect()
}

#[derive(Default)]
struct SyncState {
    feature: Option<Rc<Feature>>,
    observer_id: Option<ObserverId>,
    /// Geometry the column values are currently aligned with
    previous_geometry: Option<LineString<f64>>,
    data_columns: Vec<DataColumn>,
}

/// Observer half registered with the feature
struct Synchronizer {
    state: RefCell<SyncState>,
}

impl GeometryObserver for Synchronizer {
    fn geometry_changed(&self, geometry: &LineString<f64>) {
        #[cfg(feature = "profiling")]
        profiling::scope!("coordinate_data::geometry_changed");

        let Ok(mut state) = self.state.try_borrow_mut() else {
            tracing::warn!("data columns are borrowed during a geometry change; resynchronization skipped");
            return;
        };
        let new_len = geometry.0.len();

        let Some(previous) = state.previous_geometry.take() else {
            // Attached but never baselined; align from scratch.
            for column in &mut state.data_columns {
                column.fill_default(new_len);
            }
            state.previous_geometry = Some(geometry.clone());
            return;
        };

        if previous.0.len() == new_len {
            state.previous_geometry = Some(geometry.clone());
            return;
        }

        let mapping = map_vertices(&previous.0, &geometry.0);
        tracing::debug!(
            previous = previous.0.len(),
            current = new_len,
            matched = mapping.iter().filter(|m| m.is_some()).count(),
            "resynchronizing data columns"
        );

        for column in &mut state.data_columns {
            column.remap(&mapping, new_len);
        }
        state.previous_geometry = Some(geometry.clone());
    }
}

/// Binds one feature to its data columns
///
/// Dropping the value detaches it from the feature.
pub struct ModelFeatureCoordinateData {
    inner: Rc<Synchronizer>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl ModelFeatureCoordinateData {
    /// Create coordinate data without a feature or columns
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Synchronizer {
                state: RefCell::new(SyncState::default()),
            }),
        }
    }

    /// Create coordinate data attached to `feature`
    pub fn for_feature(feature: Rc<Feature>) -> Self {
        let mut data = Self::new();
        data.set_feature(Some(feature));
        data
    }

    /// The attached feature, if any
    pub fn feature(&self) -> Option<Rc<Feature>> {
        self.inner.state.borrow().feature.clone()
    }

    /// Whether `feature` is the attached feature (identity, not name)
    pub fn is_attached_to(&self, feature: &Rc<Feature>) -> bool {
        self.inner
            .state
            .borrow()
            .feature
            .as_ref()
            .is_some_and(|attached| Rc::ptr_eq(attached, feature))
    }

    /// Attach to a new feature, or detach with `None`
    ///
    /// Detaches from the previous feature first. Attaching baselines the new geometry
    /// and resets every column to its default at the new vertex count; detaching
    /// clears every column.
    pub fn set_feature(&mut self, feature: Option<Rc<Feature>>) {
        self.detach();

        let mut state = self.inner.state.borrow_mut();
        match feature {
            Some(feature) => {
                let observer: Rc<dyn GeometryObserver> = self.inner.clone();
                let observer_id = feature.subscribe(Rc::downgrade(&observer));
                let geometry = feature.geometry().clone();

                for column in &mut state.data_columns {
                    column.fill_default(geometry.0.len());
                }

                tracing::trace!(
                    feature = %feature,
                    vertices = geometry.0.len(),
                    columns = state.data_columns.len(),
                    "attached coordinate data"
                );

                state.previous_geometry = Some(geometry);
                state.observer_id = Some(observer_id);
                state.feature = Some(feature);
            }
            None => {
                for column in &mut state.data_columns {
                    column.clear();
                }
            }
        }
    }

    /// Add a column, sized to the attached feature's vertex count
    pub fn add_data_column(&mut self, mut column: DataColumn) {
        let mut state = self.inner.state.borrow_mut();
        if let Some(geometry) = &state.previous_geometry {
            column.fill_default(geometry.0.len());
        }
        state.data_columns.push(column);
    }

    /// Remove the first column called `name`
    pub fn remove_data_column(&mut self, name: &str) -> Option<DataColumn> {
        let mut state = self.inner.state.borrow_mut();
        let index = state.data_columns.iter().position(|c| c.name() == name)?;
        Some(state.data_columns.remove(index))
    }

    /// All columns in insertion order
    ///
    /// Release the borrow before changing the feature geometry; a change made while
    /// it is held is not resynchronized.
    pub fn data_columns(&self) -> Ref<'_, [DataColumn]> {
        Ref::map(self.inner.state.borrow(), |state| state.data_columns.as_slice())
    }

    pub fn data_column_count(&self) -> usize {
        self.inner.state.borrow().data_columns.len()
    }

    pub fn data_column(&self, name: &str) -> Option<Ref<'_, DataColumn>> {
        Ref::filter_map(self.inner.state.borrow(), |state| {
            state.data_columns.iter().find(|c| c.name() == name)
        })
        .ok()
    }

    pub fn data_column_mut(&mut self, name: &str) -> Option<RefMut<'_, DataColumn>> {
        RefMut::filter_map(self.inner.state.borrow_mut(), |state| {
            state.data_columns.iter_mut().find(|c| c.name() == name)
        })
        .ok()
    }

    pub fn data_column_at(&self, index: usize) -> Option<Ref<'_, DataColumn>> {
        Ref::filter_map(self.inner.state.borrow(), |state| state.data_columns.get(index)).ok()
    }

    pub fn data_column_at_mut(&mut self, index: usize) -> Option<RefMut<'_, DataColumn>> {
        RefMut::filter_map(self.inner.state.borrow_mut(), |state| {
            state.data_columns.get_mut(index)
        })
        .ok()
    }

    /// Detach from the feature and clear all columns
    pub fn dispose(&mut self) {
        self.set_feature(None);
    }

    fn detach(&mut self) {
        let mut state = self.inner.state.borrow_mut();
        if let (Some(feature), Some(id)) = (state.feature.take(), state.observer_id.take()) {
            feature.unsubscribe(id);
        }
        state.previous_geometry = None;
    }
}

impl Default for ModelFeatureCoordinateData {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ModelFeatureCoordinateData {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for ModelFeatureCoordinateData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("ModelFeatureCoordinateData")
            .field("feature", &state.feature)
            .field("data_columns", &state.data_columns)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnValue;
    use geo::line_string;

    fn data_with_column(feature: &Rc<Feature>, default: f64) -> ModelFeatureCoordinateData {
        let mut data = ModelFeatureCoordinateData::new();
        data.add_data_column(DataColumn::double("Crest Level", default));
        data.set_feature(Some(feature.clone()));
        data
    }

    fn set_values(data: &mut ModelFeatureCoordinateData, values: &[f64]) {
        let mut column = data.data_column_mut("Crest Level").unwrap();
        for (i, v) in values.iter().enumerate() {
            column.set_value(i, *v).unwrap();
        }
    }

    fn values(data: &ModelFeatureCoordinateData) -> Vec<f64> {
        data.data_column("Crest Level").unwrap().doubles().unwrap().to_vec()
    }

    #[test]
    fn test_attach_fills_defaults() {
        let feature = Feature::new(
            "weir",
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 2.0, y: 0.0)],
        );
        let data = data_with_column(&feature, 7.5);

        assert_eq!(values(&data), vec![7.5, 7.5, 7.5]);
        assert!(data.is_attached_to(&feature));
        assert_eq!(feature.observer_count(), 1);
    }

    #[test]
    fn test_removed_vertex_drops_its_value() {
        let feature = Feature::new(
            "weir",
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0), (x: 2.0, y: 0.0)],
        );
        let mut data = data_with_column(&feature, 0.0);
        set_values(&mut data, &[1.0, 2.0, 3.0]);

        feature.set_geometry(line_string![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0)]);

        assert_eq!(values(&data), vec![1.0, 3.0]);
    }

    #[test]
    fn test_inserted_vertex_gets_default() {
        let feature = Feature::new("weir", line_string![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0)]);
        let mut data = data_with_column(&feature, -1.0);
        set_values(&mut data, &[1.0, 2.0]);

        feature.set_geometry(line_string![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 5.0),
            (x: 2.0, y: 0.0)
        ]);

        assert_eq!(values(&data), vec![1.0, -1.0, 2.0]);
    }

    #[test]
    fn test_detach_clears_columns() {
        let feature = Feature::new("weir", line_string![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0)]);
        let mut data = data_with_column(&feature, 1.0);

        data.set_feature(None);

        assert!(data.feature().is_none());
        assert!(data.data_columns().iter().all(|c| c.is_empty()));
        assert_eq!(feature.observer_count(), 0);
    }

    #[test]
    fn test_same_vertex_count_keeps_positions() {
        let feature = Feature::new("weir", line_string![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0)]);
        let mut data = data_with_column(&feature, 0.0);
        set_values(&mut data, &[1.0, 2.0]);

        feature.set_geometry(line_string![(x: 10.0, y: 10.0), (x: 20.0, y: 10.0)]);
        assert_eq!(values(&data), vec![1.0, 2.0]);

        // The moved geometry is the new baseline for matching
        feature.set_geometry(line_string![(x: 20.0, y: 10.0)]);
        assert_eq!(values(&data), vec![2.0]);
    }

    #[test]
    fn test_duplicate_coordinates_use_first_match() {
        // A and the closing vertex coincide; both map onto the first A
        let feature = Feature::new(
            "ring",
            line_string![
                (x: 0.0, y: 0.0),
                (x: 1.0, y: 0.0),
                (x: 1.0, y: 1.0),
                (x: 0.0, y: 0.0)
            ],
        );
        let mut data = data_with_column(&feature, 0.0);
        set_values(&mut data, &[1.0, 2.0, 3.0, 4.0]);

        feature.set_geometry(line_string![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.5, y: 0.5),
            (x: 0.0, y: 0.0)
        ]);

        assert_eq!(values(&data), vec![4.0, 2.0, 3.0, 0.0, 0.0]);
    }

    #[test]
    fn test_map_vertices() {
        let previous = [
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 1.0 },
            Coord { x: 2.0, y: 2.0 },
        ];
        let current = [Coord { x: 2.0, y: 2.0 }, Coord { x: 0.0, y: 0.0 }];
        assert_eq!(map_vertices(&previous, &current), vec![Some(1), None, Some(0)]);
    }

    #[test]
    fn test_add_column_to_attached_feature() {
        let feature = Feature::new(
            "pillars",
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 2.0, y: 0.0)],
        );
        let mut data = ModelFeatureCoordinateData::for_feature(feature.clone());
        data.add_data_column(DataColumn::text("Label", "pier"));

        let column = data.data_column("Label").unwrap();
        assert_eq!(column.len(), 3);
        assert_eq!(column.value(2), Some(ColumnValue::Text("pier".to_string())));
        drop(column);

        assert_eq!(data.data_column_at(0).unwrap().name(), "Label");
        assert!(data.data_column_at(1).is_none());
    }

    #[test]
    fn test_remove_column() {
        let feature = Feature::new("weir", line_string![(x: 0.0, y: 0.0)]);
        let mut data = data_with_column(&feature, 0.0);

        let removed = data.remove_data_column("Crest Level").unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(data.data_column_count(), 0);
        assert!(data.remove_data_column("Crest Level").is_none());

        feature.set_geometry(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)]);
        assert_eq!(removed.len(), 1);
    }

    #[test]
    fn test_reassign_moves_subscription() {
        let first = Feature::new("a", line_string![(x: 0.0, y: 0.0)]);
        let second = Feature::new("b", line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)]);
        let mut data = data_with_column(&first, 3.0);

        data.set_feature(Some(second.clone()));
        assert_eq!(first.observer_count(), 0);
        assert_eq!(second.observer_count(), 1);
        assert_eq!(values(&data), vec![3.0, 3.0]);

        // Changes to the old feature are no longer followed
        first.set_geometry(line_string![(x: 0.0, y: 0.0), (x: 5.0, y: 5.0), (x: 6.0, y: 6.0)]);
        assert_eq!(values(&data).len(), 2);
    }

    #[test]
    fn test_drop_and_dispose_detach() {
        let feature = Feature::new("weir", line_string![(x: 0.0, y: 0.0)]);

        let data = data_with_column(&feature, 0.0);
        drop(data);
        assert_eq!(feature.observer_count(), 0);

        let mut data = data_with_column(&feature, 0.0);
        data.dispose();
        assert!(data.feature().is_none());
        assert!(data.data_columns()[0].is_empty());
        assert_eq!(feature.observer_count(), 0);
    }

    #[test]
    fn test_inactive_columns_follow_geometry() {
        let feature = Feature::new("weir", line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)]);
        let mut data = data_with_column(&feature, 0.0);
        data.data_column_mut("Crest Level").unwrap().set_active(false);

        feature.set_geometry(line_string![(x: 0.0, y: 0.0)]);
        assert_eq!(values(&data), vec![0.0]);
    }

    #[test]
    fn test_geometry_change_while_columns_borrowed() {
        let feature = Feature::new("weir", line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)]);
        let mut data = data_with_column(&feature, 0.0);
        set_values(&mut data, &[1.0, 2.0]);

        let columns = data.data_columns();
        feature.set_geometry(line_string![(x: 0.0, y: 0.0)]);
        assert_eq!(columns[0].len(), 2);
        drop(columns);

        assert_eq!(values(&data), vec![1.0, 2.0]);

        feature.set_geometry(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 2.0, y: 0.0)]);
        assert_eq!(values(&data), vec![1.0, 2.0, 0.0]);
    }
}
