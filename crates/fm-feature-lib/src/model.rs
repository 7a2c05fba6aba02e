//! FeatureDataModel - coordinate data for every fixed weir and bridge pillar of a model
//!
//! The model area reports feature additions, removals and replacements through
//! [`FeatureDataModel::apply_change`]; the model creates, rebinds or disposes the
//! matching [`ModelFeatureCoordinateData`] so that each feature always has exactly
//! one set of data columns while it is part of the model.

use crate::coordinate_data::ModelFeatureCoordinateData;
use crate::feature::Feature;
use crate::fixed_weir::FixedWeirScheme;
use crate::{bridge_pillar, fixed_weir};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Configuration for the feature data model
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Scheme deciding which fixed weir columns exist and are active.
    /// Default: Tabellenboek (8)
    pub fixed_weir_scheme: FixedWeirScheme,
}

/// Area feature kinds that carry per-vertex model data
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FeatureKind {
    FixedWeir,
    BridgePillar,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureKind::FixedWeir => f.write_str("fixed weir"),
            FeatureKind::BridgePillar => f.write_str("bridge pillar"),
        }
    }
}

/// A change to one of the model area's feature collections
#[derive(Clone, Debug)]
pub enum CollectionChange {
    Added(Rc<Feature>),
    Removed(Rc<Feature>),
    Replaced(Rc<Feature>),
}

/// Owner of all coordinate data in a model
#[derive(Debug, Default)]
pub struct FeatureDataModel {
    config: Config,
    fixed_weirs: Vec<ModelFeatureCoordinateData>,
    bridge_pillars: Vec<ModelFeatureCoordinateData>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl FeatureDataModel {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            fixed_weirs: Vec::new(),
            bridge_pillars: Vec::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn fixed_weir_scheme(&self) -> FixedWeirScheme {
        self.config.fixed_weir_scheme
    }

    /// Change the scheme and update the columns of every fixed weir
    pub fn set_fixed_weir_scheme(&mut self, scheme: FixedWeirScheme) {
        if self.config.fixed_weir_scheme == scheme {
            return;
        }
        self.config.fixed_weir_scheme = scheme;

        for data in &mut self.fixed_weirs {
            fixed_weir::update_data_columns(data, scheme);
        }
        tracing::debug!(%scheme, fixed_weirs = self.fixed_weirs.len(), "fixed weir scheme changed");
    }

    /// Coordinate data for `feature` with the columns its kind carries under this model
    pub fn create_coordinate_data(
        &self,
        kind: FeatureKind,
        feature: Rc<Feature>,
    ) -> ModelFeatureCoordinateData {
        let mut data = ModelFeatureCoordinateData::for_feature(feature);
        match kind {
            FeatureKind::FixedWeir => {
                fixed_weir::update_data_columns(&mut data, self.config.fixed_weir_scheme)
            }
            FeatureKind::BridgePillar => bridge_pillar::update_data_columns(&mut data),
        }
        data
    }

    /// React to a change of the area's `kind` collection
    pub fn apply_change(&mut self, kind: FeatureKind, change: CollectionChange) {
        match change {
            CollectionChange::Added(feature) => {
                if self.position(kind, &feature).is_none() {
                    let data = self.create_coordinate_data(kind, feature);
                    self.collection_mut(kind).push(data);
                }
            }
            CollectionChange::Removed(feature) => {
                if let Some(index) = self.position(kind, &feature) {
                    let mut data = self.collection_mut(kind).remove(index);
                    data.dispose();
                    tracing::trace!(%kind, feature = %feature, "disposed coordinate data");
                }
            }
            CollectionChange::Replaced(feature) => match self.position(kind, &feature) {
                Some(index) => self.collection_mut(kind)[index].set_feature(Some(feature)),
                None => {
                    let data = self.create_coordinate_data(kind, feature);
                    self.collection_mut(kind).push(data);
                }
            },
        }
    }

    /// Store externally built coordinate data, replacing any data for the same feature
    pub fn insert(&mut self, kind: FeatureKind, data: ModelFeatureCoordinateData) {
        let Some(feature) = data.feature() else {
            tracing::warn!(%kind, "ignoring coordinate data without a feature");
            return;
        };

        match self.position(kind, &feature) {
            Some(index) => self.collection_mut(kind)[index] = data,
            None => self.collection_mut(kind).push(data),
        }
    }

    pub fn data_for(
        &self,
        kind: FeatureKind,
        feature: &Rc<Feature>,
    ) -> Option<&ModelFeatureCoordinateData> {
        self.collection(kind).iter().find(|d| d.is_attached_to(feature))
    }

    pub fn data_for_mut(
        &mut self,
        kind: FeatureKind,
        feature: &Rc<Feature>,
    ) -> Option<&mut ModelFeatureCoordinateData> {
        self.collection_mut(kind)
            .iter_mut()
            .find(|d| d.is_attached_to(feature))
    }

    /// All coordinate data of one kind, in insertion order
    pub fn iter(&self, kind: FeatureKind) -> impl Iterator<Item = &ModelFeatureCoordinateData> {
        self.collection(kind).iter()
    }

    pub fn len(&self, kind: FeatureKind) -> usize {
        self.collection(kind).len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixed_weirs.is_empty() && self.bridge_pillars.is_empty()
    }

    /// Dispose and drop all coordinate data
    pub fn clear(&mut self) {
        for data in self.fixed_weirs.iter_mut().chain(self.bridge_pillars.iter_mut()) {
            data.dispose();
        }
        self.fixed_weirs.clear();
        self.bridge_pillars.clear();
    }

    fn position(&self, kind: FeatureKind, feature: &Rc<Feature>) -> Option<usize> {
        self.collection(kind)
            .iter()
            .position(|d| d.is_attached_to(feature))
    }

    fn collection(&self, kind: FeatureKind) -> &Vec<ModelFeatureCoordinateData> {
        match kind {
            FeatureKind::FixedWeir => &self.fixed_weirs,
            FeatureKind::BridgePillar => &self.bridge_pillars,
        }
    }

    fn collection_mut(&mut self, kind: FeatureKind) -> &mut Vec<ModelFeatureCoordinateData> {
        match kind {
            FeatureKind::FixedWeir => &mut self.fixed_weirs,
            FeatureKind::BridgePillar => &mut self.bridge_pillars,
        }
    }
}
