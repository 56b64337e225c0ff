use serde::{Deserialize, Serialize};

use crate::bridge::BridgeOptions;
use crate::geo::DistanceUnit;
use crate::merge::{ExtentLimit, MergeOptions};
use crate::snap::{SnapMethod, SnapResolver};

/// Immutable configuration handed into component calls.
///
/// Components never read ambient state: the host materialises one `Config`
/// (from its own settings storage, out of scope here) and passes it down.
/// Bridging tolerances are taken directly in network frame units; the
/// topology tolerance is entered in `tolerance_unit` and converted per
/// frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub topology_tolerance: f64,
    pub tolerance_unit: DistanceUnit,
    /// Draw the entry and exit stub legs into the route geometry. Costs are
    /// accounted either way.
    pub include_stubs: bool,
    pub result_unit: DistanceUnit,
    pub bridge_point_tolerance: f64,
    pub bridge_line_tolerance: f64,
    /// Allow one bridge point to connect two features of the same original
    /// source.
    pub same_source_bridging: bool,
    pub feature_cap: Option<usize>,
    pub extent: ExtentLimit,
    pub snap_tolerance_pixels: f64,
}

impl Config {
    /// Factory defaults, enumerated once.
    pub const DEFAULTS: Config = Config {
        topology_tolerance: 0.0,
        tolerance_unit: DistanceUnit::Meters,
        include_stubs: true,
        result_unit: DistanceUnit::Meters,
        bridge_point_tolerance: 0.0,
        bridge_line_tolerance: 0.0,
        same_source_bridging: true,
        feature_cap: None,
        extent: ExtentLimit::Unlimited,
        snap_tolerance_pixels: 15.0,
    };

    pub fn merge_options(&self, tag_provenance: bool) -> MergeOptions {
        MergeOptions {
            feature_cap: self.feature_cap,
            extent: self.extent,
            tag_provenance,
        }
    }

    pub fn bridge_options(&self) -> BridgeOptions {
        BridgeOptions {
            point_tolerance: self.bridge_point_tolerance,
            line_tolerance: self.bridge_line_tolerance,
            same_source: self.same_source_bridging,
        }
    }

    pub fn snap_resolver(&self, method: SnapMethod) -> SnapResolver {
        SnapResolver::new(method, self.snap_tolerance_pixels)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::DEFAULTS
    }
}
