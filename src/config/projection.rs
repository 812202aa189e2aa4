//! Configuration file parser for cone-beam projection

use std::fs;
use std::path::Path;

use serde::Deserialize;

use units::{mm, mm_, radian_, Angle, Length};
use units::plain::Voxelsf32;

use crate::scanner::{Geometry, DEFAULT_ACCURACY};
use super::{
    ConfigError, PerAngle,
    deserialize_uom, deserialize_uom_array, deserialize_uom_vec_opt, deserialize_uom_per_angle,
};

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Config {

    /// Distance between consecutive samples along a ray, in voxels
    #[serde(default = "default_accuracy")]
    pub accuracy: Voxelsf32,

    /// Source to rotation axis
    #[serde(deserialize_with = "deserialize_uom")]
    pub dso: Length,

    /// Source to detector plane
    #[serde(deserialize_with = "deserialize_uom")]
    pub dsd: Length,

    pub volume: Volume,
    pub detector: Detector,
    pub angles: Angles,

    #[serde(default)]
    pub offsets: Offsets,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Volume {
    pub nvoxels: [usize; 3],
    #[serde(deserialize_with = "deserialize_uom_array")]
    pub size: [Length; 3],
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Detector {
    pub npixels: [usize; 2],
    #[serde(deserialize_with = "deserialize_uom_array")]
    pub pixel: [Length; 2],
}

/// Either an explicit list of angles, or an evenly spaced range
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Angles {
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_uom_vec_opt")]
    pub values: Option<Vec<Angle>>,

    pub range: Option<AngleRange>,
}

/// `n` angles starting at `start`, evenly spaced, `stop` excluded
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct AngleRange {
    #[serde(deserialize_with = "deserialize_uom")]
    pub start: Angle,
    #[serde(deserialize_with = "deserialize_uom")]
    pub stop: Angle,
    pub n: usize,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Offsets {
    /// Detector shift along U and V
    #[serde(default = "no_detector_offset")]
    #[serde(deserialize_with = "deserialize_uom_per_angle")]
    pub detector: PerAngle<[Length; 2]>,

    /// Volume shift along x, y and z
    #[serde(default = "no_origin_offset")]
    #[serde(deserialize_with = "deserialize_uom_per_angle")]
    pub origin: PerAngle<[Length; 3]>,
}

impl Default for Offsets {
    fn default() -> Self {
        Self { detector: no_detector_offset(), origin: no_origin_offset() }
    }
}

fn default_accuracy() -> Voxelsf32 { DEFAULT_ACCURACY }
fn no_detector_offset() -> PerAngle<[Length; 2]> { PerAngle::All([mm(0.0); 2]) }
fn no_origin_offset  () -> PerAngle<[Length; 3]> { PerAngle::All([mm(0.0); 3]) }

impl Config {

    /// Projection angles in radians
    pub fn angles(&self) -> Result<Vec<f64>, ConfigError> {
        match &self.angles {
            Angles { values: Some(values), range: None } => {
                Ok(values.iter().map(|&a| radian_(a) as f64).collect())
            },
            Angles { values: None, range: Some(AngleRange { start, stop, n }) } => {
                let start = radian_(*start) as f64;
                let stop  = radian_(*stop ) as f64;
                let step = (stop - start) / *n as f64;
                Ok((0..*n).map(|k| start + k as f64 * step).collect())
            },
            Angles { values: Some(_), range: Some(_) } => Err(ConfigError::Angles("give either `values` or `range`, not both".into())),
            Angles { values: None   , range: None    } => Err(ConfigError::Angles("one of `values` or `range` is required".into())),
        }
    }

    /// Scanner geometry, with offsets for each of the configured angles
    pub fn geometry(&self) -> Result<Geometry, ConfigError> {
        let n_angles = self.angles()?.len();
        let [sx, sy, sz] = self.volume.size;
        let [pu, pv] = self.detector.pixel;
        let mut geometry = Geometry::new(
            self.volume.nvoxels,
            [mm_(sx), mm_(sy), mm_(sz)],
            self.detector.npixels,
            [mm_(pu), mm_(pv)],
            mm_(self.dso),
            mm_(self.dsd),
        ).with_accuracy(self.accuracy);

        let detector = self.offsets.detector.broadcast("detector", n_angles)?;
        let origin   = self.offsets.origin  .broadcast("origin"  , n_angles)?;
        geometry.off_detec_u = detector.iter().map(|&[u, _]| mm_(u)).collect();
        geometry.off_detec_v = detector.iter().map(|&[_, v]| mm_(v)).collect();
        geometry.off_orig_x  = origin  .iter().map(|&[x, _, _]| mm_(x)).collect();
        geometry.off_orig_y  = origin  .iter().map(|&[_, y, _]| mm_(y)).collect();
        geometry.off_orig_z  = origin  .iter().map(|&[_, _, z]| mm_(z)).collect();
        Ok(geometry)
    }
}

pub fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    let config = fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.into(), source })?;
    Ok(toml::from_str(&config)?)
}
