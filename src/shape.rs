//! DNA shape feature tables (minor-groove width, roll, propeller twist,
//! helical twist) as exported per sample by DNAshape predictors.

use crate::annotation::load_raw;
use crate::error::{Result, SamplerError};
use ndarray::{concatenate, Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeProperty {
    MinorGrooveWidth,
    Roll,
    PropellerTwist,
    HelicalTwist,
}

impl ShapeProperty {
    pub const ALL: [ShapeProperty; 4] = [
        ShapeProperty::MinorGrooveWidth,
        ShapeProperty::Roll,
        ShapeProperty::PropellerTwist,
        ShapeProperty::HelicalTwist,
    ];

    /// File-name suffix used by DNAshape exports
    pub fn suffix(&self) -> &'static str {
        match self {
            ShapeProperty::MinorGrooveWidth => "MGW",
            ShapeProperty::Roll => "Roll",
            ShapeProperty::PropellerTwist => "ProT",
            ShapeProperty::HelicalTwist => "HelT",
        }
    }
}

/// The four property tables of one sample class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeFiles {
    pub mgw: PathBuf,
    pub roll: PathBuf,
    pub pro_twist: PathBuf,
    pub hel_twist: PathBuf,
}

impl ShapeFiles {
    /// `{prefix}_MGW.txt`, `{prefix}_Roll.txt`, `{prefix}_ProT.txt`, `{prefix}_HelT.txt`
    pub fn from_prefix(prefix: impl AsRef<str>) -> Self {
        let path = |p: ShapeProperty| PathBuf::from(format!("{}_{}.txt", prefix.as_ref(), p.suffix()));
        ShapeFiles {
            mgw: path(ShapeProperty::MinorGrooveWidth),
            roll: path(ShapeProperty::Roll),
            pro_twist: path(ShapeProperty::PropellerTwist),
            hel_twist: path(ShapeProperty::HelicalTwist),
        }
    }

    pub fn get(&self, property: ShapeProperty) -> &Path {
        match property {
            ShapeProperty::MinorGrooveWidth => &self.mgw,
            ShapeProperty::Roll => &self.roll,
            ShapeProperty::PropellerTwist => &self.pro_twist,
            ShapeProperty::HelicalTwist => &self.hel_twist,
        }
    }
}

/// How the four property tables are reduced into one feature matrix
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Aggregation {
    /// Standardise each table, then concatenate every per-position column
    Scaled,
    /// Average each table's row to one value per property
    #[default]
    Averaged,
    /// Standardise each table, then average its rows
    ScaledAveraged,
}

impl FromStr for Aggregation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "scaled" => Ok(Aggregation::Scaled),
            "averaged" => Ok(Aggregation::Averaged),
            "scaled-averaged" => Ok(Aggregation::ScaledAveraged),
            other => Err(format!(
                "unknown aggregation {:?} (expected scaled, averaged or scaled-averaged)",
                other
            )),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregation::Scaled => write!(f, "scaled"),
            Aggregation::Averaged => write!(f, "averaged"),
            Aggregation::ScaledAveraged => write!(f, "scaled-averaged"),
        }
    }
}

/// Parses the numeric body of a property table.
///
/// Lines containing `>` are record headers and are skipped. Tokens are
/// comma-separated; tokens that are not numbers (such as `NA`) become NaN,
/// short rows are padded with NaN, and every column holding a NaN is dropped.
pub fn parse_physical_property<S: AsRef<str>>(lines: &[S]) -> Array2<f64> {
    let rows: Vec<Vec<f64>> = lines
        .iter()
        .map(|l| l.as_ref())
        .filter(|l| !l.contains('>'))
        .map(|l| {
            l.split(',')
                .map(|t| t.trim().parse::<f64>().unwrap_or(f64::NAN))
                .collect()
        })
        .collect();

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let table = Array2::from_shape_fn((rows.len(), width), |(i, j)| {
        rows[i].get(j).copied().unwrap_or(f64::NAN)
    });

    let keep: Vec<usize> = (0..width)
        .filter(|&j| table.column(j).iter().all(|v| !v.is_nan()))
        .collect();
    table.select(Axis(1), &keep)
}

/// Loads a property table file into a samples × positions matrix.
///
/// # Errors
/// * Returns `SamplerError::Io` for file reading issues
/// * Returns `SamplerError::DataError` if no complete numeric column remains
pub fn load_physical_property(path: impl AsRef<Path>) -> Result<Array2<f64>> {
    let path = path.as_ref();
    let table = parse_physical_property(&load_raw(path)?);
    if table.nrows() == 0 || table.ncols() == 0 {
        return Err(SamplerError::DataError(format!(
            "{} has no complete numeric column",
            path.display()
        )));
    }
    Ok(table)
}

/// Standardises each column to zero mean and unit population variance.
/// Constant columns are only centred.
pub fn standardize(table: &Array2<f64>) -> Array2<f64> {
    let mut scaled = table.clone();
    for mut column in scaled.columns_mut() {
        let mean = column.iter().mean();
        let std = column.iter().population_std_dev();
        let scale = if std > 0.0 { std } else { 1.0 };
        column.mapv_inplace(|v| (v - mean) / scale);
    }
    scaled
}

/// Mean of each row
pub fn row_means(table: &Array2<f64>) -> Array1<f64> {
    table.map_axis(Axis(1), |row| row.iter().mean())
}

fn aggregate(table: Array2<f64>, aggregation: Aggregation) -> Array2<f64> {
    match aggregation {
        Aggregation::Scaled => standardize(&table),
        Aggregation::Averaged => row_means(&table).insert_axis(Axis(1)),
        Aggregation::ScaledAveraged => row_means(&standardize(&table)).insert_axis(Axis(1)),
    }
}

/// Builds the feature matrix of one sample class from its four property tables,
/// concatenated in MGW, Roll, ProT, HelT order.
///
/// # Errors
/// * Returns `SamplerError::DataError` if the tables disagree on the number of samples
/// * Propagates errors from [`load_physical_property`]
pub fn build_features(files: &ShapeFiles, aggregation: Aggregation) -> Result<Array2<f64>> {
    let tables = ShapeProperty::ALL
        .iter()
        .map(|&p| {
            load_physical_property(files.get(p)).map(|t| aggregate(t, aggregation))
        })
        .collect::<Result<Vec<_>>>()?;

    let rows = tables[0].nrows();
    if let Some(bad) = tables.iter().position(|t| t.nrows() != rows) {
        return Err(SamplerError::DataError(format!(
            "{} has {} samples but {} has {}",
            files.get(ShapeProperty::ALL[bad]).display(),
            tables[bad].nrows(),
            files.mgw.display(),
            rows
        )));
    }

    let views: Vec<_> = tables.iter().map(|t| t.view()).collect();
    concatenate(Axis(1), &views).map_err(|e| SamplerError::DataError(e.to_string()))
}
