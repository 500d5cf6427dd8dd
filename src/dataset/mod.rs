//! Bundled iris dataset
//!
//! The dashboard works against one fixed tabular dataset: 150 rows, four
//! numeric feature columns (centimeters) and one categorical species label.
//! The data ships inside the binary and is parsed exactly once per process;
//! every caller sees the same memoized, immutable table.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;
use tracing::info;

const IRIS_CSV: &str = include_str!("iris.csv");

pub const ROW_COUNT: usize = 150;

/// The four numeric feature columns, all measured in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    SepalLength,
    SepalWidth,
    PetalLength,
    PetalWidth,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::SepalLength,
        Feature::SepalWidth,
        Feature::PetalLength,
        Feature::PetalWidth,
    ];

    /// Column header as it appears in the raw table.
    pub fn name(&self) -> &'static str {
        match self {
            Feature::SepalLength => "sepal length (cm)",
            Feature::SepalWidth => "sepal width (cm)",
            Feature::PetalLength => "petal length (cm)",
            Feature::PetalWidth => "petal width (cm)",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The closed set of species labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Setosa,
    Versicolor,
    Virginica,
}

impl Species {
    pub const ALL: [Species; 3] = [Species::Setosa, Species::Versicolor, Species::Virginica];

    pub fn name(&self) -> &'static str {
        match self {
            Species::Setosa => "setosa",
            Species::Versicolor => "versicolor",
            Species::Virginica => "virginica",
        }
    }

    fn parse(s: &str) -> Option<Species> {
        match s {
            "setosa" => Some(Species::Setosa),
            "versicolor" => Some(Species::Versicolor),
            "virginica" => Some(Species::Virginica),
            _ => None,
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the table.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Row {
    pub sepal_length: f64,
    pub sepal_width: f64,
    pub petal_length: f64,
    pub petal_width: f64,
    pub species: Species,
}

impl Row {
    pub fn feature(&self, feature: Feature) -> f64 {
        match feature {
            Feature::SepalLength => self.sepal_length,
            Feature::SepalWidth => self.sepal_width,
            Feature::PetalLength => self.petal_length,
            Feature::PetalWidth => self.petal_width,
        }
    }
}

/// The full table. Column-major accessors are precomputed at load so the
/// stats and query paths can borrow slices without re-collecting.
#[derive(Debug)]
pub struct Dataset {
    rows: Vec<Row>,
    columns: [Vec<f64>; 4],
}

impl Dataset {
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Full column of values for one feature, in row order.
    pub fn column(&self, feature: Feature) -> &[f64] {
        let idx = match feature {
            Feature::SepalLength => 0,
            Feature::SepalWidth => 1,
            Feature::PetalLength => 2,
            Feature::PetalWidth => 3,
        };
        &self.columns[idx]
    }

    /// Column values restricted to one species.
    pub fn column_for_species(&self, feature: Feature, species: Species) -> Vec<f64> {
        self.rows
            .iter()
            .filter(|r| r.species == species)
            .map(|r| r.feature(feature))
            .collect()
    }

    /// Distinct species present, in declaration order.
    pub fn species_present(&self) -> Vec<Species> {
        Species::ALL
            .iter()
            .copied()
            .filter(|s| self.rows.iter().any(|r| r.species == *s))
            .collect()
    }

    fn parse(csv: &str) -> Result<Dataset> {
        let mut rows = Vec::with_capacity(ROW_COUNT);
        let mut lines = csv.lines();

        // Header line is fixed; skip it.
        let _ = lines.next();

        for (lineno, line) in lines.enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let mut fields = line.split(',');
            let mut numeric = |name: &str| -> Result<f64> {
                fields
                    .next()
                    .ok_or_else(|| bad_row(lineno, name, "missing"))?
                    .parse::<f64>()
                    .map_err(|_| bad_row(lineno, name, "not numeric"))
            };

            let sepal_length = numeric("sepal_length")?;
            let sepal_width = numeric("sepal_width")?;
            let petal_length = numeric("petal_length")?;
            let petal_width = numeric("petal_width")?;

            let species_field = fields
                .next()
                .ok_or_else(|| bad_row(lineno, "species", "missing"))?;
            let species = Species::parse(species_field)
                .ok_or_else(|| bad_row(lineno, "species", "unknown label"))?;

            rows.push(Row {
                sepal_length,
                sepal_width,
                petal_length,
                petal_width,
                species,
            });
        }

        if rows.len() != ROW_COUNT {
            return Err(Error::DataUnavailable(format!(
                "expected {} rows, found {}",
                ROW_COUNT,
                rows.len()
            )));
        }

        let columns = [
            rows.iter().map(|r| r.sepal_length).collect(),
            rows.iter().map(|r| r.sepal_width).collect(),
            rows.iter().map(|r| r.petal_length).collect(),
            rows.iter().map(|r| r.petal_width).collect(),
        ];

        Ok(Dataset { rows, columns })
    }
}

fn bad_row(lineno: usize, field: &str, problem: &str) -> Error {
    Error::DataUnavailable(format!(
        "row {}: field {} {}",
        lineno + 1,
        field,
        problem
    ))
}

static DATASET: OnceLock<Dataset> = OnceLock::new();

/// Load the bundled dataset, memoized for the process lifetime.
///
/// Repeated calls return the identical cached table; the parse runs once.
pub fn get() -> Result<&'static Dataset> {
    if let Some(ds) = DATASET.get() {
        return Ok(ds);
    }

    let parsed = Dataset::parse(IRIS_CSV)?;
    info!(rows = parsed.len(), "iris dataset loaded");

    // A racing loader may have won; either way the stored value came from
    // the same immutable source.
    Ok(DATASET.get_or_init(|| parsed))
}
