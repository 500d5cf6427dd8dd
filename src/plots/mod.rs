//! The six-figure plot catalog
//!
//! Column one holds the pooled petal length histogram, its KDE, and the
//! petal length / sepal width joint density; column two holds the
//! per-species histogram and KDE plus the sepal length / petal width
//! regression. The server computes the series; drawing is the page's chart
//! library's job.

use crate::dataset::{Dataset, Feature};
use crate::stats::{self, DensityCurve, DensityGrid, HistogramBin, LinearFit};
use serde::Serialize;

const HIST_BINS: usize = 12;
const KDE_GRID: usize = 200;
const KDE_2D_GRID: usize = 60;

/// One figure in the grid.
#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub id: &'static str,
    pub title: String,
    /// 1 or 2, the grid column this figure renders in.
    pub grid_column: u8,
    #[serde(flatten)]
    pub series: Series,
}

/// A labeled series group (one per species, or a single unlabeled pool).
#[derive(Debug, Clone, Serialize)]
pub struct HistogramGroup {
    pub label: Option<String>,
    pub bins: Vec<HistogramBin>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NamedCurve {
    pub label: Option<String>,
    #[serde(flatten)]
    pub curve: DensityCurve,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Series {
    Histogram {
        x_label: String,
        groups: Vec<HistogramGroup>,
    },
    Density {
        x_label: String,
        curves: Vec<NamedCurve>,
    },
    JointDensity {
        x_label: String,
        y_label: String,
        grid: DensityGrid,
    },
    Regression {
        x_label: String,
        y_label: String,
        points: Vec<[f64; 2]>,
        fit: LinearFit,
        /// Fitted line endpoints at the x extremes.
        line: [[f64; 2]; 2],
    },
}

/// Build all six figures.
pub fn catalog(dataset: &Dataset) -> Vec<Figure> {
    let petal_length = dataset.column(Feature::PetalLength);
    let sepal_width = dataset.column(Feature::SepalWidth);
    let sepal_length = dataset.column(Feature::SepalLength);
    let petal_width = dataset.column(Feature::PetalWidth);

    let pooled_hist = Figure {
        id: "petal-length-hist",
        title: format!("Histogram of {}", Feature::PetalLength),
        grid_column: 1,
        series: Series::Histogram {
            x_label: Feature::PetalLength.name().to_string(),
            groups: vec![HistogramGroup {
                label: None,
                bins: stats::histogram(petal_length, HIST_BINS),
            }],
        },
    };

    let pooled_kde = Figure {
        id: "petal-length-kde",
        title: format!("Density of {}", Feature::PetalLength),
        grid_column: 1,
        series: Series::Density {
            x_label: Feature::PetalLength.name().to_string(),
            curves: vec![NamedCurve {
                label: None,
                curve: stats::kde(petal_length, KDE_GRID),
            }],
        },
    };

    let joint = Figure {
        id: "petal-length-sepal-width-joint",
        title: format!(
            "Joint density of {} and {}",
            Feature::PetalLength,
            Feature::SepalWidth
        ),
        grid_column: 1,
        series: Series::JointDensity {
            x_label: Feature::PetalLength.name().to_string(),
            y_label: Feature::SepalWidth.name().to_string(),
            grid: stats::kde_2d(petal_length, sepal_width, KDE_2D_GRID),
        },
    };

    let by_species = |feature: Feature| -> Vec<(String, Vec<f64>)> {
        dataset
            .species_present()
            .into_iter()
            .map(|s| (s.name().to_string(), dataset.column_for_species(feature, s)))
            .collect()
    };

    let species_hist = Figure {
        id: "petal-length-hist-by-species",
        title: "Histogram of Petal Lengths, by Species".to_string(),
        grid_column: 2,
        series: Series::Histogram {
            x_label: Feature::PetalLength.name().to_string(),
            groups: by_species(Feature::PetalLength)
                .into_iter()
                .map(|(label, values)| HistogramGroup {
                    label: Some(label),
                    bins: stats::histogram(&values, HIST_BINS),
                })
                .collect(),
        },
    };

    let species_kde = Figure {
        id: "petal-length-kde-by-species",
        title: "Distribution of Petal Lengths, by Species".to_string(),
        grid_column: 2,
        series: Series::Density {
            x_label: Feature::PetalLength.name().to_string(),
            curves: by_species(Feature::PetalLength)
                .into_iter()
                .map(|(label, values)| NamedCurve {
                    label: Some(label),
                    curve: stats::kde(&values, KDE_GRID),
                })
                .collect(),
        },
    };

    let fit = stats::linear_fit(sepal_length, petal_width);
    let x_min = stats::min(sepal_length);
    let x_max = stats::max(sepal_length);
    let regression = Figure {
        id: "sepal-length-petal-width-reg",
        title: format!(
            "Regression of {} on {}",
            Feature::PetalWidth,
            Feature::SepalLength
        ),
        grid_column: 2,
        series: Series::Regression {
            x_label: Feature::SepalLength.name().to_string(),
            y_label: Feature::PetalWidth.name().to_string(),
            points: sepal_length
                .iter()
                .zip(petal_width)
                .map(|(&x, &y)| [x, y])
                .collect(),
            fit,
            line: [
                [x_min, fit.intercept + fit.slope * x_min],
                [x_max, fit.intercept + fit.slope * x_max],
            ],
        },
    };

    vec![
        pooled_hist,
        pooled_kde,
        joint,
        species_hist,
        species_kde,
        regression,
    ]
}
