use super::{Answer, QueryEngine};
use crate::dataset::{Dataset, Feature, Species};
use crate::error::{Error, Result};
use crate::stats;
use tracing::debug;

/// Aggregate operations the engine can resolve from a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Mean,
    Median,
    Min,
    Max,
    Sum,
    StdDev,
    Count,
    Correlation,
}

impl Operation {
    fn label(&self) -> &'static str {
        match self {
            Operation::Mean => "average",
            Operation::Median => "median",
            Operation::Min => "minimum",
            Operation::Max => "maximum",
            Operation::Sum => "total",
            Operation::StdDev => "standard deviation",
            Operation::Count => "count",
            Operation::Correlation => "correlation",
        }
    }
}

/// Built-in question-answering engine.
///
/// Resolves an aggregate operation, one or two feature columns, and an
/// optional species filter from the question text, then evaluates against
/// the dataset. Anything it cannot resolve is a [`Error::Query`].
#[derive(Debug, Default)]
pub struct AggregateEngine {
    _private: (),
}

impl AggregateEngine {
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn parse_operation(question: &str) -> Option<Operation> {
        const TABLE: [(&str, Operation); 15] = [
            ("average", Operation::Mean),
            ("mean", Operation::Mean),
            ("median", Operation::Median),
            ("smallest", Operation::Min),
            ("minimum", Operation::Min),
            ("min ", Operation::Min),
            ("largest", Operation::Max),
            ("biggest", Operation::Max),
            ("maximum", Operation::Max),
            ("max ", Operation::Max),
            ("sum", Operation::Sum),
            ("total", Operation::Sum),
            ("deviation", Operation::StdDev),
            ("how many", Operation::Count),
            ("correlat", Operation::Correlation),
        ];
        TABLE
            .iter()
            .find(|(kw, _)| question.contains(kw))
            .map(|(_, op)| *op)
    }

    /// Feature mentions in question order. "petal length", "petal_length"
    /// and "length of the petal" all resolve.
    fn parse_features(question: &str) -> Vec<Feature> {
        let flat = question.replace('_', " ");
        let mut found: Vec<(usize, Feature)> = Vec::new();
        for feature in Feature::ALL {
            let (part, dim) = match feature {
                Feature::SepalLength => ("sepal", "length"),
                Feature::SepalWidth => ("sepal", "width"),
                Feature::PetalLength => ("petal", "length"),
                Feature::PetalWidth => ("petal", "width"),
            };
            let direct = format!("{} {}", part, dim);
            let inverted = format!("{} of the {}", dim, part);
            if let Some(pos) = flat.find(&direct).or_else(|| flat.find(&inverted)) {
                found.push((pos, feature));
            }
        }
        found.sort_by_key(|(pos, _)| *pos);
        found.into_iter().map(|(_, f)| f).collect()
    }

    fn parse_species(question: &str) -> Option<Species> {
        Species::ALL
            .iter()
            .copied()
            .find(|s| question.contains(s.name()))
    }

    fn evaluate_single(
        op: Operation,
        feature: Feature,
        species: Option<Species>,
        dataset: &Dataset,
    ) -> Answer {
        let owned;
        let values: &[f64] = match species {
            Some(s) => {
                owned = dataset.column_for_species(feature, s);
                &owned
            }
            None => dataset.column(feature),
        };

        let scope = species
            .map(|s| format!(" for {}", s))
            .unwrap_or_default();

        if op == Operation::Count {
            return Answer {
                text: format!("There are {} rows{}.", values.len(), scope),
                value: Some(values.len() as f64),
            };
        }

        let value = match op {
            Operation::Mean => stats::mean(values),
            Operation::Median => stats::median(values),
            Operation::Min => stats::min(values),
            Operation::Max => stats::max(values),
            Operation::Sum => values.iter().sum(),
            Operation::StdDev => stats::std_dev(values),
            Operation::Count | Operation::Correlation => unreachable!(),
        };

        Answer {
            text: format!(
                "The {} of {}{} is {:.2} cm.",
                op.label(),
                feature,
                scope,
                value
            ),
            value: Some(value),
        }
    }
}

impl QueryEngine for AggregateEngine {
    fn answer(&self, question: &str, dataset: &Dataset) -> Result<Answer> {
        let q = question.to_lowercase();
        debug!(question = %question, "answering");

        let op = Self::parse_operation(&q)
            .ok_or_else(|| Error::Query(format!("no recognizable operation in {:?}", question)))?;
        let features = Self::parse_features(&q);
        let species = Self::parse_species(&q);

        match op {
            Operation::Correlation => {
                let &[a, b] = features.as_slice() else {
                    return Err(Error::Query(
                        "correlation needs exactly two feature columns".into(),
                    ));
                };
                let r = stats::correlation(dataset.column(a), dataset.column(b));
                Ok(Answer {
                    text: format!("The correlation between {} and {} is {:.3}.", a, b, r),
                    value: Some(r),
                })
            }
            Operation::Count if features.is_empty() => {
                // "how many setosa are there" needs no feature column.
                let n = match species {
                    Some(s) => dataset.rows().iter().filter(|r| r.species == s).count(),
                    None => dataset.len(),
                };
                let scope = species.map(|s| format!(" {}", s)).unwrap_or_default();
                Ok(Answer {
                    text: format!("There are {}{} rows.", n, scope),
                    value: Some(n as f64),
                })
            }
            _ => {
                let Some(feature) = features.first().copied() else {
                    return Err(Error::Query(format!(
                        "no recognizable column in {:?}",
                        question
                    )));
                };
                Ok(Self::evaluate_single(op, feature, species, dataset))
            }
        }
    }
}
