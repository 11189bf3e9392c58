//! Feature pipeline: numeric concatenation, text featurization, normalization
//!
//! The fitted pipeline owns a [`FeatureLayout`] naming every slot of the
//! feature vector. Weights and permutation results are indexed by the same
//! layout, so a text column that expands into many slots keeps a name for
//! each of them.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::{AnalysisError, Result};
use super::matrix::{hstack, FeatureMatrix};
use super::normalize::{Normalizer, NormalizerKind};
use super::schema::ColumnSchema;
use super::text::{concatenate_text, TextFeaturizer};

/// Name prefix of text-derived slots and of the merged text group
pub const TEXT_FEATURE_PREFIX: &str = "Text";

/// Which sub-vectors make up the feature vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineVariant {
    Numeric,
    Text,
    #[default]
    Combined,
}

impl PipelineVariant {
    fn uses_numeric(&self) -> bool {
        matches!(self, PipelineVariant::Numeric | PipelineVariant::Combined)
    }

    fn uses_text(&self) -> bool {
        matches!(self, PipelineVariant::Text | PipelineVariant::Combined)
    }
}

impl std::fmt::Display for PipelineVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineVariant::Numeric => write!(f, "numeric"),
            PipelineVariant::Text => write!(f, "text"),
            PipelineVariant::Combined => write!(f, "combined"),
        }
    }
}

impl std::str::FromStr for PipelineVariant {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "numeric" => Ok(PipelineVariant::Numeric),
            "text" => Ok(PipelineVariant::Text),
            "combined" => Ok(PipelineVariant::Combined),
            _ => Err(format!(
                "Unknown pipeline variant: '{}'. Use 'numeric', 'text' or 'combined'.",
                s
            )),
        }
    }
}

/// Where a feature slot comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "columns", rename_all = "lowercase")]
pub enum FeatureSource {
    /// A single numeric column
    Column(String),
    /// The merged text of these columns
    Text(Vec<String>),
}

/// One position of the feature vector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureSlot {
    pub name: String,
    pub source: FeatureSource,
}

/// A set of slots permuted together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureGroup {
    pub name: String,
    pub indices: Vec<usize>,
}

/// Ordered description of the feature vector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeatureLayout {
    slots: Vec<FeatureSlot>,
}

impl FeatureLayout {
    pub fn new(slots: Vec<FeatureSlot>) -> Self {
        Self { slots }
    }

    /// Layout of plain numeric columns, one slot each
    pub fn numeric(names: &[String]) -> Self {
        Self::new(
            names
                .iter()
                .map(|n| FeatureSlot {
                    name: n.clone(),
                    source: FeatureSource::Column(n.clone()),
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[FeatureSlot] {
        &self.slots
    }

    pub fn names(&self) -> Vec<String> {
        self.slots.iter().map(|s| s.name.clone()).collect()
    }

    /// One group per slot
    pub fn slot_groups(&self) -> Vec<FeatureGroup> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, s)| FeatureGroup {
                name: s.name.clone(),
                indices: vec![i],
            })
            .collect()
    }

    /// One group per source: each numeric column, plus one for all text slots.
    /// Slots are grouped by their source, not by display name.
    pub fn column_groups(&self) -> Vec<FeatureGroup> {
        let mut groups: Vec<(&FeatureSource, FeatureGroup)> = Vec::new();
        for (i, slot) in self.slots.iter().enumerate() {
            match groups.iter_mut().find(|(source, _)| *source == &slot.source) {
                Some((_, group)) => group.indices.push(i),
                None => {
                    let name = match &slot.source {
                        FeatureSource::Column(c) => c.clone(),
                        FeatureSource::Text(_) => TEXT_FEATURE_PREFIX.to_string(),
                    };
                    groups.push((
                        &slot.source,
                        FeatureGroup {
                            name,
                            indices: vec![i],
                        },
                    ));
                }
            }
        }
        groups.into_iter().map(|(_, group)| group).collect()
    }
}

/// Unfitted pipeline description
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    pub variant: PipelineVariant,
    pub normalizer: NormalizerKind,
    pub numeric_columns: Vec<String>,
    pub text_columns: Vec<String>,
}

impl FeaturePipeline {
    pub fn from_schema(
        schema: &ColumnSchema,
        variant: PipelineVariant,
        normalizer: NormalizerKind,
    ) -> Self {
        Self {
            variant,
            normalizer,
            numeric_columns: if variant.uses_numeric() {
                schema.numeric_features()
            } else {
                Vec::new()
            },
            text_columns: if variant.uses_text() {
                schema.text_features()
            } else {
                Vec::new()
            },
        }
    }

    /// Learn the text vocabulary and normalization statistics from `train`
    pub fn fit(&self, train: &DataFrame) -> Result<FittedPipeline> {
        if self.variant == PipelineVariant::Text && self.text_columns.is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "text pipeline selected but the schema has no text columns".to_string(),
            ));
        }
        if self.variant == PipelineVariant::Numeric && self.numeric_columns.is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "numeric pipeline selected but the schema has no numeric columns".to_string(),
            ));
        }

        let featurizer = if self.text_columns.is_empty() {
            None
        } else {
            let documents = concatenate_text(train, &self.text_columns)?;
            Some(TextFeaturizer::fit(&documents))
        };

        let mut slots: Vec<FeatureSlot> = FeatureLayout::numeric(&self.numeric_columns)
            .slots()
            .to_vec();
        if let Some(featurizer) = &featurizer {
            slots.extend(
                featurizer
                    .feature_names(TEXT_FEATURE_PREFIX)
                    .into_iter()
                    .map(|name| FeatureSlot {
                        name,
                        source: FeatureSource::Text(self.text_columns.clone()),
                    }),
            );
        }

        if slots.is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "feature pipeline produced no features".to_string(),
            ));
        }

        let mut fitted = FittedPipeline {
            numeric_columns: self.numeric_columns.clone(),
            text_columns: self.text_columns.clone(),
            featurizer,
            normalizer: None,
            layout: FeatureLayout::new(slots),
        };

        let raw = fitted.raw_features(train)?;
        fitted.normalizer = Some(Normalizer::fit(self.normalizer, &raw));

        log::debug!(
            "Feature layout: {} numeric slot(s), {} text slot(s)",
            fitted.numeric_columns.len(),
            fitted.layout.len() - fitted.numeric_columns.len()
        );

        Ok(fitted)
    }
}

/// Pipeline with learned vocabulary and normalization statistics
#[derive(Debug, Clone)]
pub struct FittedPipeline {
    numeric_columns: Vec<String>,
    text_columns: Vec<String>,
    featurizer: Option<TextFeaturizer>,
    normalizer: Option<Normalizer>,
    layout: FeatureLayout,
}

impl FittedPipeline {
    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    pub fn normalizer(&self) -> Option<&Normalizer> {
        self.normalizer.as_ref()
    }

    /// Features before normalization
    fn raw_features(&self, df: &DataFrame) -> Result<FeatureMatrix> {
        let mut blocks = Vec::with_capacity(2);
        if !self.numeric_columns.is_empty() {
            blocks.push(concatenate_numeric(df, &self.numeric_columns)?);
        }
        if let Some(featurizer) = &self.featurizer {
            let documents = concatenate_text(df, &self.text_columns)?;
            blocks.push(featurizer.transform(&documents));
        }
        hstack(&blocks)
    }

    /// Normalized feature matrix in layout order
    pub fn transform(&self, df: &DataFrame) -> Result<FeatureMatrix> {
        let raw = self.raw_features(df)?;
        match &self.normalizer {
            Some(normalizer) => normalizer.transform(&raw),
            None => Ok(raw),
        }
    }
}

/// Stack numeric columns into a matrix, one column per name
pub fn concatenate_numeric(df: &DataFrame, columns: &[String]) -> Result<FeatureMatrix> {
    let mut matrix = FeatureMatrix::zeros((df.height(), columns.len()));

    for (c, name) in columns.iter().enumerate() {
        let column = df
            .column(name)
            .map_err(|_| AnalysisError::ColumnNotFound(name.clone()))?
            .cast(&DataType::Float64)?;
        for (r, value) in column.f64()?.into_iter().enumerate() {
            let value = value.ok_or_else(|| AnalysisError::Parse {
                row: r + 1,
                column: name.clone(),
                value: String::new(),
                expected: "float",
            })?;
            matrix[[r, c]] = value;
        }
    }

    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::schema::{ColumnKind, ColumnSpec};

    fn small_schema() -> ColumnSchema {
        ColumnSchema::new(
            vec![
                ColumnSpec::new("label", ColumnKind::Boolean, 0),
                ColumnSpec::new("age", ColumnKind::Float, 1),
                ColumnSpec::new("dept", ColumnKind::Text, 2),
            ],
            "label",
        )
    }

    fn small_frame() -> DataFrame {
        df! {
            "label" => [true, false, true, false],
            "age" => [20.0f64, 40.0, 30.0, 50.0],
            "dept" => ["Sales", "HR", "Sales", "Research"],
        }
        .unwrap()
    }

    #[test]
    fn test_combined_layout_puts_numeric_first() {
        let pipeline =
            FeaturePipeline::from_schema(&small_schema(), PipelineVariant::Combined, NormalizerKind::MinMax);
        let fitted = pipeline.fit(&small_frame()).unwrap();
        let names = fitted.layout().names();
        assert_eq!(names[0], "age");
        assert!(names[1..].iter().all(|n| n.starts_with("Text.")));
        assert!(names.contains(&"Text.word:sales".to_string()));
    }

    #[test]
    fn test_transform_width_matches_layout() {
        let pipeline =
            FeaturePipeline::from_schema(&small_schema(), PipelineVariant::Combined, NormalizerKind::MinMax);
        let fitted = pipeline.fit(&small_frame()).unwrap();
        let features = fitted.transform(&small_frame()).unwrap();
        assert_eq!(features.ncols(), fitted.layout().len());
        assert_eq!(features.nrows(), 4);
        assert!((features[[3, 0]] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_numeric_variant_has_no_text() {
        let pipeline =
            FeaturePipeline::from_schema(&small_schema(), PipelineVariant::Numeric, NormalizerKind::MinMax);
        let fitted = pipeline.fit(&small_frame()).unwrap();
        assert_eq!(fitted.layout().names(), vec!["age"]);
    }

    #[test]
    fn test_column_groups_merge_text_slots() {
        let pipeline =
            FeaturePipeline::from_schema(&small_schema(), PipelineVariant::Combined, NormalizerKind::MinMax);
        let fitted = pipeline.fit(&small_frame()).unwrap();
        let groups = fitted.layout().column_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "age");
        assert_eq!(groups[0].indices, vec![0]);
        assert_eq!(groups[1].name, TEXT_FEATURE_PREFIX);
        assert_eq!(groups[1].indices.len(), fitted.layout().len() - 1);
    }

    #[test]
    fn test_column_named_like_text_group_stays_separate() {
        let mut slots = FeatureLayout::numeric(&["age".to_string(), "Text".to_string()])
            .slots()
            .to_vec();
        let text_source = FeatureSource::Text(vec!["dept".to_string()]);
        for term in ["Text.word:hr", "Text.word:sales"] {
            slots.push(FeatureSlot {
                name: term.to_string(),
                source: text_source.clone(),
            });
        }
        let groups = FeatureLayout::new(slots).column_groups();

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[1].name, "Text");
        assert_eq!(groups[1].indices, vec![1]);
        assert_eq!(groups[2].name, TEXT_FEATURE_PREFIX);
        assert_eq!(groups[2].indices, vec![2, 3]);
    }

    #[test]
    fn test_text_variant_without_text_columns_fails() {
        let schema = ColumnSchema::new(
            vec![
                ColumnSpec::new("label", ColumnKind::Boolean, 0),
                ColumnSpec::new("age", ColumnKind::Float, 1),
            ],
            "label",
        );
        let pipeline =
            FeaturePipeline::from_schema(&schema, PipelineVariant::Text, NormalizerKind::MinMax);
        assert!(matches!(
            pipeline.fit(&small_frame()),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_concatenate_numeric_missing_column() {
        let err = concatenate_numeric(&small_frame(), &["salary".to_string()]).unwrap_err();
        assert!(matches!(err, AnalysisError::ColumnNotFound(name) if name == "salary"));
    }
}
