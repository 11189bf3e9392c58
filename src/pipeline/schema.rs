//! Column schema declarations
//!
//! A schema maps source positions in the CSV to named, typed columns.
//! Positions that are not declared are skipped during loading.

use serde::{Deserialize, Serialize};

/// Semantic type of a declared column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Float,
    Boolean,
    Text,
}

impl ColumnKind {
    /// Human readable name used in parse errors
    pub fn expected(&self) -> &'static str {
        match self {
            ColumnKind::Float => "float",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Text => "text",
        }
    }
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.expected())
    }
}

/// A single declared column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
    /// Zero-based field index in the source file
    pub position: usize,
}

impl ColumnSpec {
    pub fn new(name: &str, kind: ColumnKind, position: usize) -> Self {
        Self {
            name: name.to_string(),
            kind,
            position,
        }
    }
}

/// Ordered column declarations with a designated label column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub columns: Vec<ColumnSpec>,
    pub label: String,
}

/// IBM HR attrition layout. A `false` flag marks a field that is present in
/// the file but never loaded (constant columns).
const ATTRITION_COLUMNS: [(&str, ColumnKind, bool); 35] = [
    ("Age", ColumnKind::Float, true),
    ("Attrition", ColumnKind::Boolean, true),
    ("BusinessTravel", ColumnKind::Text, true),
    ("DailyRate", ColumnKind::Float, true),
    ("Department", ColumnKind::Text, true),
    ("DistanceFromHome", ColumnKind::Float, true),
    ("Education", ColumnKind::Float, true),
    ("EducationField", ColumnKind::Text, true),
    ("EmployeeCount", ColumnKind::Float, false),
    ("EmployeeNumber", ColumnKind::Float, true),
    ("EnvironmentSatisfaction", ColumnKind::Float, true),
    ("Gender", ColumnKind::Text, true),
    ("HourlyRate", ColumnKind::Float, true),
    ("JobInvolvement", ColumnKind::Float, true),
    ("JobLevel", ColumnKind::Float, true),
    ("JobRole", ColumnKind::Text, true),
    ("JobSatisfaction", ColumnKind::Float, true),
    ("MaritalStatus", ColumnKind::Text, true),
    ("MonthlyIncome", ColumnKind::Float, true),
    ("MonthlyRate", ColumnKind::Float, true),
    ("NumCompaniesWorked", ColumnKind::Float, true),
    ("Over18", ColumnKind::Text, false),
    ("OverTime", ColumnKind::Text, true),
    ("PercentSalaryHike", ColumnKind::Float, true),
    ("PerformanceRating", ColumnKind::Float, true),
    ("RelationshipSatisfaction", ColumnKind::Float, true),
    ("StandardHours", ColumnKind::Float, false),
    ("StockOptionLevel", ColumnKind::Float, true),
    ("TotalWorkingYears", ColumnKind::Float, true),
    ("TrainingTimesLastYear", ColumnKind::Float, true),
    ("WorkLifeBalance", ColumnKind::Float, true),
    ("YearsAtCompany", ColumnKind::Float, true),
    ("YearsInCurrentRole", ColumnKind::Float, true),
    ("YearsSinceLastPromotion", ColumnKind::Float, true),
    ("YearsWithCurrManager", ColumnKind::Float, true),
];

impl ColumnSchema {
    pub fn new(columns: Vec<ColumnSpec>, label: &str) -> Self {
        Self {
            columns,
            label: label.to_string(),
        }
    }

    /// The employee attrition schema: 35 source fields, 32 loaded.
    pub fn attrition() -> Self {
        let columns = ATTRITION_COLUMNS
            .iter()
            .enumerate()
            .filter(|(_, (_, _, loaded))| *loaded)
            .map(|(position, (name, kind, _))| ColumnSpec::new(name, *kind, position))
            .collect();
        Self::new(columns, "Attrition")
    }

    /// Names of every field in the attrition source file, loaded or not.
    pub fn attrition_header() -> Vec<&'static str> {
        ATTRITION_COLUMNS.iter().map(|(name, _, _)| *name).collect()
    }

    /// Use another declared column as the label
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    /// Drop the named columns. The label cannot be excluded.
    pub fn without(mut self, excluded: &[String]) -> Self {
        self.columns
            .retain(|c| c.name == self.label || !excluded.contains(&c.name));
        self
    }

    /// Number of fields a source row must have to satisfy this schema
    pub fn required_width(&self) -> usize {
        self.columns
            .iter()
            .map(|c| c.position + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn get(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Non-label columns of the given kind, in declaration order
    pub fn feature_names(&self, kind: ColumnKind) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.kind == kind && c.name != self.label)
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn numeric_features(&self) -> Vec<String> {
        self.feature_names(ColumnKind::Float)
    }

    pub fn text_features(&self) -> Vec<String> {
        self.feature_names(ColumnKind::Text)
    }
}
