//! Text and structured classification reports.

use std::fmt;

use serde::Serialize;

use crate::confusion::ConfusionMatrix;
use crate::error::ForestError;

/// Metrics for one named class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Averaged precision, recall and F1 over the reported classes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageRow {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class precision/recall/F1/support plus accuracy and averages.
///
/// Only classes that occur among the true or the predicted labels get a
/// row. `Display` renders the familiar fixed-width table; the float
/// precision defaults to two digits and follows the formatter's precision
/// when one is given (`{report:.3}`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub rows: Vec<ReportRow>,
    pub accuracy: f64,
    pub macro_avg: AverageRow,
    pub weighted_avg: AverageRow,
    pub total_support: usize,
}

impl ClassificationReport {
    /// Build a report from a confusion matrix and one name per class index.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::ClassNameMismatch`] when `class_names.len()`
    /// differs from the matrix's class count.
    pub fn from_confusion(
        confusion: &ConfusionMatrix,
        class_names: &[String],
    ) -> Result<Self, ForestError> {
        if class_names.len() != confusion.n_classes() {
            return Err(ForestError::ClassNameMismatch {
                n_classes: confusion.n_classes(),
                n_names: class_names.len(),
            });
        }

        let rows: Vec<ReportRow> = confusion
            .class_metrics()
            .into_iter()
            .filter(|m| m.support > 0 || m.predicted > 0)
            .map(|m| ReportRow {
                label: class_names[m.class].clone(),
                precision: m.precision,
                recall: m.recall,
                f1: m.f1,
                support: m.support,
            })
            .collect();

        let total_support = confusion.total();
        let n_rows = rows.len().max(1) as f64;
        let macro_avg = AverageRow {
            precision: rows.iter().map(|r| r.precision).sum::<f64>() / n_rows,
            recall: rows.iter().map(|r| r.recall).sum::<f64>() / n_rows,
            f1: rows.iter().map(|r| r.f1).sum::<f64>() / n_rows,
            support: total_support,
        };
        let weighted = |metric: fn(&ReportRow) -> f64| -> f64 {
            if total_support == 0 {
                return 0.0;
            }
            rows.iter()
                .map(|r| metric(r) * r.support as f64)
                .sum::<f64>()
                / total_support as f64
        };
        let weighted_avg = AverageRow {
            precision: weighted(|r| r.precision),
            recall: weighted(|r| r.recall),
            f1: weighted(|r| r.f1),
            support: total_support,
        };

        Ok(Self {
            accuracy: confusion.accuracy(),
            rows,
            macro_avg,
            weighted_avg,
            total_support,
        })
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const WEIGHTED: &str = "weighted avg";
        let digits = f.precision().unwrap_or(2);
        let width = self
            .rows
            .iter()
            .map(|r| r.label.chars().count())
            .chain([WEIGHTED.len(), digits])
            .max()
            .unwrap_or(WEIGHTED.len());

        write!(f, "{:>width$} ", "")?;
        for header in ["precision", "recall", "f1-score", "support"] {
            write!(f, " {header:>9}")?;
        }
        writeln!(f)?;
        writeln!(f)?;

        for row in &self.rows {
            write_row(f, &row.label, [row.precision, row.recall, row.f1], row.support, width, digits)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.digits$} {:>9}",
            "accuracy", "", "", self.accuracy, self.total_support
        )?;
        for (label, avg) in [("macro avg", &self.macro_avg), (WEIGHTED, &self.weighted_avg)] {
            write_row(f, label, [avg.precision, avg.recall, avg.f1], avg.support, width, digits)?;
        }
        Ok(())
    }
}

fn write_row(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    [precision, recall, f1]: [f64; 3],
    support: usize,
    width: usize,
    digits: usize,
) -> fmt::Result {
    writeln!(
        f,
        "{label:>width$}  {precision:>9.digits$} {recall:>9.digits$} {f1:>9.digits$} {support:>9}"
    )
}
