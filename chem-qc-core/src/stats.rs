//! Statistics aggregation over the classified batch table
//!
//! Computes the pass/fail tallies, the per-parameter range report, the
//! descriptive table exported to the workbook, and the pairwise Pearson
//! correlation matrix. Every aggregate refuses an empty table with
//! [`QcError::EmptyDataset`] instead of producing NaN.
//!
//! Undefined quantities on a non-empty table (the standard deviation of a
//! single value, the correlation of a constant column) are reported as
//! `None`.

use crate::types::{BatchDataset, Parameter, QcError, QcStatus, Result};
use serde::Serialize;

/// Min/max/mean of one parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterRange {
    pub parameter: Parameter,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Descriptive statistics of one parameter (count, mean, std, min,
/// quartiles, max)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DescriptiveStats {
    pub parameter: Parameter,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1); `None` for a single value
    pub std_dev: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl DescriptiveStats {
    /// Row labels of the descriptive table, in export order
    pub const ROW_LABELS: [&'static str; 8] =
        ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    /// Values in [`Self::ROW_LABELS`] order
    pub fn rows(&self) -> [Option<f64>; 8] {
        [
            Some(self.count as f64),
            Some(self.mean),
            self.std_dev,
            Some(self.min),
            Some(self.q25),
            Some(self.median),
            Some(self.q75),
            Some(self.max),
        ]
    }
}

/// Square matrix of pairwise Pearson coefficients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    parameters: Vec<Parameter>,
    /// Row-major; `None` where a column has zero variance
    values: Vec<Option<f64>>,
}

impl CorrelationMatrix {
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn size(&self) -> usize {
        self.parameters.len()
    }

    /// Coefficient between the `row`-th and `col`-th parameters
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        let p = self.size();
        if row >= p || col >= p {
            return None;
        }
        self.values[row * p + col]
    }
}

/// Everything the reporter needs from one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total: usize,
    pub pass_count: usize,
    pub fail_count: usize,
    pub ranges: Vec<ParameterRange>,
    pub descriptive: Vec<DescriptiveStats>,
    pub correlation: CorrelationMatrix,
}

impl SummaryStats {
    /// Percentage of passing batches
    pub fn pass_rate(&self) -> f64 {
        percentage(self.pass_count, self.total)
    }

    /// Percentage of failing batches
    pub fn fail_rate(&self) -> f64 {
        percentage(self.fail_count, self.total)
    }

    pub fn range(&self, parameter: Parameter) -> Option<&ParameterRange> {
        self.ranges.iter().find(|r| r.parameter == parameter)
    }

    pub fn describe(&self, parameter: Parameter) -> Option<&DescriptiveStats> {
        self.descriptive.iter().find(|d| d.parameter == parameter)
    }

    pub fn mean(&self, parameter: Parameter) -> Option<f64> {
        self.range(parameter).map(|r| r.mean)
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    count as f64 / total as f64 * 100.0
}

/// Aggregate the classified table over [`Parameter::ANALYZED`]
pub fn summarize(dataset: &BatchDataset) -> Result<SummaryStats> {
    if dataset.is_empty() {
        return Err(QcError::EmptyDataset);
    }

    let pass_count = dataset.count_status(QcStatus::Pass);
    let fail_count = dataset.count_status(QcStatus::Fail);

    let mut ranges = Vec::with_capacity(Parameter::ANALYZED.len());
    let mut descriptive = Vec::with_capacity(Parameter::ANALYZED.len());
    for parameter in Parameter::ANALYZED {
        let column = dataset.column(parameter);
        ranges.push(parameter_range(parameter, &column)?);
        descriptive.push(describe(parameter, &column)?);
    }

    let correlation = correlation_matrix(dataset, &Parameter::ANALYZED)?;

    log::debug!(
        "Summarized {} batches: {} pass, {} fail",
        dataset.len(),
        pass_count,
        fail_count
    );

    Ok(SummaryStats {
        total: dataset.len(),
        pass_count,
        fail_count,
        ranges,
        descriptive,
        correlation,
    })
}

/// Min/max/mean of a column
pub fn parameter_range(parameter: Parameter, values: &[f64]) -> Result<ParameterRange> {
    if values.is_empty() {
        return Err(QcError::EmptyDataset);
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = mean(values).clamp(min, max);

    Ok(ParameterRange {
        parameter,
        min,
        max,
        mean,
    })
}

/// Full descriptive statistics of a column
pub fn describe(parameter: Parameter, values: &[f64]) -> Result<DescriptiveStats> {
    let range = parameter_range(parameter, values)?;

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    Ok(DescriptiveStats {
        parameter,
        count: values.len(),
        mean: range.mean,
        std_dev: sample_std_dev(values),
        min: range.min,
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: range.max,
    })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation with n - 1 degrees of freedom
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((ss / (n - 1) as f64).sqrt())
}

/// Quantile `q` of ascending `sorted`, interpolating linearly between the
/// two closest ranks
///
/// `sorted` must be non-empty.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    let value = sorted[lo] + (sorted[hi] - sorted[lo]) * frac;
    value.max(sorted[lo]).min(sorted[hi])
}

/// Pearson correlation of two equally long columns
///
/// `None` for fewer than two points, mismatched lengths, or zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len();
    if n < 2 || n != y.len() {
        return None;
    }
    let mx = mean(x);
    let my = mean(y);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denom = (sxx * syy).sqrt();
    if denom < 1e-300 {
        return None;
    }
    Some((sxy / denom).clamp(-1.0, 1.0))
}

/// Pairwise Pearson matrix over `parameters`
pub fn correlation_matrix(
    dataset: &BatchDataset,
    parameters: &[Parameter],
) -> Result<CorrelationMatrix> {
    if dataset.is_empty() {
        return Err(QcError::EmptyDataset);
    }

    let columns: Vec<Vec<f64>> = parameters.iter().map(|p| dataset.column(*p)).collect();
    let p = parameters.len();
    let mut values = vec![None; p * p];

    for i in 0..p {
        // diagonal is 1 only where the column actually varies
        values[i * p + i] = pearson(&columns[i], &columns[i]).map(|_| 1.0);
        for j in (i + 1)..p {
            let r = pearson(&columns[i], &columns[j]);
            values[i * p + j] = r;
            values[j * p + i] = r;
        }
    }

    Ok(CorrelationMatrix {
        parameters: parameters.to_vec(),
        values,
    })
}

/// One equal-width histogram bin
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Split `values` into `bins` equal-width bins spanning `[min, max]`
///
/// The last bin is closed on the right. A constant column is spread over
/// `[v - 0.5, v + 0.5]`. Returns no bins for empty input.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut result: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: lo + width * i as f64,
            upper: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for v in values {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        result[idx].count += 1;
    }
    result
}
