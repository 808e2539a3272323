use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use super::LossFn;
use crate::{MlErr, Result};

/// Softmax cross-entropy over logits and sparse class labels.
#[derive(Default, Clone, Copy)]
pub struct CrossEntropy;

impl CrossEntropy {
    /// Returns a new `CrossEntropy`.
    pub fn new() -> Self {
        Self
    }
}

impl LossFn for CrossEntropy {
    fn loss(&self, y_pred: ArrayView2<f32>, labels: &[u8]) -> Result<f32> {
        check(y_pred, labels)?;

        let total: f32 = y_pred
            .rows()
            .into_iter()
            .zip(labels)
            .map(|(row, &label)| log_sum_exp(row) - row[label as usize])
            .sum();

        Ok(total / labels.len().max(1) as f32)
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, labels: &[u8]) -> Result<Array2<f32>> {
        check(y_pred, labels)?;

        let n = labels.len().max(1) as f32;
        let mut d = y_pred.to_owned();

        for (mut row, &label) in d.rows_mut().into_iter().zip(labels) {
            let lse = log_sum_exp(row.view());
            row.mapv_inplace(|z| (z - lse).exp() / n);
            row[label as usize] -= 1.0 / n;
        }

        Ok(d)
    }
}

/// Fraction of rows whose largest logit is at the labeled class.
pub fn accuracy(y_pred: ArrayView2<f32>, labels: &[u8]) -> Result<f32> {
    check(y_pred, labels)?;

    if labels.is_empty() {
        return Ok(0.0);
    }

    let hits = y_pred
        .axis_iter(Axis(0))
        .zip(labels)
        .filter(|(row, label)| argmax(*row) == **label as usize)
        .count();

    Ok(hits as f32 / labels.len() as f32)
}

fn check(y_pred: ArrayView2<f32>, labels: &[u8]) -> Result<()> {
    if y_pred.nrows() != labels.len() {
        return Err(MlErr::SizeMismatch {
            what: "predictions and labels",
            got: labels.len(),
            expected: y_pred.nrows(),
        });
    }

    let classes = y_pred.ncols();
    match labels.iter().find(|&&label| label as usize >= classes) {
        Some(&label) => Err(MlErr::LabelOutOfRange { label, classes }),
        None => Ok(()),
    }
}

fn log_sum_exp(row: ArrayView1<f32>) -> f32 {
    let max = row.fold(f32::NEG_INFINITY, |m, &z| m.max(z));
    max + row.mapv(|z| (z - max).exp()).sum().ln()
}

fn argmax(row: ArrayView1<f32>) -> usize {
    row.iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |best, (i, &z)| {
            if z > best.1 { (i, z) } else { best }
        })
        .0
}
