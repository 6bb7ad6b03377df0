use std::num::NonZeroUsize;

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use rand::{Rng, seq::SliceRandom};

use crate::{MlErr, Result};

/// An in-memory supervised dataset.
///
/// Every row holds `x_size` input values followed by `y_size` expected output values.
#[derive(Debug, Clone)]
pub struct Dataset {
    x_size: usize,
    y_size: usize,
    data: Array2<f32>,
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Arguments
    /// * `data` - The samples in row-major order, inputs first and then outputs.
    /// * `x_size` - The amount of input values per row.
    /// * `y_size` - The amount of output values per row.
    ///
    /// # Returns
    /// A new `Dataset` or an error if `data` can't be split in whole rows.
    pub fn new(data: Vec<f32>, x_size: usize, y_size: usize) -> Result<Self> {
        if x_size == 0 || y_size == 0 {
            return Err(MlErr::InvalidShape(format!(
                "rows need at least one input and one output, got x_size={x_size} y_size={y_size}"
            )));
        }

        if data.is_empty() {
            return Err(MlErr::EmptyDataset);
        }

        let row = x_size + y_size;
        if data.len() % row != 0 {
            return Err(MlErr::InvalidShape(format!(
                "the data length ({}) is not divisible by the row size ({row})",
                data.len()
            )));
        }

        let data = Array2::from_shape_vec((data.len() / row, row), data)?;
        Ok(Self {
            x_size,
            y_size,
            data,
        })
    }

    /// Returns the amount of samples.
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn x_size(&self) -> usize {
        self.x_size
    }

    pub fn y_size(&self) -> usize {
        self.y_size
    }

    /// Returns the inputs and expected outputs of the `i`-th sample.
    pub fn sample(&self, i: usize) -> Option<(ArrayView1<'_, f32>, ArrayView1<'_, f32>)> {
        if i >= self.len() {
            return None;
        }

        let (x, y) = self.data.row(i).split_at(Axis(0), self.x_size);
        Some((x, y))
    }

    /// Returns a view of every input and every expected output.
    pub fn xy(&self) -> (ArrayView2<'_, f32>, ArrayView2<'_, f32>) {
        self.data.view().split_at(Axis(1), self.x_size)
    }

    /// Randomly permutes the rows of the dataset.
    ///
    /// # Arguments
    /// * `rng` - The random number generator driving the permutation.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(rng);
        self.data = self.data.select(Axis(0), &order);
    }

    /// Splits the dataset in consecutive batches, the last one may be smaller.
    ///
    /// # Arguments
    /// * `batch_size` - The maximum amount of rows per batch.
    ///
    /// # Returns
    /// An iterator of `(x, y)` batch views.
    pub fn batches(
        &self,
        batch_size: NonZeroUsize,
    ) -> impl Iterator<Item = (ArrayView2<'_, f32>, ArrayView2<'_, f32>)> {
        let x_size = self.x_size;

        self.data
            .axis_chunks_iter(Axis(0), batch_size.get())
            .map(move |batch| batch.split_at(Axis(1), x_size))
    }
}
