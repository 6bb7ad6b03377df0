use ndarray::{Array2, ArrayView2};

use super::{layers::Dense, loss::LossFn};
use crate::{MlErr, Result, initialization::ParamGen, optimization::Optimizer};

/// A sequential model: information flows forward when computing an output and backward when
/// computing the *deltas* of its layers.
///
/// The model owns a flat parameter buffer, each layer reads its own contiguous slice of it.
#[derive(Clone, Debug)]
pub struct Sequential {
    layers: Vec<Dense>,
    params: Vec<f32>,
    grad: Vec<f32>,
}

impl Sequential {
    /// Creates a new `Sequential` with every parameter set to zero.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    ///
    /// # Returns
    /// A new `Sequential` instance.
    pub fn new<I>(layers: I) -> Self
    where
        I: IntoIterator<Item = Dense>,
    {
        let layers: Vec<Dense> = layers.into_iter().collect();
        let size = layers.iter().map(|layer| layer.size()).sum();

        Self {
            layers,
            params: vec![0.; size],
            grad: vec![0.; size],
        }
    }

    /// Returns the amount of parameters in the model.
    pub fn size(&self) -> usize {
        self.params.len()
    }

    pub fn params(&self) -> &[f32] {
        &self.params
    }

    pub fn input_size(&self) -> Option<usize> {
        self.layers.first().map(|layer| layer.dim().0)
    }

    pub fn output_size(&self) -> Option<usize> {
        self.layers.last().map(|layer| layer.dim().1)
    }

    /// Whether every parameter of the model is a finite number.
    pub fn is_finite(&self) -> bool {
        self.params.iter().all(|p| p.is_finite())
    }

    /// Overwrites every parameter with values drawn from a generator, in layer order.
    ///
    /// # Arguments
    /// * `param_gen` - The generator of the initial parameters.
    ///
    /// # Returns
    /// An error if the generator is exhausted before filling the model.
    pub fn init_params<G>(&mut self, param_gen: &mut G) -> Result<()>
    where
        G: ParamGen + ?Sized,
    {
        let size = self.size();
        let mut filled = 0;

        while filled < size {
            let sample = match param_gen.sample(size - filled) {
                Some(sample) if !sample.is_empty() => sample,
                _ => {
                    return Err(MlErr::SizeMismatch {
                        what: "generated parameters",
                        got: filled,
                        expected: size,
                    });
                }
            };

            self.params[filled..filled + sample.len()].copy_from_slice(&sample);
            filled += sample.len();
        }

        Ok(())
    }

    /// Makes a forward pass through the network without modifying it.
    ///
    /// # Arguments
    /// * `x` - The input data, one sample per row.
    ///
    /// # Returns
    /// The prediction for the given input or an error if occurred.
    pub fn predict(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let mut offset = 0;
        let mut a = x.to_owned();

        for layer in &self.layers {
            let params = slice_layer(&self.params, offset, layer.size())?;
            a = layer.infer(params, a.view())?;
            offset += layer.size();
        }

        Ok(a)
    }

    /// Makes a forward pass through the network, keeping the metadata needed for `backprop`.
    pub fn forward(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let mut offset = 0;
        let mut a = x.to_owned();

        for layer in self.layers.iter_mut() {
            let params = slice_layer(&self.params, offset, layer.size())?;
            a = layer.forward(params, a.view())?;
            offset += layer.size();
        }

        Ok(a)
    }

    /// Computes the gradient of the loss function with respect to the parameters of the model over
    /// the provided batches. **The parameters get updated** after each batch according to the
    /// optimization algorithm.
    ///
    /// Stops at the first batch whose loss is not a finite number and returns that loss.
    ///
    /// # Arguments
    /// * `optimizer` - The optimizer that dictates how to update the parameters.
    /// * `loss_fn` - The loss function.
    /// * `batches` - The batches of data.
    ///
    /// # Returns
    /// The average loss over the batches.
    pub fn backprop<'a, O, L, I>(
        &mut self,
        optimizer: &mut O,
        loss_fn: &L,
        batches: I,
    ) -> Result<f32>
    where
        O: Optimizer + ?Sized,
        L: LossFn + ?Sized,
        I: Iterator<Item = (ArrayView2<'a, f32>, ArrayView2<'a, f32>)>,
    {
        // NOTE: the epoch loss is approximated by averaging the loss of each batch while the
        // parameters are being updated, instead of forwarding the whole dataset again.
        let mut total_loss = 0.0;
        let mut num_batches = 0;

        for (x, y) in batches {
            let y_pred = self.forward(x)?;
            if y_pred.dim() != y.dim() {
                return Err(MlErr::SizeMismatch {
                    what: "expected outputs",
                    got: y.ncols(),
                    expected: y_pred.ncols(),
                });
            }

            let loss = loss_fn.loss(y_pred.view(), y);
            if !loss.is_finite() {
                return Ok(loss);
            }

            total_loss += loss;
            num_batches += 1;

            let Self {
                layers,
                params,
                grad,
            } = self;

            let mut d = loss_fn.loss_prime(y_pred.view(), y);
            let mut end = params.len();

            for layer in layers.iter_mut().rev() {
                let start = end - layer.size();
                d = layer.backward(&params[start..end], &mut grad[start..end], d)?;
                end = start;
            }

            optimizer.update_params(&grad[..], &mut params[..])?;
        }

        if num_batches == 0 {
            return Err(MlErr::EmptyDataset);
        }

        Ok(total_loss / num_batches as f32)
    }
}

fn slice_layer(params: &[f32], offset: usize, size: usize) -> Result<&[f32]> {
    params
        .get(offset..offset + size)
        .ok_or(MlErr::SizeMismatch {
            what: "model parameters",
            got: params.len(),
            expected: offset + size,
        })
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::{
        arch::{activations::ActFn, loss::Mse},
        initialization::ConstParamGen,
        optimization::GradientDescent,
    };

    fn two_layers() -> Sequential {
        Sequential::new([
            Dense::new((2, 3), Some(ActFn::relu())),
            Dense::new((3, 1), None),
        ])
    }

    #[test]
    fn sizes_follow_the_layers() {
        let model = two_layers();

        assert_eq!(model.size(), 9 + 4);
        assert_eq!(model.input_size(), Some(2));
        assert_eq!(model.output_size(), Some(1));
    }

    #[test]
    fn init_params_fills_the_whole_buffer() {
        let mut model = two_layers();

        model.init_params(&mut ConstParamGen::new(0.5, 13)).unwrap();
        assert!(model.params().iter().all(|&p| p == 0.5));

        let err = model.init_params(&mut ConstParamGen::new(0.5, 4));
        assert!(matches!(err, Err(MlErr::SizeMismatch { got: 4, .. })));
    }

    #[test]
    fn predict_and_forward_agree() {
        let mut model = two_layers();
        model.init_params(&mut ConstParamGen::new(1., 13)).unwrap();
        let x: Array2<f32> = array![[1., 2.], [-5., 1.]];

        let predicted = model.predict(x.view()).unwrap();
        let forwarded = model.forward(x.view()).unwrap();

        // hidden = relu([4, 4, 4]) and relu([-3, -3, -3]) -> out = 13 and 1
        let expected: Array2<f32> = array![[13.], [1.]];
        assert_eq!(predicted, expected);
        assert_eq!(forwarded, expected);
    }

    #[test]
    fn backprop_reduces_the_loss() {
        let mut model = two_layers();
        model.init_params(&mut ConstParamGen::new(0.1, 13)).unwrap();
        let x: Array2<f32> = array![[0., 1.], [1., 0.], [1., 1.]];
        let y: Array2<f32> = array![[1.], [1.], [2.]];
        let mut optimizer = GradientDescent::new(0.05);

        let first = model
            .backprop(&mut optimizer, &Mse, [(x.view(), y.view())].into_iter())
            .unwrap();

        let mut last = first;
        for _ in 0..50 {
            last = model
                .backprop(&mut optimizer, &Mse, [(x.view(), y.view())].into_iter())
                .unwrap();
        }

        assert!(last < first, "{last} should be lower than {first}");
    }

    #[test]
    fn mismatched_outputs_fail() {
        let mut model = two_layers();
        let x: Array2<f32> = array![[0., 1.]];
        let y: Array2<f32> = array![[1., 2.]];
        let mut optimizer = GradientDescent::new(0.05);

        let res = model.backprop(&mut optimizer, &Mse, [(x.view(), y.view())].into_iter());
        assert!(matches!(res, Err(MlErr::SizeMismatch { got: 2, .. })));
    }
}
