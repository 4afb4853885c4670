//! Single-layer LSTM regression.
//!
//! The cell follows the usual gate formulation over a scalar input sequence:
//!
//! - **input gate** `i = sigmoid(Wi x + Ui h + bi)`
//! - **forget gate** `f = sigmoid(Wf x + Uf h + bf)`
//! - **cell gate** `g = tanh(Wg x + Ug h + bg)`
//! - **output gate** `o = sigmoid(Wo x + Uo h + bo)`
//!
//! with state updates `c' = f * c + i * g` and `h' = o * tanh(c')`. Both
//! states start at zero and a linear head projects the final hidden state to
//! one output value. Training runs backpropagation through time for a single
//! (window, target) pair at a time, with Adam applying the update.
//!
//! ## Example
//!
//! ```rust
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use recurrent::Lstm;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let lstm = Lstm::new(8, &mut rng).unwrap();
//! let y = lstm.predict(&[0.1, 0.4, 0.3]);
//! assert!(y.is_finite());
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Parameters of one gate: input weights, recurrent weights and bias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Gate {
    /// One weight per hidden unit.
    w_x: Vec<f64>,
    /// Recurrent weights, `hidden x hidden`, row-major by destination unit.
    w_h: Vec<f64>,
    b: Vec<f64>,
}

impl Gate {
    /// Uniform initialization in `[-1/sqrt(hidden), 1/sqrt(hidden)]`.
    fn init(hidden: usize, rng: &mut impl Rng) -> Self {
        let bound = 1.0 / (hidden as f64).sqrt();
        let mut sample = |n: usize| -> Vec<f64> {
            (0..n).map(|_| rng.gen_range(-bound..bound)).collect()
        };
        Self {
            w_x: sample(hidden),
            w_h: sample(hidden * hidden),
            b: sample(hidden),
        }
    }

    fn zeros(hidden: usize) -> Self {
        Self {
            w_x: vec![0.0; hidden],
            w_h: vec![0.0; hidden * hidden],
            b: vec![0.0; hidden],
        }
    }
}

/// Activations recorded at one timestep, kept for backpropagation.
struct StepCache {
    x: f64,
    h_prev: Vec<f64>,
    c_prev: Vec<f64>,
    i: Vec<f64>,
    f: Vec<f64>,
    g: Vec<f64>,
    o: Vec<f64>,
    c: Vec<f64>,
    tanh_c: Vec<f64>,
    h: Vec<f64>,
}

/// LSTM cell with a scalar linear output head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lstm {
    hidden: usize,
    input_gate: Gate,
    forget_gate: Gate,
    cell_gate: Gate,
    output_gate: Gate,
    w_out: Vec<f64>,
    b_out: f64,
}

impl Lstm {
    /// Creates a randomly initialized cell with `hidden` units.
    pub fn new(hidden: usize, rng: &mut impl Rng) -> Result<Self> {
        if hidden == 0 {
            return Err(ModelError::InvalidParameter {
                name: "hidden".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        let bound = 1.0 / (hidden as f64).sqrt();
        Ok(Self {
            hidden,
            input_gate: Gate::init(hidden, rng),
            forget_gate: Gate::init(hidden, rng),
            cell_gate: Gate::init(hidden, rng),
            output_gate: Gate::init(hidden, rng),
            w_out: (0..hidden).map(|_| rng.gen_range(-bound..bound)).collect(),
            b_out: rng.gen_range(-bound..bound),
        })
    }

    pub fn hidden(&self) -> usize {
        self.hidden
    }

    /// Runs the window through the cell and projects the last hidden state.
    pub fn predict(&self, window: &[f64]) -> f64 {
        let mut h = vec![0.0; self.hidden];
        let mut c = vec![0.0; self.hidden];
        for &x in window {
            let cache = self.step(x, &h, &c);
            h = cache.h;
            c = cache.c;
        }
        self.project(&h)
    }

    /// One timestep of the cell, returning every intermediate activation.
    fn step(&self, x: f64, h: &[f64], c: &[f64]) -> StepCache {
        let n = self.hidden;
        let mut i_act = vec![0.0; n];
        let mut f_act = vec![0.0; n];
        let mut g_act = vec![0.0; n];
        let mut o_act = vec![0.0; n];
        let mut c_new = vec![0.0; n];
        let mut tanh_c = vec![0.0; n];
        let mut h_new = vec![0.0; n];

        for j in 0..n {
            let mut zi = self.input_gate.w_x[j] * x + self.input_gate.b[j];
            let mut zf = self.forget_gate.w_x[j] * x + self.forget_gate.b[j];
            let mut zg = self.cell_gate.w_x[j] * x + self.cell_gate.b[j];
            let mut zo = self.output_gate.w_x[j] * x + self.output_gate.b[j];
            let row = j * n;
            for (k, &hk) in h.iter().enumerate() {
                zi += self.input_gate.w_h[row + k] * hk;
                zf += self.forget_gate.w_h[row + k] * hk;
                zg += self.cell_gate.w_h[row + k] * hk;
                zo += self.output_gate.w_h[row + k] * hk;
            }
            i_act[j] = sigmoid(zi);
            f_act[j] = sigmoid(zf);
            g_act[j] = zg.tanh();
            o_act[j] = sigmoid(zo);
            c_new[j] = f_act[j] * c[j] + i_act[j] * g_act[j];
            tanh_c[j] = c_new[j].tanh();
            h_new[j] = o_act[j] * tanh_c[j];
        }

        StepCache {
            x,
            h_prev: h.to_vec(),
            c_prev: c.to_vec(),
            i: i_act,
            f: f_act,
            g: g_act,
            o: o_act,
            c: c_new,
            tanh_c,
            h: h_new,
        }
    }

    fn project(&self, h: &[f64]) -> f64 {
        self.w_out.iter().zip(h).map(|(w, v)| w * v).sum::<f64>() + self.b_out
    }

    /// Forward pass keeping per-step activations for the backward pass.
    fn forward_cached(&self, window: &[f64]) -> (Vec<StepCache>, f64) {
        let mut h = vec![0.0; self.hidden];
        let mut c = vec![0.0; self.hidden];
        let mut caches = Vec::with_capacity(window.len());
        for &x in window {
            let cache = self.step(x, &h, &c);
            h = cache.h.clone();
            c = cache.c.clone();
            caches.push(cache);
        }
        let output = self.project(&h);
        (caches, output)
    }

    /// Backpropagation through time. `d_out` is the loss gradient at the
    /// output head.
    fn backward(&self, caches: &[StepCache], d_out: f64) -> Gradients {
        let n = self.hidden;
        let mut grads = Gradients::zeros(n);

        let last_h = match caches.last() {
            Some(cache) => &cache.h,
            None => {
                grads.b_out = d_out;
                return grads;
            }
        };

        for j in 0..n {
            grads.w_out[j] = d_out * last_h[j];
        }
        grads.b_out = d_out;

        let mut dh: Vec<f64> = self.w_out.iter().map(|w| w * d_out).collect();
        let mut dc = vec![0.0; n];
        let mut dzi = vec![0.0; n];
        let mut dzf = vec![0.0; n];
        let mut dzg = vec![0.0; n];
        let mut dzo = vec![0.0; n];

        for cache in caches.iter().rev() {
            for j in 0..n {
                let tanh_c = cache.tanh_c[j];
                let d_o = dh[j] * tanh_c;
                let d_c = dc[j] + dh[j] * cache.o[j] * (1.0 - tanh_c * tanh_c);
                let d_i = d_c * cache.g[j];
                let d_g = d_c * cache.i[j];
                let d_f = d_c * cache.c_prev[j];
                // Cell-state gradient carried to the previous timestep.
                dc[j] = d_c * cache.f[j];

                dzi[j] = d_i * cache.i[j] * (1.0 - cache.i[j]);
                dzf[j] = d_f * cache.f[j] * (1.0 - cache.f[j]);
                dzg[j] = d_g * (1.0 - cache.g[j] * cache.g[j]);
                dzo[j] = d_o * cache.o[j] * (1.0 - cache.o[j]);
            }

            for j in 0..n {
                grads.input_gate.w_x[j] += dzi[j] * cache.x;
                grads.forget_gate.w_x[j] += dzf[j] * cache.x;
                grads.cell_gate.w_x[j] += dzg[j] * cache.x;
                grads.output_gate.w_x[j] += dzo[j] * cache.x;
                grads.input_gate.b[j] += dzi[j];
                grads.forget_gate.b[j] += dzf[j];
                grads.cell_gate.b[j] += dzg[j];
                grads.output_gate.b[j] += dzo[j];
                let row = j * n;
                for (k, &hk) in cache.h_prev.iter().enumerate() {
                    grads.input_gate.w_h[row + k] += dzi[j] * hk;
                    grads.forget_gate.w_h[row + k] += dzf[j] * hk;
                    grads.cell_gate.w_h[row + k] += dzg[j] * hk;
                    grads.output_gate.w_h[row + k] += dzo[j] * hk;
                }
            }

            let mut dh_prev = vec![0.0; n];
            for (k, slot) in dh_prev.iter_mut().enumerate() {
                let mut acc = 0.0;
                for j in 0..n {
                    let row = j * n;
                    acc += self.input_gate.w_h[row + k] * dzi[j]
                        + self.forget_gate.w_h[row + k] * dzf[j]
                        + self.cell_gate.w_h[row + k] * dzg[j]
                        + self.output_gate.w_h[row + k] * dzo[j];
                }
                *slot = acc;
            }
            dh = dh_prev;
        }

        grads
    }

    /// One training step on a single (window, target) pair under squared
    /// error. Returns the loss before the update.
    pub(crate) fn train_pair(&mut self, window: &[f64], target: f64, opt: &mut Adam) -> f64 {
        let (caches, output) = self.forward_cached(window);
        let err = output - target;
        let grads = self.backward(&caches, 2.0 * err);
        opt.step(self, &grads);
        err * err
    }
}

/// Loss gradients for every LSTM parameter, shaped like the model itself.
pub(crate) struct Gradients {
    input_gate: Gate,
    forget_gate: Gate,
    cell_gate: Gate,
    output_gate: Gate,
    w_out: Vec<f64>,
    b_out: f64,
}

impl Gradients {
    fn zeros(hidden: usize) -> Self {
        Self {
            input_gate: Gate::zeros(hidden),
            forget_gate: Gate::zeros(hidden),
            cell_gate: Gate::zeros(hidden),
            output_gate: Gate::zeros(hidden),
            w_out: vec![0.0; hidden],
            b_out: 0.0,
        }
    }
}

/// Adam optimizer over the LSTM parameters.
///
/// First and second moment estimates mirror the parameter layout, with
/// bias-corrected steps `lr * m_hat / (sqrt(v_hat) + epsilon)`.
pub(crate) struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    timestep: i32,
    m: Gradients,
    v: Gradients,
}

impl Adam {
    pub(crate) fn new(learning_rate: f64, hidden: usize) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            timestep: 0,
            m: Gradients::zeros(hidden),
            v: Gradients::zeros(hidden),
        }
    }

    fn step(&mut self, model: &mut Lstm, grads: &Gradients) {
        self.timestep += 1;
        let update = AdamUpdate {
            learning_rate: self.learning_rate,
            beta1: self.beta1,
            beta2: self.beta2,
            epsilon: self.epsilon,
            correction1: 1.0 - self.beta1.powi(self.timestep),
            correction2: 1.0 - self.beta2.powi(self.timestep),
        };

        update.gate(
            &mut model.input_gate,
            &grads.input_gate,
            &mut self.m.input_gate,
            &mut self.v.input_gate,
        );
        update.gate(
            &mut model.forget_gate,
            &grads.forget_gate,
            &mut self.m.forget_gate,
            &mut self.v.forget_gate,
        );
        update.gate(
            &mut model.cell_gate,
            &grads.cell_gate,
            &mut self.m.cell_gate,
            &mut self.v.cell_gate,
        );
        update.gate(
            &mut model.output_gate,
            &grads.output_gate,
            &mut self.m.output_gate,
            &mut self.v.output_gate,
        );
        update.slice(&mut model.w_out, &grads.w_out, &mut self.m.w_out, &mut self.v.w_out);
        update.scalar(&mut model.b_out, grads.b_out, &mut self.m.b_out, &mut self.v.b_out);
    }
}

/// One bias-corrected Adam application.
struct AdamUpdate {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    correction1: f64,
    correction2: f64,
}

impl AdamUpdate {
    fn scalar(&self, param: &mut f64, grad: f64, m: &mut f64, v: &mut f64) {
        *m = self.beta1 * *m + (1.0 - self.beta1) * grad;
        *v = self.beta2 * *v + (1.0 - self.beta2) * grad * grad;
        let m_hat = *m / self.correction1;
        let v_hat = *v / self.correction2;
        *param -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
    }

    fn slice(&self, params: &mut [f64], grads: &[f64], m: &mut [f64], v: &mut [f64]) {
        for j in 0..params.len() {
            self.scalar(&mut params[j], grads[j], &mut m[j], &mut v[j]);
        }
    }

    fn gate(&self, param: &mut Gate, grad: &Gate, m: &mut Gate, v: &mut Gate) {
        self.slice(&mut param.w_x, &grad.w_x, &mut m.w_x, &mut v.w_x);
        self.slice(&mut param.w_h, &grad.w_h, &mut m.w_h, &mut v.w_h);
        self.slice(&mut param.b, &grad.b, &mut m.b, &mut v.b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn loss(model: &Lstm, window: &[f64], target: f64) -> f64 {
        let err = model.predict(window) - target;
        err * err
    }

    /// Central-difference loss gradient for one parameter.
    fn numeric_grad(
        model: &Lstm,
        window: &[f64],
        target: f64,
        param: impl Fn(&mut Lstm) -> &mut f64,
    ) -> f64 {
        let eps = 1e-6;
        let mut plus = model.clone();
        *param(&mut plus) += eps;
        let mut minus = model.clone();
        *param(&mut minus) -= eps;
        (loss(&plus, window, target) - loss(&minus, window, target)) / (2.0 * eps)
    }

    fn assert_close(analytic: f64, numeric: f64) {
        let tol = 1e-6 * (1.0 + numeric.abs());
        assert!(
            (analytic - numeric).abs() < tol,
            "analytic {} vs numeric {}",
            analytic,
            numeric
        );
    }

    #[test]
    fn test_new_rejects_zero_hidden() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(Lstm::new(0, &mut rng).is_err());
        assert!(Lstm::new(4, &mut rng).is_ok());
    }

    #[test]
    fn test_init_bounds() {
        let mut rng = StdRng::seed_from_u64(2);
        let model = Lstm::new(16, &mut rng).unwrap();
        let bound = 1.0 / 4.0;
        assert!(model.w_out.iter().all(|w| w.abs() <= bound));
        assert!(model.input_gate.w_h.iter().all(|w| w.abs() <= bound));
    }

    #[test]
    fn test_seeded_init_is_deterministic() {
        let mut a_rng = StdRng::seed_from_u64(11);
        let mut b_rng = StdRng::seed_from_u64(11);
        let a = Lstm::new(5, &mut a_rng).unwrap();
        let b = Lstm::new(5, &mut b_rng).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.predict(&[0.3, 0.6]), b.predict(&[0.3, 0.6]));
    }

    #[test]
    fn test_predict_is_pure() {
        let mut rng = StdRng::seed_from_u64(4);
        let model = Lstm::new(6, &mut rng).unwrap();
        let window = [0.2, 0.8, 0.5, 0.1];
        assert_eq!(model.predict(&window), model.predict(&window));
    }

    #[test]
    fn test_forward_cached_matches_predict() {
        let mut rng = StdRng::seed_from_u64(5);
        let model = Lstm::new(7, &mut rng).unwrap();
        let window = [0.9, 0.2, 0.4];
        let (caches, output) = model.forward_cached(&window);
        assert_eq!(caches.len(), 3);
        assert_eq!(output, model.predict(&window));
    }

    #[test]
    fn test_backward_matches_numeric_gradients() {
        let mut rng = StdRng::seed_from_u64(6);
        let model = Lstm::new(3, &mut rng).unwrap();
        let window = [0.2, 0.5, 0.1, 0.9];
        let target = 0.4;

        let (caches, output) = model.forward_cached(&window);
        let grads = model.backward(&caches, 2.0 * (output - target));

        assert_close(
            grads.input_gate.w_x[0],
            numeric_grad(&model, &window, target, |m| &mut m.input_gate.w_x[0]),
        );
        assert_close(
            grads.forget_gate.w_h[5],
            numeric_grad(&model, &window, target, |m| &mut m.forget_gate.w_h[5]),
        );
        assert_close(
            grads.cell_gate.b[1],
            numeric_grad(&model, &window, target, |m| &mut m.cell_gate.b[1]),
        );
        assert_close(
            grads.output_gate.w_x[2],
            numeric_grad(&model, &window, target, |m| &mut m.output_gate.w_x[2]),
        );
        assert_close(
            grads.cell_gate.w_h[7],
            numeric_grad(&model, &window, target, |m| &mut m.cell_gate.w_h[7]),
        );
        assert_close(
            grads.w_out[1],
            numeric_grad(&model, &window, target, |m| &mut m.w_out[1]),
        );
        assert_close(
            grads.b_out,
            numeric_grad(&model, &window, target, |m| &mut m.b_out),
        );
    }

    #[test]
    fn test_adam_fits_single_pair() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut model = Lstm::new(6, &mut rng).unwrap();
        let mut opt = Adam::new(1e-2, 6);
        let window = [0.1, 0.9, 0.4, 0.6];
        let target = 0.7;

        let initial = loss(&model, &window, target);
        let mut last = initial;
        for _ in 0..200 {
            last = model.train_pair(&window, target, &mut opt);
        }

        assert!(last < initial || initial < 1e-12);
        assert!(last < 5e-2);
    }

    #[test]
    fn test_serialize_round_trip() {
        let mut rng = StdRng::seed_from_u64(9);
        let model = Lstm::new(4, &mut rng).unwrap();
        let json = serde_json::to_string(&model).unwrap();
        let back: Lstm = serde_json::from_str(&json).unwrap();
        assert_eq!(back, model);
        assert_eq!(back.predict(&[0.5, 0.25]), model.predict(&[0.5, 0.25]));
    }
}
