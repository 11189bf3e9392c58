//! Limited-memory BFGS with backtracking line search

use std::collections::VecDeque;

use ndarray::Array1;

/// Optimizer settings
#[derive(Debug, Clone)]
pub struct LbfgsConfig {
    /// Number of correction pairs kept
    pub memory: usize,
    pub max_iterations: usize,
    /// Stop when the gradient norm or the relative decrease falls below this
    pub tolerance: f64,
}

impl Default for LbfgsConfig {
    fn default() -> Self {
        Self {
            memory: 10,
            max_iterations: 200,
            tolerance: 1e-7,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LbfgsOutcome {
    pub x: Array1<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Armijo sufficient-decrease constant
const ARMIJO_C1: f64 = 1e-4;

/// Smallest step tried before the line search gives up
const MIN_STEP: f64 = 1e-20;

fn norm(a: &Array1<f64>) -> f64 {
    a.dot(a).sqrt()
}

/// Minimize a smooth function.
///
/// `objective(x, grad)` returns f(x) and writes ∇f(x) into `grad`.
pub fn minimize<F>(objective: F, x0: Array1<f64>, config: &LbfgsConfig) -> LbfgsOutcome
where
    F: Fn(&Array1<f64>, &mut Array1<f64>) -> f64,
{
    let n = x0.len();
    let mut x = x0;
    let mut grad = Array1::zeros(n);
    let mut value = objective(&x, &mut grad);

    // (s, y, 1 / s·y) correction pairs, oldest first
    let mut history: VecDeque<(Array1<f64>, Array1<f64>, f64)> =
        VecDeque::with_capacity(config.memory);
    let mut converged = false;
    let mut iterations = 0;

    while iterations < config.max_iterations {
        let grad_norm = norm(&grad);
        if grad_norm <= config.tolerance * norm(&x).max(1.0) {
            converged = true;
            break;
        }
        iterations += 1;

        // Two-loop recursion: direction = -H·grad
        let mut q = grad.clone();
        let mut alphas = Vec::with_capacity(history.len());
        for (s, y, rho) in history.iter().rev() {
            let alpha = rho * s.dot(&q);
            q.scaled_add(-alpha, y);
            alphas.push(alpha);
        }
        let gamma = match history.back() {
            Some((s, y, _)) => s.dot(y) / y.dot(y),
            None => 1.0 / grad_norm.max(1.0),
        };
        q *= gamma;
        for ((s, y, rho), alpha) in history.iter().zip(alphas.iter().rev()) {
            let beta = rho * y.dot(&q);
            q.scaled_add(alpha - beta, s);
        }
        let mut direction = -q;

        let mut slope = direction.dot(&grad);
        if slope >= 0.0 {
            // Not a descent direction; restart from steepest descent
            history.clear();
            direction = grad.mapv(|g| -g / grad_norm.max(1.0));
            slope = direction.dot(&grad);
        }

        let mut step = 1.0;
        let mut next_grad = Array1::zeros(n);
        let accepted = loop {
            let mut next_x = x.clone();
            next_x.scaled_add(step, &direction);
            let candidate = objective(&next_x, &mut next_grad);
            if candidate.is_finite() && candidate <= value + ARMIJO_C1 * step * slope {
                break Some((next_x, candidate));
            }
            step *= 0.5;
            if step < MIN_STEP {
                break None;
            }
        };

        let Some((next_x, next_value)) = accepted else {
            log::debug!("L-BFGS line search stalled after {} iteration(s)", iterations);
            break;
        };

        let s = &next_x - &x;
        let y = &next_grad - &grad;
        let sy = s.dot(&y);
        if sy > 1e-12 {
            if history.len() == config.memory {
                history.pop_front();
            }
            history.push_back((s, y, 1.0 / sy));
        }

        let decrease = value - next_value;
        x = next_x;
        grad = next_grad;
        value = next_value;

        if decrease.abs() <= config.tolerance * value.abs().max(1.0) {
            converged = true;
            break;
        }
    }

    LbfgsOutcome {
        x,
        value,
        iterations,
        converged,
    }
}
