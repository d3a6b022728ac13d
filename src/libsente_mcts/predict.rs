// Copyright 2020 Karl Sundequist Blomdahl <karl.sundequist.blomdahl@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use rand::rngs::SmallRng;
use rand::Rng;

use sente_go::features::Features;
use sente_go::symmetry;
use sente_go::vertex::{NUM_VERTICES, PASS};
use sente_go::Board;
use sente_utils::math::{normalize_finite_f32, sum_finite_f32};

use crate::error::Error;

/// The number of entries of a policy, one per vertex plus one for the
/// passing move.
pub const POLICY_SIZE: usize = NUM_VERTICES + 1;

/// The raw output of a single forward pass through the neural network.
#[derive(Clone, Debug)]
pub struct PredictResponse {
    value: f32,
    policy: Vec<f32>
}

impl PredictResponse {
    pub fn new(value: f32, policy: Vec<f32>) -> Self {
        Self { value, policy }
    }

    /// Returns the raw value head output, before the `tanh` mapping.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Returns the raw policy logits.
    pub fn policy(&self) -> &[f32] {
        &self.policy
    }
}

/// An abstraction that hides the exact details of how a neural network
/// forward pass is implemented. All methods appear to be synchronous but
/// may sleep while the underlying implementation queues or batches work.
pub trait Predictor: Sync {
    /// Returns the value and policy logits for the given features.
    ///
    /// # Arguments
    ///
    /// * `features` -
    ///
    fn predict(&self, features: &[f32]) -> PredictResponse;
}

/// The symmetry ensemble applied to the evaluator input.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Ensemble {
    /// Always use the given symmetry.
    Direct(symmetry::Transform),

    /// Use a uniformly drawn symmetry for every evaluation.
    RandomRotation
}

/// Performs a forward pass through the given predictor for the given board
/// position, and returns the prior of every candidate move together with
/// the win probability of the side to move.
///
/// The symmetry is applied to the input features, and undone on the
/// returned policy, so that the returned vertices refer to the original
/// board. Only the passing move and legal vertices are kept; the kept
/// priors are re-normalized to sum to one unless their total mass is
/// subnormal, in which case they are returned as given.
///
/// # Arguments
///
/// * `predictor` -
/// * `board` -
/// * `ensemble` -
/// * `softmax_temp` -
/// * `rng` -
///
pub fn evaluate<P: Predictor + ?Sized>(
    predictor: &P,
    board: &Board,
    ensemble: Ensemble,
    softmax_temp: f32,
    rng: &mut SmallRng
) -> Result<(Vec<(usize, f32)>, f32), Error>
{
    let symmetry = match ensemble {
        Ensemble::Direct(symmetry) => symmetry,
        Ensemble::RandomRotation => symmetry::ALL[rng.gen_range(0..8)]
    };

    let features = board.get_features(symmetry);
    let response = predictor.predict(&features);

    if response.policy().len() != POLICY_SIZE {
        return Err(Error::WeightsMismatch {
            expected: POLICY_SIZE,
            actual: response.policy().len()
        });
    }

    let policy = softmax(response.policy(), softmax_temp);
    let value = 0.5 + 0.5 * response.value().tanh();

    // keep the passing move and the legal vertices, mapped back to the
    // identity board
    let to_move = board.to_move();
    let mut priors = Vec::with_capacity(POLICY_SIZE);

    priors.push((PASS, policy[PASS]));

    for vertex in 0..NUM_VERTICES {
        if board.is_valid(to_move, vertex) {
            priors.push((vertex, policy[symmetry.apply(vertex)]));
        }
    }

    let total = priors.iter().map(|&(_, prior)| prior).sum::<f32>();

    if total >= ::std::f32::MIN_POSITIVE {
        let recip = total.recip();

        for prior in priors.iter_mut() {
            prior.1 *= recip;
        }
    }

    Ok((priors, value))
}

/// Returns the softmax of the given logits with the given temperature,
/// using the max-logit normalization trick for numeric stability.
///
/// # Arguments
///
/// * `logits` -
/// * `temperature` -
///
fn softmax(logits: &[f32], temperature: f32) -> Vec<f32> {
    let max_logit = logits.iter()
        .cloned()
        .filter(|l| l.is_finite())
        .fold(::std::f32::NEG_INFINITY, f32::max);

    if !max_logit.is_finite() {
        return vec! [0.0; logits.len()];
    }

    let mut out = logits.iter()
        .map(|&l| ((l - max_logit) / temperature).exp())
        .collect::<Vec<f32>>();
    let total = sum_finite_f32(&out);

    if total >= ::std::f32::MIN_POSITIVE {
        normalize_finite_f32(&mut out, total);
    }

    out
}
