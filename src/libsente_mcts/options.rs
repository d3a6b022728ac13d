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

use crate::predict::Ensemble;

/// The tunable knobs of a search, threaded through explicitly instead of
/// living in process-wide configuration.
#[derive(Clone, Debug)]
pub struct SearchOptions {
    /// The number of worker threads probing the tree.
    pub num_threads: usize,

    /// The exploration constant of the PUCT selection rule.
    pub c_puct: f32,

    /// The temperature of the softmax applied to the policy logits.
    pub softmax_temp: f32,

    /// The virtual loss added to a node by every descent through it.
    pub virtual_loss: i32,

    /// The shape of the dirichlet noise mixed into the root priors.
    pub noise_alpha: f32,

    /// The fraction of the root priors replaced by dirichlet noise.
    pub noise_epsilon: f32,

    /// The seed of every random number generator used by the search.
    pub random_seed: u64,

    /// The symmetry ensemble applied to evaluator inputs.
    pub ensemble: Ensemble
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            num_threads: 1,
            c_puct: 0.9,
            softmax_temp: 1.0,
            virtual_loss: 3,
            noise_alpha: 0.03,
            noise_epsilon: 0.25,
            random_seed: 0x2545f4914f6cdd1d,
            ensemble: Ensemble::RandomRotation
        }
    }
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    pub fn with_c_puct(mut self, c_puct: f32) -> Self {
        self.c_puct = c_puct;
        self
    }

    pub fn with_ensemble(mut self, ensemble: Ensemble) -> Self {
        self.ensemble = ensemble;
        self
    }

    pub fn with_random_seed(mut self, random_seed: u64) -> Self {
        self.random_seed = random_seed;
        self
    }
}
