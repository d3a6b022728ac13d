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

use sente_go::symmetry::Transform;
use sente_mcts::options::SearchOptions;
use sente_mcts::predict::{Ensemble, PredictResponse, Predictor, POLICY_SIZE};
use sente_mcts::tree::Node;

/// Returns deterministic search options, with a fixed symmetry so that the
/// stub predictors do not need to be equivariant.
pub fn test_options() -> SearchOptions {
    SearchOptions::default()
        .with_ensemble(Ensemble::Direct(Transform::Identity))
        .with_random_seed(0xcafed00d)
}

/// A predictor that returns a constant value and uniform policy.
#[derive(Clone, Default)]
pub struct UniformPredictor;

impl Predictor for UniformPredictor {
    fn predict(&self, _features: &[f32]) -> PredictResponse {
        PredictResponse::new(0.0, vec! [0.0; POLICY_SIZE])
    }
}

/// A predictor that assigns the given probabilities to the given vertices,
/// none anywhere else, and a constant raw value. The probabilities survive
/// the softmax exactly because they are stored as log-probabilities.
#[derive(Clone)]
pub struct PinnedPredictor {
    policy: Vec<f32>,
    raw_value: f32
}

impl PinnedPredictor {
    pub fn new(entries: &[(usize, f32)], raw_value: f32) -> Self {
        let mut policy = vec! [::std::f32::NEG_INFINITY; POLICY_SIZE];

        for &(vertex, probability) in entries {
            policy[vertex] = probability.ln();
        }

        Self { policy, raw_value }
    }
}

impl Predictor for PinnedPredictor {
    fn predict(&self, _features: &[f32]) -> PredictResponse {
        PredictResponse::new(self.raw_value, self.policy.clone())
    }
}

/// Checks the accounting invariants of a quiescent tree: no node holds any
/// virtual loss, and the visits of an expanded node are the visits of its
/// children plus the descent that expanded it (none for the root, which is
/// expanded before the search starts).
///
/// # Arguments
///
/// * `root` -
///
pub fn check_quiescent(root: &Node) {
    fn check(node: &Node, is_root: bool) {
        assert_eq!(node.virtual_loss(), 0, "virtual loss at {}", node.vertex());

        let mut child_visits = 0;

        node.for_each_child(|child| {
            check(child, false);
            child_visits += child.visits();
        });

        if node.has_children() {
            let self_visits = if is_root { 0 } else { 1 };

            assert_eq!(
                node.visits(),
                child_visits + self_visits,
                "visit accounting at {}",
                node.vertex()
            );
        } else {
            assert_eq!(child_visits, 0);
        }
    }

    check(root, true)
}

/// Returns the entropy (in nats) of the given visit distribution.
///
/// # Arguments
///
/// * `distribution` -
///
pub fn entropy(distribution: &[(usize, f32)]) -> f32 {
    -distribution.iter()
        .map(|&(_, share)| if share > 0.0 { share * share.ln() } else { 0.0 })
        .sum::<f32>()
}
