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

use rand::Rng;
use rand_distr::{Distribution, Gamma};

/// Mixes a Dirichlet(`alpha`) sample into the given priors such that each
/// entry becomes `(1 - epsilon) * prior + epsilon * eta_i`, where `eta` is
/// the normalized vector of Gamma(`alpha`, 1) draws.
///
/// If the drawn mass is subnormal then the priors are left untouched.
///
/// # Arguments
///
/// * `priors` -
/// * `alpha` -
/// * `epsilon` -
/// * `rng` -
///
pub fn add<R: Rng>(priors: &mut [f32], alpha: f32, epsilon: f32, rng: &mut R) {
    let gamma = Gamma::new(alpha, 1.0)
        .expect("could not create gamma distribution");
    let eta = priors.iter()
        .map(|_| gamma.sample(rng))
        .collect::<Vec<f32>>();
    let total = eta.iter().sum::<f32>();

    if total < ::std::f32::MIN_POSITIVE {
        return;
    }

    for (prior, g) in priors.iter_mut().zip(eta.into_iter()) {
        *prior = (1.0 - epsilon) * *prior + epsilon * (g / total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn stays_normalized() {
        let mut rng = SmallRng::seed_from_u64(17);
        let mut priors = vec! [0.1f32; 10];

        add(&mut priors, 0.03, 0.25, &mut rng);

        let total = priors.iter().sum::<f32>();

        assert!((total - 1.0).abs() < 1e-5, "{}", total);
        assert!(priors.iter().all(|&p| p >= 0.0));
    }

    #[test]
    fn mixes_with_epsilon() {
        let mut rng = SmallRng::seed_from_u64(17);
        let mut priors = vec! [0.5f32, 0.5f32];

        add(&mut priors, 10.0, 0.25, &mut rng);

        // every entry is at least `(1 - epsilon)` of its original value
        assert!(priors.iter().all(|&p| p >= 0.75 * 0.5));
    }
}
