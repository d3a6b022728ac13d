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

/// Returns an index into `weights` sampled with probability proportional to
/// its weight, or `None` if the total weight is not positive.
///
/// # Arguments
///
/// * `weights` -
/// * `rng` -
///
pub fn weighted<R: Rng>(weights: &[f32], rng: &mut R) -> Option<usize> {
    let total = weights.iter().sum::<f32>();

    if total < ::std::f32::MIN_POSITIVE {
        return None;
    }

    let threshold = total * rng.gen::<f32>();
    let mut so_far = 0.0f32;

    for (i, &weight) in weights.iter().enumerate() {
        so_far += weight;

        if so_far >= threshold {
            return Some(i);
        }
    }

    // rounding may leave `so_far` just short of `total`
    Some(weights.len() - 1)
}
