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

/// Returns the sum of all finite elements in `values`.
///
/// # Arguments
///
/// * `values` -
///
pub fn sum_finite_f32(values: &[f32]) -> f32 {
    values.iter().filter(|x| x.is_finite()).sum()
}

/// Divide all finite elements in `values` by `total` in-place. Non-finite
/// elements are left untouched.
///
/// # Arguments
///
/// * `values` -
/// * `total` -
///
pub fn normalize_finite_f32(values: &mut [f32], total: f32) {
    let recip = total.recip();

    for value in values.iter_mut() {
        if value.is_finite() {
            *value *= recip;
        }
    }
}
