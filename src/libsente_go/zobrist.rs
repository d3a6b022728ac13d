// Copyright 2019 Karl Sundequist Blomdahl <karl.sundequist.blomdahl@gmail.com>
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
use rand::{Rng, SeedableRng};

use crate::vertex::NUM_VERTICES;

lazy_static! {
    /// Hash keys for a stone of either color at every vertex, index zero is
    /// black and index one is white.
    pub static ref KEYS: [[u64; NUM_VERTICES]; 2] = {
        let mut rng = SmallRng::seed_from_u64(0x9e3779b97f4a7c15);
        let mut keys = [[0; NUM_VERTICES]; 2];

        for color in 0..2 {
            for vertex in 0..NUM_VERTICES {
                keys[color][vertex] = rng.gen();
            }
        }

        keys
    };
}
