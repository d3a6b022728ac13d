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

use crate::vertex::{BOARD_SIZE, NUM_VERTICES, from_xy, x, y};

/// One of the eight symmetries of the square board.
///
/// Each symmetry has a stable index in `0..8` where bit 2 toggles an x↔y
/// transpose (applied first) and bits 0 and 1 toggle a flip along the x-
/// and y-axis (applied after the transpose).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transform {
    Identity,
    FlipLR,
    FlipUD,
    Rot180,
    Transpose,
    Rot90,
    Rot270,
    TransposeAnti
}

/// All eight symmetries, indexed by their stable index.
pub const ALL: [Transform; 8] = [
    Transform::Identity,
    Transform::FlipLR,
    Transform::FlipUD,
    Transform::Rot180,
    Transform::Transpose,
    Transform::Rot90,
    Transform::Rot270,
    Transform::TransposeAnti
];

lazy_static! {
    /// Per-transform permutation of the vertex indices.
    static ref TABLES: [[u16; NUM_VERTICES]; 8] = {
        let mut tables = [[0; NUM_VERTICES]; 8];

        for s in 0..8 {
            for vertex in 0..NUM_VERTICES {
                tables[s][vertex] = apply_untabled(s, vertex) as u16;
            }
        }

        tables
    };
}

/// Applies the symmetry with index `s` to the given vertex without going
/// through the lookup tables.
///
/// # Arguments
///
/// * `s` -
/// * `vertex` -
///
fn apply_untabled(s: usize, vertex: usize) -> usize {
    let (mut x, mut y) = (x(vertex), y(vertex));

    if s & 4 != 0 {
        let temp = x;
        x = y;
        y = temp;
    }
    if s & 1 != 0 {
        x = BOARD_SIZE - 1 - x;
    }
    if s & 2 != 0 {
        y = BOARD_SIZE - 1 - y;
    }

    from_xy(x, y)
}

impl Transform {
    /// Returns the symmetry with the given stable index.
    ///
    /// # Arguments
    ///
    /// * `s` -
    ///
    pub fn from_index(s: usize) -> Transform {
        ALL[s]
    }

    /// Returns the stable index of this symmetry.
    pub fn to_index(self) -> usize {
        ALL.iter().position(|&t| t == self).unwrap()
    }

    /// Returns the symmetry that undoes this symmetry.
    pub fn inverse(self) -> Transform {
        let s = self.to_index();

        if s & 4 != 0 {
            // the flips are applied after the transpose, so undoing them in
            // the opposite order swaps which axis each flip acts on
            Transform::from_index(4 | ((s & 1) << 1) | ((s & 2) >> 1))
        } else {
            self
        }
    }

    /// Returns the permutation table of this symmetry.
    pub fn get_table(self) -> &'static [u16; NUM_VERTICES] {
        &TABLES[self.to_index()]
    }

    /// Applies this symmetry to the given vertex.
    ///
    /// # Arguments
    ///
    /// * `vertex` -
    ///
    pub fn apply(self, vertex: usize) -> usize {
        debug_assert!(vertex < NUM_VERTICES);

        self.get_table()[vertex] as usize
    }
}
