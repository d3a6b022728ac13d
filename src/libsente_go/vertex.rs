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

/// The width (and height) of the board.
pub const BOARD_SIZE: usize = 19;

/// The total number of vertices on the board.
pub const NUM_VERTICES: usize = 361;

/// The distinguished index of the passing move.
pub const PASS: usize = 361;

/// Returns the x coordinate of the given vertex.
///
/// # Arguments
///
/// * `vertex` -
///
pub fn x(vertex: usize) -> usize {
    vertex % BOARD_SIZE
}

/// Returns the y coordinate of the given vertex.
///
/// # Arguments
///
/// * `vertex` -
///
pub fn y(vertex: usize) -> usize {
    vertex / BOARD_SIZE
}

/// Returns the vertex at the given coordinates.
///
/// # Arguments
///
/// * `x` -
/// * `y` -
///
pub fn from_xy(x: usize, y: usize) -> usize {
    debug_assert!(x < BOARD_SIZE && y < BOARD_SIZE);

    BOARD_SIZE * y + x
}
