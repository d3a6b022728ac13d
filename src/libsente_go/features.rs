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

use crate::board::Board;
use crate::color::Color;
use crate::symmetry;
use crate::vertex::NUM_VERTICES;

/// The number of features that the board will provide.
pub const NUM_FEATURES: usize = 18;

/// The total size (in elements) of the feature set.
pub const FEATURE_SIZE: usize = NUM_FEATURES * NUM_VERTICES;

pub trait Features {
    /// Returns the features of the current object, in CHW order, with the
    /// given symmetry applied.
    ///
    /// # Arguments
    ///
    /// * `symmetry` - the symmetry to use
    ///
    fn get_features(&self, symmetry: symmetry::Transform) -> Vec<f32>;
}

impl Features for Board {
    /// Returns the features of the current board state for the side to
    /// move, it returns the following features:
    ///
    /// ## Board state (current and historical)
    ///
    ///  1. Our vertices (now)
    ///  2. Our vertices (-1)
    ///  3. Our vertices (-2)
    ///  4. Our vertices (-3)
    ///  5. Our vertices (-4)
    ///  6. Our vertices (-5)
    ///  7. Our vertices (-6)
    ///  8. Our vertices (-7)
    ///  9. Opponent vertices (now)
    /// 10. Opponent vertices (-1)
    /// 11. Opponent vertices (-2)
    /// 12. Opponent vertices (-3)
    /// 13. Opponent vertices (-4)
    /// 14. Opponent vertices (-5)
    /// 15. Opponent vertices (-6)
    /// 16. Opponent vertices (-7)
    ///
    /// ## Global properties
    ///
    /// 17. A constant plane filled with ones if we are black
    /// 18. A constant plane filled with ones if we are white
    ///
    /// Plies past the recorded history are left zero.
    ///
    /// # Arguments
    ///
    /// * `symmetry` - the symmetry to use
    ///
    fn get_features(&self, symmetry: symmetry::Transform) -> Vec<f32> {
        let c_0: f32 = 0.0;
        let c_1: f32 = 1.0;

        let mut features = vec! [c_0; FEATURE_SIZE];
        let symmetry_table = symmetry.get_table();
        let to_move = self.to_move();
        let current = to_move as u8;
        let opponent = to_move.opposite() as u8;

        // board state (current and historical)
        for ply in 0..8 {
            let stones = match self.stones_at_ply(ply) {
                Some(stones) => stones,
                None => break
            };

            for index in 0..NUM_VERTICES {
                let other = symmetry_table[index] as usize;

                if stones[index] == current {
                    features[ply * NUM_VERTICES + other] = c_1;
                } else if stones[index] == opponent {
                    features[(8 + ply) * NUM_VERTICES + other] = c_1;
                }
            }
        }

        // global properties
        let is_black = if to_move == Color::Black { c_1 } else { c_0 };
        let is_white = if to_move == Color::White { c_1 } else { c_0 };

        for index in 0..NUM_VERTICES {
            features[16 * NUM_VERTICES + index] = is_black;
            features[17 * NUM_VERTICES + index] = is_white;
        }

        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symmetry::Transform;
    use crate::vertex::from_xy;

    #[test]
    fn empty_board_has_only_to_move_planes() {
        let board = Board::new(7.5);
        let features = board.get_features(Transform::Identity);

        assert!(features[..16 * NUM_VERTICES].iter().all(|&x| x == 0.0));
        assert!(features[16 * NUM_VERTICES..17 * NUM_VERTICES].iter().all(|&x| x == 1.0));
        assert!(features[17 * NUM_VERTICES..].iter().all(|&x| x == 0.0));
    }

    #[test]
    fn stones_and_history() {
        let board = Board::new(7.5)
            .play(from_xy(3, 3))
            .play(from_xy(15, 15));

        // black to move again, so both stones are on the `now` planes and
        // only its own stone is on the one-ply-ago plane
        let features = board.get_features(Transform::Identity);

        assert_eq!(features[from_xy(3, 3)], 1.0);
        assert_eq!(features[8 * NUM_VERTICES + from_xy(15, 15)], 1.0);
        assert_eq!(features[1 * NUM_VERTICES + from_xy(3, 3)], 1.0);
        assert_eq!(features[9 * NUM_VERTICES + from_xy(15, 15)], 0.0);
        assert_eq!(features[16 * NUM_VERTICES], 1.0);
        assert_eq!(features[17 * NUM_VERTICES], 0.0);
    }

    #[test]
    fn white_to_move_swaps_perspective() {
        let board = Board::new(7.5).play(from_xy(3, 3));
        let features = board.get_features(Transform::Identity);

        // the black stone belongs to the opponent now
        assert_eq!(features[from_xy(3, 3)], 0.0);
        assert_eq!(features[8 * NUM_VERTICES + from_xy(3, 3)], 1.0);
        assert_eq!(features[16 * NUM_VERTICES], 0.0);
        assert_eq!(features[17 * NUM_VERTICES], 1.0);
    }

    #[test]
    fn symmetry_moves_stones() {
        let board = Board::new(7.5).play(from_xy(0, 3));
        let features = board.get_features(Transform::FlipLR);

        assert_eq!(features[8 * NUM_VERTICES + from_xy(18, 3)], 1.0);
        assert_eq!(features[8 * NUM_VERTICES + from_xy(0, 3)], 0.0);
    }
}
