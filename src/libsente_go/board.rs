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

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::color::Color;
use crate::vertex::{self, BOARD_SIZE, NUM_VERTICES, PASS};
use crate::zobrist;

/// The number of previous stone snapshots kept for the history planes.
const MAX_HISTORY: usize = 7;

/// Returns an iterator over the on-board neighbours of the given vertex.
///
/// # Arguments
///
/// * `vertex` -
///
fn neighbors(vertex: usize) -> impl Iterator<Item = usize> {
    let (x, y) = (vertex::x(vertex), vertex::y(vertex));
    let west = if x > 0 { Some(vertex - 1) } else { None };
    let east = if x < BOARD_SIZE - 1 { Some(vertex + 1) } else { None };
    let north = if y > 0 { Some(vertex - BOARD_SIZE) } else { None };
    let south = if y < BOARD_SIZE - 1 { Some(vertex + BOARD_SIZE) } else { None };

    west.into_iter().chain(east).chain(north).chain(south)
}

/// A board position, including the history needed for the feature planes
/// and for superko detection.
///
/// Superko is positional, over a zobrist hash of the stones only. It is
/// deliberately not part of `is_valid`, since per-move superko checks are
/// too expensive for move generation; the search prunes superko moves at
/// the root instead.
#[derive(Clone)]
pub struct Board {
    vertices: [u8; NUM_VERTICES],
    to_move: Color,
    passes: u8,
    komi: f32,
    ko_point: Option<usize>,

    /// Stone snapshots of up to the seven preceding positions, the most
    /// recent one first.
    recent: VecDeque<Arc<[u8; NUM_VERTICES]>>,

    /// Zobrist hashes of every position since the start of the game,
    /// including the current one.
    hash_history: Vec<u64>
}

impl Board {
    /// Returns an empty board with black to move.
    ///
    /// # Arguments
    ///
    /// * `komi` -
    ///
    pub fn new(komi: f32) -> Board {
        Board {
            vertices: [0; NUM_VERTICES],
            to_move: Color::Black,
            passes: 0,
            komi: komi,
            ko_point: None,
            recent: VecDeque::with_capacity(MAX_HISTORY),
            hash_history: vec! [0]
        }
    }

    /// Returns the color whose turn it is to play.
    pub fn to_move(&self) -> Color {
        self.to_move
    }

    /// Returns the number of consecutive passes immediately preceding this
    /// position.
    pub fn passes(&self) -> u8 {
        self.passes
    }

    /// Returns the komi.
    pub fn komi(&self) -> f32 {
        self.komi
    }

    /// Returns the color of the stone at the given vertex, if any.
    ///
    /// # Arguments
    ///
    /// * `vertex` -
    ///
    pub fn at(&self, vertex: usize) -> Option<Color> {
        match self.vertices[vertex] {
            1 => Some(Color::Black),
            2 => Some(Color::White),
            _ => None
        }
    }

    /// Returns the zobrist hash of the stones in this position.
    pub fn zobrist(&self) -> u64 {
        let mut hash = 0;

        for vertex in 0..NUM_VERTICES {
            match self.vertices[vertex] {
                1 => hash ^= zobrist::KEYS[0][vertex],
                2 => hash ^= zobrist::KEYS[1][vertex],
                _ => {}
            }
        }

        hash
    }

    /// Returns the stones as they were `ply` plies ago, where zero is the
    /// current position. Returns `None` past the recorded history.
    ///
    /// # Arguments
    ///
    /// * `ply` -
    ///
    pub fn stones_at_ply(&self, ply: usize) -> Option<&[u8; NUM_VERTICES]> {
        if ply == 0 {
            Some(&self.vertices)
        } else {
            self.recent.get(ply - 1).map(|stones| &**stones)
        }
    }

    /// Returns true if the given move is legal for `color`, i.e. the vertex
    /// is empty, the move is not suicide, and it does not immediately
    /// re-take a ko.
    ///
    /// # Arguments
    ///
    /// * `color` -
    /// * `vertex` -
    ///
    pub fn is_valid(&self, color: Color, vertex: usize) -> bool {
        vertex < NUM_VERTICES
            && self.vertices[vertex] == 0
            && self.ko_point != Some(vertex)
            && !self.is_suicide(color, vertex)
    }

    /// Returns true if playing at the given vertex would leave the played
    /// stone's group without liberties.
    ///
    /// # Arguments
    ///
    /// * `color` -
    /// * `vertex` -
    ///
    fn is_suicide(&self, color: Color, vertex: usize) -> bool {
        let friendly = color as u8;
        let enemy = color.opposite() as u8;

        for other in neighbors(vertex) {
            if self.vertices[other] == 0 {
                return false;
            }
        }

        for other in neighbors(vertex) {
            if self.vertices[other] == enemy && self.count_liberties(other) == 1 {
                return false;  // the move captures
            }
        }

        for other in neighbors(vertex) {
            if self.vertices[other] == friendly && self.count_liberties(other) > 1 {
                return false;
            }
        }

        true
    }

    /// Returns the number of liberties of the group that contains the given
    /// vertex.
    ///
    /// # Arguments
    ///
    /// * `vertex` -
    ///
    fn count_liberties(&self, vertex: usize) -> usize {
        debug_assert!(self.vertices[vertex] != 0);

        let color = self.vertices[vertex];
        let mut visited = [false; NUM_VERTICES];
        let mut counted = [false; NUM_VERTICES];
        let mut stack = vec! [vertex];
        let mut count = 0;

        visited[vertex] = true;

        while let Some(current) = stack.pop() {
            for other in neighbors(current) {
                if self.vertices[other] == 0 {
                    if !counted[other] {
                        counted[other] = true;
                        count += 1;
                    }
                } else if self.vertices[other] == color && !visited[other] {
                    visited[other] = true;
                    stack.push(other);
                }
            }
        }

        count
    }

    /// Removes the group that contains the given vertex from the board,
    /// returning the number of stones removed and the vertex of the last
    /// removed stone.
    ///
    /// # Arguments
    ///
    /// * `vertex` -
    ///
    fn remove_group(&mut self, vertex: usize) -> (usize, usize) {
        debug_assert!(self.vertices[vertex] != 0);

        let color = self.vertices[vertex];
        let mut stack = vec! [vertex];
        let mut removed = 0;
        let mut last = vertex;

        self.vertices[vertex] = 0;

        while let Some(current) = stack.pop() {
            removed += 1;
            last = current;

            for other in neighbors(current) {
                if self.vertices[other] == color {
                    self.vertices[other] = 0;
                    stack.push(other);
                }
            }
        }

        (removed, last)
    }

    /// Places a stone for `color`, resolving any captures and recording the
    /// ko point. Does not touch the pass count, history, or turn.
    ///
    /// # Arguments
    ///
    /// * `color` -
    /// * `vertex` -
    ///
    fn place_unchecked(&mut self, color: Color, vertex: usize) {
        debug_assert!(self.vertices[vertex] == 0);

        let enemy = color.opposite() as u8;
        let mut num_captured = 0;
        let mut last_captured = 0;

        self.vertices[vertex] = color as u8;

        for other in neighbors(vertex) {
            if self.vertices[other] == enemy && self.count_liberties(other) == 0 {
                let (removed, last) = self.remove_group(other);

                num_captured += removed;
                last_captured = last;
            }
        }

        debug_assert!(self.count_liberties(vertex) > 0, "suicide at {}", vertex);

        // a lone stone that took exactly one stone and is left with a single
        // liberty opens a ko at the captured vertex
        let is_lone = neighbors(vertex).all(|other| self.vertices[other] != color as u8);

        self.ko_point = if num_captured == 1 && is_lone && self.count_liberties(vertex) == 1 {
            Some(last_captured)
        } else {
            None
        };
    }

    /// Puts a stone on the board as part of the initial position, resolving
    /// captures. The stones placed this way form the start of the game for
    /// superko purposes.
    ///
    /// # Arguments
    ///
    /// * `color` -
    /// * `vertex` -
    ///
    pub fn place(&mut self, color: Color, vertex: usize) {
        self.place_unchecked(color, vertex);
        self.ko_point = None;
        self.recent.clear();
        self.hash_history = vec! [self.zobrist()];
    }

    /// Returns the position that follows from the side to move playing at
    /// the given vertex (or `PASS`).
    ///
    /// # Arguments
    ///
    /// * `vertex` -
    ///
    pub fn play(&self, vertex: usize) -> Board {
        let mut next = self.clone();

        next.recent.push_front(Arc::new(self.vertices));
        next.recent.truncate(MAX_HISTORY);

        if vertex == PASS {
            next.passes = self.passes.saturating_add(1);
            next.ko_point = None;
        } else {
            debug_assert!(self.is_valid(self.to_move, vertex));

            next.place_unchecked(self.to_move, vertex);
            next.passes = 0;
        }

        next.to_move = self.to_move.opposite();
        next.hash_history.push(next.zobrist());
        next
    }

    /// Returns true if the side to move playing at the given vertex would
    /// re-create a position that has already occurred in this game.
    ///
    /// # Arguments
    ///
    /// * `vertex` -
    ///
    pub fn is_superko(&self, vertex: usize) -> bool {
        debug_assert!(vertex != PASS);

        if !self.is_valid(self.to_move, vertex) {
            return false;
        }

        let mut scratch = self.clone();
        scratch.place_unchecked(self.to_move, vertex);

        self.hash_history.contains(&scratch.zobrist())
    }

    /// Returns the Tromp-Taylor score of this position from black's point
    /// of view, komi included.
    pub fn score(&self) -> f32 {
        let mut black = 0;
        let mut white = 0;
        let mut visited = [false; NUM_VERTICES];

        for vertex in 0..NUM_VERTICES {
            match self.vertices[vertex] {
                1 => { black += 1; },
                2 => { white += 1; },
                _ => {
                    if visited[vertex] {
                        continue;
                    }

                    // flood fill the empty region and record which colors
                    // it touches
                    let mut stack = vec! [vertex];
                    let mut size = 1;
                    let mut touches_black = false;
                    let mut touches_white = false;

                    visited[vertex] = true;

                    while let Some(current) = stack.pop() {
                        for other in neighbors(current) {
                            match self.vertices[other] {
                                1 => { touches_black = true; },
                                2 => { touches_white = true; },
                                _ => {
                                    if !visited[other] {
                                        visited[other] = true;
                                        size += 1;
                                        stack.push(other);
                                    }
                                }
                            }
                        }
                    }

                    if touches_black && !touches_white {
                        black += size;
                    } else if touches_white && !touches_black {
                        white += size;
                    }
                }
            }
        }

        black as f32 - white as f32 - self.komi
    }

    /// Returns true if the given vertex is occupied by a stone of the given
    /// color, where the vertex is described as an offset from `vertex`.
    ///
    /// # Arguments
    ///
    /// * `color` -
    /// * `vertex` -
    /// * `dx` -
    /// * `dy` -
    ///
    fn is_vertex_filled(&self, color: Color, vertex: usize, dx: isize, dy: isize) -> bool {
        let x = vertex::x(vertex) as isize + dx;
        let y = vertex::y(vertex) as isize + dy;

        x >= 0 && x < BOARD_SIZE as isize
            && y >= 0 && y < BOARD_SIZE as isize
            && self.vertices[vertex::from_xy(x as usize, y as usize)] == color as u8
    }

    /// Returns true if the given move would fill ones own eye. An eye in
    /// this case is recognized as an empty spot that is surrounded by at
    /// least 7 stones of the same color. This will miss some _complicated_
    /// eyes, but this is good enough for the heuristic.
    ///
    /// # Arguments
    ///
    /// * `color` -
    /// * `vertex` -
    ///
    pub fn is_eye(&self, color: Color, vertex: usize) -> bool {
        const CROSS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
        const DIAGONAL: [(isize, isize); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

        let num_cross = CROSS.iter()
            .filter(|(dx, dy)| self.is_vertex_filled(color, vertex, *dx, *dy))
            .count();
        let num_diagonal = DIAGONAL.iter()
            .filter(|(dx, dy)| self.is_vertex_filled(color, vertex, *dx, *dy))
            .count();

        // distinguish between the three different cases, (i) an eye in the middle,
        // (ii) an eye in along the edge, and (iii) an eye in the corner.
        let (x, y) = (vertex::x(vertex), vertex::y(vertex));

        if (x == 0 || x == 18) && (y == 0 || y == 18) {
            num_cross >= 2 && num_diagonal >= 1  // corner move
        } else if x == 0 || x == 18 || y == 0 || y == 18 {
            num_cross >= 3 && num_diagonal >= 2  // edge
        } else {
            num_cross >= 4 && num_diagonal >= 3
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        for y in 0..BOARD_SIZE {
            for x in 0..BOARD_SIZE {
                match self.vertices[vertex::from_xy(x, y)] {
                    1 => write!(fmt, "X")?,
                    2 => write!(fmt, "O")?,
                    _ => write!(fmt, ".")?
                }
            }

            writeln!(fmt)?;
        }

        Ok(())
    }
}
