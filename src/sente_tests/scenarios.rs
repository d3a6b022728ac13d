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

use sente_go::vertex::{from_xy, NUM_VERTICES, PASS};
use sente_go::{Board, Color};
use sente_mcts::predict::{PredictResponse, Predictor, POLICY_SIZE};
use sente_mcts::Search;
use sente_utils::math::sum_finite_f32;

use crate::common::*;

fn share_of(distribution: &[(usize, f32)], vertex: usize) -> f32 {
    distribution.iter()
        .find(|&&(other, _)| other == vertex)
        .map(|&(_, share)| share)
        .unwrap_or(0.0)
}

#[test]
fn s1_greedy_search_follows_the_best_path() {
    let a = from_xy(3, 3);
    let b = from_xy(9, 9);
    let c = from_xy(15, 15);
    let predictor = PinnedPredictor::new(&[(a, 0.7), (b, 0.2), (c, 0.1)], 0.0);
    let options = test_options().with_c_puct(0.0);
    let mut search = Search::new(&predictor, Board::new(7.5), options).unwrap();

    search.simulate(10).unwrap();

    let distribution = search.visit_distribution();

    assert_eq!(search.root_visits(), 10);
    assert!(share_of(&distribution, a) > share_of(&distribution, b));
    assert!(share_of(&distribution, a) > share_of(&distribution, c));
    assert_eq!(search.best_move(), a);
}

#[test]
fn s2_exploration_distributes_by_prior() {
    let a = from_xy(3, 3);
    let b = from_xy(9, 9);
    let c = from_xy(15, 15);
    let predictor = PinnedPredictor::new(&[(a, 0.7), (b, 0.2), (c, 0.1)], 0.0);
    let options = test_options().with_c_puct(5.0);
    let mut search = Search::new(&predictor, Board::new(7.5), options).unwrap();

    search.simulate(100).unwrap();

    let distribution = search.visit_distribution();

    for &(vertex, expected) in &[(a, 0.7f32), (b, 0.2f32), (c, 0.1f32)] {
        let share = share_of(&distribution, vertex);

        assert!(
            (share - expected).abs() < 0.1,
            "expected {} ± 0.1 at {}, got {}",
            expected, vertex, share
        );
    }
}

/// A predictor over exactly two candidate moves whose value claims that
/// the position is won for black if `a` has been played, and lost for
/// black if `b` has been played.
struct TwoMovePredictor {
    a: usize,
    b: usize
}

impl Predictor for TwoMovePredictor {
    fn predict(&self, features: &[f32]) -> PredictResponse {
        let mut policy = vec! [::std::f32::NEG_INFINITY; POLICY_SIZE];
        policy[self.a] = 0.0;
        policy[self.b] = 0.0;

        // plane 0 holds the stones of the side to move, plane 8 the
        // opponent's stones
        let mine = |vertex: usize| features[vertex] == 1.0;
        let theirs = |vertex: usize| features[8 * NUM_VERTICES + vertex] == 1.0;

        let raw_value = if mine(self.a) || theirs(self.b) {
            100.0
        } else if theirs(self.a) || mine(self.b) {
            -100.0
        } else {
            0.0
        };

        PredictResponse::new(raw_value, policy)
    }
}

#[test]
fn s3_search_concentrates_on_the_winning_move() {
    let a = from_xy(3, 3);
    let b = from_xy(15, 15);
    let predictor = TwoMovePredictor { a, b };
    let options = test_options().with_c_puct(1.0);
    let mut search = Search::new(&predictor, Board::new(7.5), options).unwrap();

    search.simulate(50).unwrap();

    let distribution = search.visit_distribution();

    assert!(share_of(&distribution, a) > 0.8, "{:?}", distribution);
    assert_eq!(search.best_move(), a);
}

#[test]
fn s4_parallel_search_keeps_the_accounting_exact() {
    let predictor = UniformPredictor::default();
    let options = test_options().with_num_threads(8);
    let mut search = Search::new(&predictor, Board::new(7.5), options).unwrap();

    search.simulate(1000).unwrap();

    assert!(search.root_visits() >= 1000);
    check_quiescent(search.root());

    // the root priors survived expansion normalized
    let mut priors = search.root().priors().iter()
        .map(|&(_, prior)| prior)
        .collect::<Vec<f32>>();

    assert!((sum_finite_f32(&priors) - 1.0).abs() < 1e-4);
    priors.retain(|&p| p < 0.0);
    assert!(priors.is_empty());
}

#[test]
fn s5_superko_moves_are_never_searched() {
    // two kos; black takes the first, white answers by taking the second,
    // black passes, and white takes the first ko back. re-taking the
    // second ko would now restore the starting position.
    let mut board = Board::new(7.5);
    board.place(Color::Black, from_xy(1, 0));
    board.place(Color::Black, from_xy(0, 1));
    board.place(Color::Black, from_xy(1, 2));
    board.place(Color::White, from_xy(2, 0));
    board.place(Color::White, from_xy(3, 1));
    board.place(Color::White, from_xy(2, 2));
    board.place(Color::White, from_xy(1, 1));
    board.place(Color::Black, from_xy(6, 0));
    board.place(Color::Black, from_xy(5, 1));
    board.place(Color::Black, from_xy(6, 2));
    board.place(Color::White, from_xy(7, 0));
    board.place(Color::White, from_xy(8, 1));
    board.place(Color::White, from_xy(7, 2));
    board.place(Color::Black, from_xy(7, 1));

    let board = board
        .play(from_xy(2, 1))
        .play(from_xy(6, 1))
        .play(PASS)
        .play(from_xy(1, 1));
    let repeating = from_xy(7, 1);

    assert_eq!(board.to_move(), Color::Black);
    assert!(board.is_superko(repeating));

    let predictor = UniformPredictor::default();
    let mut search = Search::new(&predictor, board.clone(), test_options()).unwrap();

    assert!(search.root().priors().iter().any(|&(vertex, _)| vertex == repeating));

    search.prune_superkos();

    assert!(search.root().priors().iter().all(|&(vertex, _)| vertex != repeating));

    search.simulate(10).unwrap();

    for &(vertex, _) in search.visit_distribution().iter() {
        assert!(vertex != repeating);
        assert!(vertex == PASS || !board.is_superko(vertex));
    }
}

#[test]
fn s6_root_noise_raises_the_visit_entropy() {
    // ten candidate moves with one dominant prior; without noise the
    // search concentrates on it, with noise some other move receives a
    // quarter of the prior mass most of the time
    let candidates = (0..10)
        .map(|i| (from_xy(2 * i, 2 * i), if i == 0 { 0.91 } else { 0.01 }))
        .collect::<Vec<(usize, f32)>>();
    let predictor = PinnedPredictor::new(&candidates, 0.0);
    let options = test_options().with_c_puct(5.0);

    let mut baseline = Search::new(&predictor, Board::new(7.5), options.clone()).unwrap();
    baseline.simulate(1000).unwrap();
    let unnoised = entropy(&baseline.visit_distribution());

    let num_runs = 10u64;
    let mut total = 0.0;

    for i in 0..num_runs {
        let options = options.clone().with_random_seed(0x5eed + i);
        let (epsilon, alpha) = (options.noise_epsilon, options.noise_alpha);
        let mut search = Search::new(&predictor, Board::new(7.5), options).unwrap();

        search.apply_root_noise(epsilon, alpha);
        search.simulate(1000).unwrap();

        total += entropy(&search.visit_distribution());
    }

    let noised = total / num_runs as f32;

    assert!(
        noised > unnoised + 0.05,
        "noised entropy {} is not above unnoised entropy {}",
        noised, unnoised
    );
}
