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

use std::collections::HashMap;

use sente_go::vertex::from_xy;
use sente_go::Board;
use sente_mcts::Search;

use crate::common::*;

#[test]
fn p8_sampled_moves_converge_to_the_visit_distribution() {
    let a = from_xy(3, 3);
    let b = from_xy(9, 9);
    let c = from_xy(15, 15);
    let predictor = PinnedPredictor::new(&[(a, 0.7), (b, 0.2), (c, 0.1)], 0.0);
    let options = test_options().with_c_puct(5.0);
    let mut search = Search::new(&predictor, Board::new(7.5), options).unwrap();

    search.simulate(100).unwrap();

    let expected = search.visit_distribution().into_iter()
        .filter(|&(_, share)| share > 0.0)
        .collect::<HashMap<usize, f32>>();
    let num_samples = 2000;
    let mut count: HashMap<usize, usize> = HashMap::new();

    for _ in 0..num_samples {
        *count.entry(search.sampled_move()).or_insert(0) += 1;
    }

    for (&vertex, &share) in expected.iter() {
        let frequency = *count.get(&vertex).unwrap_or(&0) as f32 / num_samples as f32;

        assert!(
            (frequency - share).abs() < 0.05,
            "expected {} ± 0.05 at {}, got {}",
            share, vertex, frequency
        );
    }
}

#[test]
fn p9_thread_count_does_not_change_the_verdict() {
    let a = from_xy(3, 3);
    let b = from_xy(9, 9);
    let c = from_xy(15, 15);
    let predictor = PinnedPredictor::new(&[(a, 0.7), (b, 0.2), (c, 0.1)], 0.0);

    let mut single = Search::new(
        &predictor,
        Board::new(7.5),
        test_options().with_c_puct(5.0).with_num_threads(1)
    ).unwrap();
    let mut parallel = Search::new(
        &predictor,
        Board::new(7.5),
        test_options().with_c_puct(5.0).with_num_threads(8)
    ).unwrap();

    single.simulate(400).unwrap();
    parallel.simulate(400).unwrap();

    assert_eq!(single.best_move(), parallel.best_move());

    // the visit distributions agree within a statistical tolerance
    for &vertex in &[a, b, c] {
        let share_single = single.visit_distribution().into_iter()
            .find(|&(other, _)| other == vertex)
            .map(|(_, share)| share)
            .unwrap();
        let share_parallel = parallel.visit_distribution().into_iter()
            .find(|&(other, _)| other == vertex)
            .map(|(_, share)| share)
            .unwrap();

        assert!(
            (share_single - share_parallel).abs() < 0.1,
            "shares diverge at {}: {} vs {}",
            vertex, share_single, share_parallel
        );
    }
}
