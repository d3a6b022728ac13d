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

extern crate crossbeam_utils;
#[macro_use] extern crate lazy_static;
extern crate ordered_float;
extern crate rand;
extern crate rand_distr;
extern crate sente_go;
extern crate sente_utils;

/* -------- Modules -------- */

mod choose;
mod dirichlet;
mod error;
pub mod options;
pub mod predict;
pub mod time_control;
pub mod tree;

/* -------- Exports -------- */

pub use self::error::Error;

/* -------- Code -------- */

use crossbeam_utils::thread::scope;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use sente_go::vertex::PASS;
use sente_go::{Board, Color};

use crate::options::SearchOptions;
use crate::predict::Predictor;
use crate::time_control::{Deadline, RolloutLimit, TimeStrategy};
use crate::tree::{ExpandResult, Node};

/// Returns the value of a finished game from black's point of view.
///
/// # Arguments
///
/// * `board` -
///
fn terminal_value(board: &Board) -> f64 {
    let score = board.score();

    if score > 0.0 {
        1.0
    } else if score < 0.0 {
        0.0
    } else {
        0.5  // jigo
    }
}

/// The shared variables between the worker threads of a single search.
struct ThreadContext<'a, P: Predictor, T: TimeStrategy> {
    /// The root of the monte carlo tree.
    root: &'a Node,

    /// The initial board position at the root of the tree.
    starting_point: &'a Board,

    /// The search options to use.
    options: &'a SearchOptions,

    /// The predictor to use for leaf evaluations.
    predictor: &'a P,

    /// Time control element.
    time_strategy: &'a T,

    /// Set to cancel the search.
    stop: &'a AtomicBool,

    /// The first fatal error raised by any worker.
    failure: &'a Mutex<Option<Error>>
}

impl<'a, P: Predictor, T: TimeStrategy> Clone for ThreadContext<'a, P, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, P: Predictor, T: TimeStrategy> Copy for ThreadContext<'a, P, T> {}

/// Worker that descends into the given monte carlo search tree until the
/// time strategy is exhausted or the search is cancelled.
///
/// # Arguments
///
/// * `context` -
/// * `rng` -
///
fn search_worker<P, T>(context: ThreadContext<P, T>, mut rng: SmallRng)
    where P: Predictor,
          T: TimeStrategy
{
    while !context.stop.load(Ordering::Relaxed) && !context.time_strategy.is_done(context.root) {
        let vl = context.options.virtual_loss;
        let mut board = context.starting_point.clone();
        let mut stack = Vec::with_capacity(64);
        let mut node = context.root;

        node.enter_node(vl, 0, 0.0);
        stack.push(node);

        let value = loop {
            if !node.has_children() {
                match node.create_children(&board, context.predictor, context.options, &mut rng) {
                    Ok(ExpandResult::Expanded(value)) => break Some(value as f64),
                    Ok(ExpandResult::Terminal) => break Some(terminal_value(&board)),
                    Ok(ExpandResult::Expanding) => break None,
                    Ok(ExpandResult::AlreadyExpanded) => {},
                    Err(reason) => {
                        context.failure.lock()
                            .expect("could not acquire failure lock")
                            .get_or_insert(reason);
                        context.stop.store(true, Ordering::Relaxed);
                        break None
                    }
                }
            }

            match node.uct_select_child(board.to_move(), context.options) {
                Some(child) => {
                    child.enter_node(vl, 0, 0.0);
                    board = board.play(child.vertex());
                    stack.push(child);
                    node = child;
                },
                None => break None
            }
        };

        match value {
            Some(value) => {
                for current in stack.iter().rev() {
                    current.leave_node(vl, 1, value);
                }
            },
            None => {
                // another thread holds the expansion of this leaf, back out
                // of the descent and let the expander finish
                for current in stack.iter().rev() {
                    current.leave_node(vl, 0, 0.0);
                }

                thread::yield_now();
            }
        }
    }
}

/// A cloneable handle for cancelling a running search from another thread.
#[derive(Clone)]
pub struct StopSignal {
    stop: Arc<AtomicBool>
}

impl StopSignal {
    /// Cancels the search. Any descent that has already started will
    /// complete its backpropagation, but no new descent begins.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

/// A monte carlo search tree rooted at a single board position.
///
/// The handle owns the tree and the position; the predictor is shared and
/// must be thread-safe. All statistics inside the tree are kept from
/// black's point of view.
pub struct Search<'a, P: Predictor> {
    predictor: &'a P,
    options: SearchOptions,
    starting_point: Board,
    root: Node,
    stop: Arc<AtomicBool>,
    rng: SmallRng
}

impl<'a, P: Predictor> Search<'a, P> {
    /// Returns a new search rooted at the given position. The root node is
    /// expanded synchronously unless the game is already over.
    ///
    /// # Arguments
    ///
    /// * `predictor` -
    /// * `starting_point` -
    /// * `options` -
    ///
    pub fn new(predictor: &'a P, starting_point: Board, options: SearchOptions) -> Result<Self, Error> {
        let rng = SmallRng::seed_from_u64(options.random_seed);
        let mut out = Self {
            predictor: predictor,
            root: Node::new(PASS, 1.0, 0.5),
            starting_point: starting_point,
            stop: Arc::new(AtomicBool::new(false)),
            rng: rng,
            options: options
        };

        out.ensure_root()?;
        Ok(out)
    }

    /// Returns true if the game at the root is over.
    fn is_over(&self) -> bool {
        self.starting_point.passes() >= 2
    }

    /// Expands the root node synchronously, unless the game is over or it
    /// has already been expanded.
    fn ensure_root(&mut self) -> Result<(), Error> {
        if self.is_over() || self.root.has_children() {
            return Ok(());
        }

        self.root
            .create_children(&self.starting_point, self.predictor, &self.options, &mut self.rng)
            .map(|_| ())
    }

    /// Mixes dirichlet noise into the root priors. Must be called before
    /// any simulation has run.
    ///
    /// # Arguments
    ///
    /// * `epsilon` - the fraction of the priors replaced by noise
    /// * `alpha` - the shape of the gamma distribution
    ///
    pub fn apply_root_noise(&mut self, epsilon: f32, alpha: f32) {
        if self.is_over() {
            return;
        }

        self.root.dirichlet_noise(epsilon, alpha, &mut self.rng);
    }

    /// Removes every root child that would re-create an earlier board
    /// position. Must be called before any simulation has run.
    pub fn prune_superkos(&mut self) {
        if self.is_over() {
            return;
        }

        self.root.kill_superkos(&self.starting_point);
    }

    /// Runs descents until the given time strategy is exhausted. On a
    /// finished position this is a no-op.
    ///
    /// # Arguments
    ///
    /// * `time_strategy` -
    ///
    fn run<T: TimeStrategy + Sync>(&mut self, time_strategy: &T) -> Result<(), Error> {
        if self.is_over() || !self.root.has_children() {
            return Ok(());
        }

        self.stop.store(false, Ordering::Relaxed);

        let failure = Mutex::new(None);
        let context = ThreadContext {
            root: &self.root,
            starting_point: &self.starting_point,
            options: &self.options,
            predictor: self.predictor,
            time_strategy: time_strategy,
            stop: &self.stop,
            failure: &failure
        };
        let num_workers = ::std::cmp::max(1, self.options.num_threads);
        let base_seed = self.options.random_seed;
        let worker_rng = |i: usize| SmallRng::seed_from_u64(base_seed.wrapping_add(1 + i as u64));

        if num_workers <= 1 {
            search_worker(context, worker_rng(0));
        } else {
            scope(|s| {
                for i in 0..num_workers {
                    let rng = worker_rng(i);

                    s.spawn(move |_| search_worker(context, rng));
                }
            }).expect("could not join the worker threads");
        }

        #[cfg(feature = "trace-search")]
        eprintln!("{}", tree::dump(&self.root, self.starting_point.to_move()));

        let failure_reason = failure.lock().expect("could not acquire failure lock").take();

        if let Some(reason) = failure_reason {
            Err(reason)
        } else if self.stop.load(Ordering::Relaxed) {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Runs the given number of additional descents.
    ///
    /// # Arguments
    ///
    /// * `count` -
    ///
    pub fn simulate(&mut self, count: usize) -> Result<(), Error> {
        let limit = (self.root.visits() as usize).saturating_add(count);

        self.run(&RolloutLimit::new(limit))
    }

    /// Runs descents until the given deadline.
    ///
    /// # Arguments
    ///
    /// * `deadline` -
    ///
    pub fn run_until(&mut self, deadline: Instant) -> Result<(), Error> {
        self.run(&Deadline::new(deadline))
    }

    /// Returns a handle for cancelling this search from another thread.
    pub fn stop_signal(&self) -> StopSignal {
        StopSignal { stop: self.stop.clone() }
    }

    /// Returns the most visited move of the root, or `PASS` if the game is
    /// over.
    pub fn best_move(&self) -> usize {
        if self.is_over() || !self.root.has_children() {
            PASS
        } else {
            self.root.best(self.starting_point.to_move())
        }
    }

    /// Returns a move sampled proportionally to the root visit counts, or
    /// `PASS` if the game is over.
    pub fn sampled_move(&mut self) -> usize {
        if self.is_over() || !self.root.has_children() {
            PASS
        } else {
            self.root.randomize_first_proportionally(&mut self.rng)
        }
    }

    /// Returns every root move together with its share of the visits.
    pub fn visit_distribution(&self) -> Vec<(usize, f32)> {
        self.root.visit_distribution()
    }

    /// Returns the number of completed descents.
    pub fn root_visits(&self) -> i32 {
        self.root.visits()
    }

    /// Returns the moves along the most visited path of the tree.
    pub fn principal_variation(&self) -> Vec<usize> {
        self.root.principal_variation(self.starting_point.to_move())
    }

    /// Returns the root of the search tree.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Returns the position at the root of the search tree.
    pub fn starting_point(&self) -> &Board {
        &self.starting_point
    }

    /// Returns the color whose turn it is to play at the root.
    pub fn to_move(&self) -> Color {
        self.starting_point.to_move()
    }

    /// Plays the given move at the root, re-using the subtree of the
    /// played move if it has been materialized and discarding the rest of
    /// the tree.
    ///
    /// # Arguments
    ///
    /// * `vertex` -
    ///
    pub fn advance(&mut self, vertex: usize) -> Result<(), Error> {
        self.starting_point = self.starting_point.play(vertex);
        self.root = match self.root.take_child(vertex) {
            Some(child) => child,
            None => Node::new(PASS, 1.0, 0.5)
        };

        self.ensure_root()
    }
}
