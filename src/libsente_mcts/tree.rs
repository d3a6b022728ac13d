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

use ordered_float::OrderedFloat;
use rand::rngs::SmallRng;
use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;

use sente_go::vertex::PASS;
use sente_go::{Board, Color};

use crate::choose;
use crate::dirichlet;
use crate::error::Error;
use crate::options::SearchOptions;
use crate::predict::{self, Predictor};

/// The outcome of an expansion attempt.
pub enum ExpandResult {
    /// This thread performed the expansion; the payload is the evaluator
    /// value from black's point of view.
    Expanded(f32),

    /// The node already had children when we got to it.
    AlreadyExpanded,

    /// Another thread holds the expansion of this node.
    Expanding,

    /// The position is finished and has no children.
    Terminal
}

/// One logical child of a node. The first `materialized` entries of the
/// child vector, and only those, carry an allocated node.
struct Edge {
    vertex: usize,
    prior: f32,
    valid: bool,
    node: Option<Box<Node>>
}

/// The fields of a node that are only read or written while holding its
/// mutex.
struct Inner {
    is_expanding: bool,
    materialized: usize,
    children: Vec<Edge>
}

/// A node of the search tree. Each node owns its children; the statistics
/// are relaxed atomics that are only written while holding the node mutex,
/// so that lock-free readers never observe torn values.
///
/// All accumulated values are stored from black's point of view,
/// `get_eval` flips them for white.
pub struct Node {
    vertex: usize,
    prior: f32,
    visits: AtomicI32,
    virtual_loss: AtomicI32,
    black_evals: AtomicU64,
    init_eval: AtomicU32,
    has_children: AtomicBool,
    inner: Mutex<Inner>
}

impl Node {
    /// Returns a new unexpanded node.
    ///
    /// # Arguments
    ///
    /// * `vertex` - the move played to enter this node
    /// * `prior` - the probability assigned to this node by its parent
    /// * `init_eval` - the first-play urgency, from black's point of view
    ///
    pub fn new(vertex: usize, prior: f32, init_eval: f32) -> Node {
        Node {
            vertex: vertex,
            prior: prior,
            visits: AtomicI32::new(0),
            virtual_loss: AtomicI32::new(0),
            black_evals: AtomicU64::new(0f64.to_bits()),
            init_eval: AtomicU32::new(init_eval.to_bits()),
            has_children: AtomicBool::new(false),
            inner: Mutex::new(Inner {
                is_expanding: false,
                materialized: 0,
                children: vec! []
            })
        }
    }

    /// Returns the move played to enter this node.
    pub fn vertex(&self) -> usize {
        self.vertex
    }

    /// Returns the probability assigned to this node by its parent.
    pub fn prior(&self) -> f32 {
        self.prior
    }

    /// Returns the number of backpropagations through this node.
    pub fn visits(&self) -> i32 {
        self.visits.load(Ordering::Relaxed)
    }

    /// Returns the virtual loss currently held by in-flight descents.
    pub fn virtual_loss(&self) -> i32 {
        self.virtual_loss.load(Ordering::Relaxed)
    }

    /// Returns the sum of all values backpropagated through this node, from
    /// black's point of view.
    pub fn black_evals(&self) -> f64 {
        f64::from_bits(self.black_evals.load(Ordering::Relaxed))
    }

    fn init_eval(&self) -> f32 {
        f32::from_bits(self.init_eval.load(Ordering::Relaxed))
    }

    /// Returns true if this node has been expanded.
    pub fn has_children(&self) -> bool {
        self.has_children.load(Ordering::Relaxed)
    }

    /// Returns the win rate of this node for the given color, including the
    /// virtual loss of any in-flight descents. An unvisited node returns
    /// its first-play urgency.
    ///
    /// # Arguments
    ///
    /// * `color` -
    ///
    pub fn get_eval(&self, color: Color) -> f32 {
        let visits = self.visits();
        let virtual_loss = self.virtual_loss();
        let total = visits + virtual_loss;

        let score = if total == 0 {
            self.init_eval() as f64
        } else {
            // `black_evals` is from black's point of view, so an in-flight
            // descent counts as a loss for black and a win for white
            let evals = self.black_evals() + if color == Color::White {
                virtual_loss as f64
            } else {
                0.0
            };

            evals / total as f64
        };

        match color {
            Color::Black => score as f32,
            Color::White => (1.0 - score) as f32
        }
    }

    /// Registers an in-flight descent through this node. The statistics are
    /// max-merged rather than added so that the same call can restore a
    /// snapshot of a re-used subtree.
    ///
    /// # Arguments
    ///
    /// * `vl` - the virtual loss to add
    /// * `initial_visits` -
    /// * `initial_evals` -
    ///
    pub fn enter_node(&self, vl: i32, initial_visits: i32, initial_evals: f64) {
        let _inner = self.inner.lock().expect("could not acquire node lock");

        self.visits.fetch_max(initial_visits, Ordering::Relaxed);

        if initial_evals > self.black_evals() {
            self.black_evals.store(initial_evals.to_bits(), Ordering::Relaxed);
        }

        self.virtual_loss.fetch_add(vl, Ordering::Relaxed);
    }

    /// Unregisters an in-flight descent through this node, crediting it
    /// with the given statistics.
    ///
    /// # Arguments
    ///
    /// * `vl` - the virtual loss to remove
    /// * `added_visits` -
    /// * `added_evals` -
    ///
    pub fn leave_node(&self, vl: i32, added_visits: i32, added_evals: f64) {
        let _inner = self.inner.lock().expect("could not acquire node lock");

        self.visits.fetch_add(added_visits, Ordering::Relaxed);
        self.black_evals.store(
            (self.black_evals() + added_evals).to_bits(),
            Ordering::Relaxed
        );

        let previous = self.virtual_loss.fetch_sub(vl, Ordering::Relaxed);
        debug_assert!(previous >= vl);
    }

    /// Expands this node by querying the predictor, installing the returned
    /// priors as children. At most one thread performs the expansion,
    /// everyone else returns without work.
    ///
    /// # Arguments
    ///
    /// * `board` - the position at this node
    /// * `predictor` -
    /// * `options` -
    /// * `rng` -
    ///
    pub fn create_children<P: Predictor>(
        &self,
        board: &Board,
        predictor: &P,
        options: &SearchOptions,
        rng: &mut SmallRng
    ) -> Result<ExpandResult, Error>
    {
        if self.has_children() {
            return Ok(ExpandResult::AlreadyExpanded);
        }

        {
            let mut inner = self.inner.lock().expect("could not acquire node lock");

            if self.has_children() {
                return Ok(ExpandResult::AlreadyExpanded);
            } else if board.passes() >= 2 {
                return Ok(ExpandResult::Terminal);
            } else if inner.is_expanding {
                return Ok(ExpandResult::Expanding);
            }

            inner.is_expanding = true;
        }

        // query the predictor without holding the lock, it may block for a
        // long time
        let (mut priors, value) = predict::evaluate(
            predictor,
            board,
            options.ensemble,
            options.softmax_temp,
            rng
        )?;

        let value = if board.to_move() == Color::White {
            1.0 - value
        } else {
            value
        };

        priors.sort_by_key(|&(_, prior)| Reverse(OrderedFloat(prior)));

        {
            let mut inner = self.inner.lock().expect("could not acquire node lock");

            debug_assert!(inner.children.is_empty());

            inner.children = priors.into_iter()
                .map(|(vertex, prior)| Edge { vertex, prior, valid: true, node: None })
                .collect();

            self.init_eval.store(value.to_bits(), Ordering::Relaxed);
            self.has_children.store(true, Ordering::Relaxed);
        }

        Ok(ExpandResult::Expanded(value))
    }

    /// Returns the child that maximizes the PUCT score for the given color,
    /// materializing it on its first visit. Returns `None` if there is no
    /// valid child.
    ///
    /// # Arguments
    ///
    /// * `to_move` -
    /// * `options` -
    ///
    pub fn uct_select_child(&self, to_move: Color, options: &SearchOptions) -> Option<&Node> {
        let mut inner = self.inner.lock().expect("could not acquire node lock");
        let init_eval = self.init_eval();
        let fpu = match to_move {
            Color::Black => init_eval,
            Color::White => 1.0 - init_eval
        };

        // re-compute the visit count from the children instead of trusting
        // our own counter, so that a transplanted subtree behaves
        let parent_visits = inner.children[..inner.materialized].iter()
            .filter(|edge| edge.valid)
            .map(|edge| edge.node.as_ref().unwrap().visits())
            .sum::<i32>();
        let uct_exp = (parent_visits as f32).sqrt();

        let mut best: Option<(usize, f32)> = None;

        for (i, edge) in inner.children.iter().enumerate() {
            if !edge.valid {
                continue;
            }

            let (child_visits, win_rate) = match edge.node {
                Some(ref node) => (node.visits(), node.get_eval(to_move)),
                None => (0, fpu)
            };
            let puct = options.c_puct * edge.prior * uct_exp / (1 + child_visits) as f32;
            let score = win_rate + puct;

            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((i, score));
            }
        }

        let (chosen, _) = best?;
        debug_assert!(chosen < inner.children.len());

        // materialize the chosen child on its first visit, swapping it into
        // the materialized prefix
        let chosen = if inner.children[chosen].node.is_some() {
            chosen
        } else {
            let at = inner.materialized;

            inner.children.swap(chosen, at);
            inner.materialized += 1;

            let edge = &mut inner.children[at];
            edge.node = Some(Box::new(Node::new(edge.vertex, edge.prior, init_eval)));

            at
        };

        // the box holding the child is never dropped while this node can be
        // shared, so the reference stays valid after the lock is released
        let child: *const Node = &**inner.children[chosen].node.as_ref().unwrap();

        Some(unsafe { &*child })
    }

    /// Mixes dirichlet noise into the priors of the children of this node,
    /// which increases the entropy of the search. Must be called before any
    /// child has been materialized.
    ///
    /// # Arguments
    ///
    /// * `epsilon` -
    /// * `alpha` -
    /// * `rng` -
    ///
    pub fn dirichlet_noise(&self, epsilon: f32, alpha: f32, rng: &mut SmallRng) {
        let mut inner = self.inner.lock().expect("could not acquire node lock");

        assert_eq!(inner.materialized, 0, "noise must be applied before the search starts");

        let mut priors = inner.children.iter()
            .map(|edge| edge.prior)
            .collect::<Vec<f32>>();

        dirichlet::add(&mut priors, alpha, epsilon, rng);

        for (edge, prior) in inner.children.iter_mut().zip(priors.into_iter()) {
            edge.prior = prior;
        }
    }

    /// Removes every child whose move would re-create an earlier board
    /// position. The passing move is never pruned. Must be called before
    /// any child has been materialized.
    ///
    /// # Arguments
    ///
    /// * `board` - the position at this node
    ///
    pub fn kill_superkos(&self, board: &Board) {
        let mut inner = self.inner.lock().expect("could not acquire node lock");

        assert_eq!(inner.materialized, 0, "superkos must be pruned before the search starts");

        for edge in inner.children.iter_mut() {
            if edge.vertex != PASS && board.is_superko(edge.vertex) {
                edge.valid = false;
            }
        }

        inner.children.retain(|edge| edge.valid);
    }

    /// Picks a materialized child with probability proportional to its
    /// visit count, swaps it to the front of the child vector, and returns
    /// its move. Returns `PASS` if no child has been materialized.
    ///
    /// # Arguments
    ///
    /// * `rng` -
    ///
    pub fn randomize_first_proportionally(&self, rng: &mut SmallRng) -> usize {
        let mut inner = self.inner.lock().expect("could not acquire node lock");

        if inner.materialized == 0 {
            return PASS;
        }

        let weights = inner.children[..inner.materialized].iter()
            .map(|edge| edge.node.as_ref().unwrap().visits().max(0) as f32)
            .collect::<Vec<f32>>();
        let chosen = choose::weighted(&weights, rng).unwrap_or(0);

        if chosen != 0 {
            inner.children.swap(0, chosen);
        }

        inner.children[0].vertex
    }

    /// Returns the best move of this node, i.e. the child with the most
    /// visits, with ties broken by the higher win rate and then the higher
    /// prior. Returns `PASS` if this node has no children.
    ///
    /// # Arguments
    ///
    /// * `to_move` -
    ///
    pub fn best(&self, to_move: Color) -> usize {
        let inner = self.inner.lock().expect("could not acquire node lock");
        let init_eval = self.init_eval();
        let fpu = match to_move {
            Color::Black => init_eval,
            Color::White => 1.0 - init_eval
        };

        inner.children.iter()
            .filter(|edge| edge.valid)
            .max_by_key(|edge| {
                match edge.node {
                    Some(ref node) => (
                        node.visits(),
                        OrderedFloat(node.get_eval(to_move)),
                        OrderedFloat(edge.prior)
                    ),
                    None => (0, OrderedFloat(fpu), OrderedFloat(edge.prior))
                }
            })
            .map(|edge| edge.vertex)
            .unwrap_or(PASS)
    }

    /// Returns every child move together with its share of the total child
    /// visits.
    pub fn visit_distribution(&self) -> Vec<(usize, f32)> {
        let inner = self.inner.lock().expect("could not acquire node lock");
        let total = inner.children[..inner.materialized].iter()
            .filter(|edge| edge.valid)
            .map(|edge| edge.node.as_ref().unwrap().visits())
            .sum::<i32>();

        inner.children.iter()
            .filter(|edge| edge.valid)
            .map(|edge| {
                let visits = edge.node.as_ref().map_or(0, |node| node.visits());

                if total > 0 {
                    (edge.vertex, visits as f32 / total as f32)
                } else {
                    (edge.vertex, 0.0)
                }
            })
            .collect()
    }

    /// Returns the moves along the most visited path of this tree, with
    /// ties broken as in `best`.
    ///
    /// # Arguments
    ///
    /// * `to_move` -
    ///
    pub fn principal_variation(&self, to_move: Color) -> Vec<usize> {
        let mut moves = vec! [];
        self.collect_pv(to_move, &mut moves);
        moves
    }

    fn collect_pv(&self, to_move: Color, moves: &mut Vec<usize>) {
        let inner = self.inner.lock().expect("could not acquire node lock");
        let best = inner.children[..inner.materialized].iter()
            .filter(|edge| edge.valid)
            .max_by_key(|edge| {
                let node = edge.node.as_ref().unwrap();

                (node.visits(), OrderedFloat(node.get_eval(to_move)), OrderedFloat(edge.prior))
            });

        if let Some(edge) = best {
            let node = edge.node.as_ref().unwrap();

            if node.visits() > 0 {
                moves.push(edge.vertex);
                node.collect_pv(to_move.opposite(), moves);
            }
        }
    }

    /// Returns the number of logical children of this node.
    pub fn num_children(&self) -> usize {
        self.inner.lock().expect("could not acquire node lock").children.len()
    }

    /// Returns the number of materialized children of this node.
    pub fn num_materialized(&self) -> usize {
        self.inner.lock().expect("could not acquire node lock").materialized
    }

    /// Returns the move and prior of every logical child.
    pub fn priors(&self) -> Vec<(usize, f32)> {
        self.inner.lock().expect("could not acquire node lock").children.iter()
            .map(|edge| (edge.vertex, edge.prior))
            .collect()
    }

    /// Calls `f` with every materialized child of this node.
    ///
    /// # Arguments
    ///
    /// * `f` -
    ///
    pub fn for_each_child<F: FnMut(&Node)>(&self, mut f: F) {
        let inner = self.inner.lock().expect("could not acquire node lock");

        for edge in inner.children[..inner.materialized].iter() {
            f(edge.node.as_ref().unwrap());
        }
    }

    /// Removes and returns the materialized child that was entered by the
    /// given move, dropping the rest of the tree.
    ///
    /// # Arguments
    ///
    /// * `vertex` -
    ///
    pub fn take_child(&mut self, vertex: usize) -> Option<Node> {
        let inner = self.inner.get_mut().expect("could not acquire node lock");
        let chosen = inner.children[..inner.materialized].iter()
            .position(|edge| edge.vertex == vertex)?;

        inner.children[chosen].node.take().map(|node| *node)
    }
}

/// Returns a human readable summary of the given search tree, one child
/// per line.
///
/// # Arguments
///
/// * `root` -
/// * `to_move` -
///
pub fn dump(root: &Node, to_move: Color) -> String {
    let mut lines = vec! [format!(
        "visits {}, win rate {:.3}",
        root.visits(),
        root.get_eval(to_move)
    )];
    let mut children = root.visit_distribution();

    children.sort_by_key(|&(_, share)| Reverse(OrderedFloat(share)));

    for (vertex, share) in children.into_iter().take(10) {
        lines.push(format!("  {:>4} {:.3}", vertex, share));
    }

    lines.push(format!("  pv {:?}", root.principal_variation(to_move)));
    lines.join("\n")
}
