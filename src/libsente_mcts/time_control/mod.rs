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

mod deadline;
mod rollout_limit;

pub use self::deadline::*;
pub use self::rollout_limit::*;

use crate::tree;

/// The budget of a search. Scheduling policy on top of these hooks, for
/// example clock management, is the caller's concern.
pub trait TimeStrategy {
    /// Returns true if no further descent should begin.
    ///
    /// # Arguments
    ///
    /// * `root` - the root of the search tree.
    ///
    fn is_done(&self, root: &tree::Node) -> bool;
}
