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

use super::TimeStrategy;
use crate::tree;

/// A budget that is exhausted once the root has accumulated the given
/// number of visits.
#[derive(Clone)]
pub struct RolloutLimit {
    limit: i32
}

impl RolloutLimit {
    pub fn new(limit: usize) -> RolloutLimit {
        RolloutLimit {
            limit: ::std::cmp::min(limit, i32::max_value() as usize) as i32
        }
    }
}

impl TimeStrategy for RolloutLimit {
    fn is_done(&self, root: &tree::Node) -> bool {
        root.visits() >= self.limit
    }
}
