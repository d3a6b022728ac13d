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

use std::time::{Duration, Instant};

use super::TimeStrategy;
use crate::tree;

/// A budget that is exhausted at a fixed point in time.
#[derive(Clone)]
pub struct Deadline {
    expires_at: Instant
}

impl Deadline {
    pub fn new(expires_at: Instant) -> Deadline {
        Deadline { expires_at }
    }

    /// Returns a deadline the given duration from now.
    ///
    /// # Arguments
    ///
    /// * `duration` -
    ///
    pub fn within(duration: Duration) -> Deadline {
        Deadline::new(Instant::now() + duration)
    }
}

impl TimeStrategy for Deadline {
    fn is_done(&self, _root: &tree::Node) -> bool {
        Instant::now() >= self.expires_at
    }
}
