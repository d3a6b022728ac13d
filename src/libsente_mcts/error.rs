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

use std::error;
use std::fmt;

/// The errors a search can surface. Contended expansions are not errors,
/// they are recovered quietly inside the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The predictor returned a policy of the wrong length.
    WeightsMismatch { expected: usize, actual: usize },

    /// The search was cancelled through its stop signal.
    Cancelled
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::WeightsMismatch { expected, actual } => {
                write!(fmt, "predictor returned a policy of length {} (expected {})", actual, expected)
            },
            Error::Cancelled => write!(fmt, "the search was cancelled")
        }
    }
}

impl error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let reason = Error::WeightsMismatch { expected: 362, actual: 100 };

        assert_eq!(
            format!("{}", reason),
            "predictor returned a policy of length 100 (expected 362)"
        );
    }
}
