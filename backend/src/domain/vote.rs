//! Vote direction parsing.

use std::fmt;
use std::str::FromStr;

/// Raised when a vote direction is neither `up` nor `down`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidVoteDirection;

impl fmt::Display for InvalidVoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid vote direction. Must be \"up\" or \"down\"")
    }
}

impl std::error::Error for InvalidVoteDirection {}

/// Direction of a single vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// Signed change applied to the answer's score.
    pub const fn delta(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }

    /// Verb used in the owner's notification.
    pub const fn past_tense(self) -> &'static str {
        match self {
            Self::Up => "upvoted",
            Self::Down => "downvoted",
        }
    }
}

impl FromStr for VoteDirection {
    type Err = InvalidVoteDirection;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            _ => Err(InvalidVoteDirection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("up", VoteDirection::Up, 1, "upvoted")]
    #[case("down", VoteDirection::Down, -1, "downvoted")]
    fn parses_directions(
        #[case] raw: &str,
        #[case] expected: VoteDirection,
        #[case] delta: i64,
        #[case] verb: &str,
    ) {
        let direction: VoteDirection = raw.parse().expect("valid direction");
        assert_eq!(direction, expected);
        assert_eq!(direction.delta(), delta);
        assert_eq!(direction.past_tense(), verb);
    }

    #[rstest]
    #[case("")]
    #[case("UP")]
    #[case("sideways")]
    fn rejects_other_values(#[case] raw: &str) {
        assert_eq!(raw.parse::<VoteDirection>(), Err(InvalidVoteDirection));
    }
}
