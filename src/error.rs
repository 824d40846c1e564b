use thiserror::Error;

use crate::registry::MatchId;

#[derive(Error, Debug)]
pub enum HeroError {
    #[error("frame set does not match tracked ids (missing: {missing:?}, unexpected: {unexpected:?})")]
    PartialFrameSet {
        missing: Vec<MatchId>,
        unexpected: Vec<MatchId>,
    },
    #[error("a transition cycle is already in flight on this state")]
    CycleInFlight,
    #[error("destinations not ready after {waited:.2}s (missing: {missing:?})")]
    ReadinessTimeout { waited: f32, missing: Vec<MatchId> },
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, HeroError>;
