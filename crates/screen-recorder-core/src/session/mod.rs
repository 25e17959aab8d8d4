mod controller;
mod outcome;
mod writer;

pub use {
    controller::SessionController,
    outcome::{FinalizedSession, SessionInfo, SessionRequest, StopOutcome},
    writer::WriterSummary,
};
