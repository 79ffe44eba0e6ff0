// ShotDeck - Library Entry Point
//
// Samples stills from a video at a fixed interval, drops exact duplicates,
// and bundles the rest into a PDF with an optional transcript.

pub mod constants;
pub mod error;
pub mod tools;
pub mod timegrid;
pub mod hash;
pub mod paths;
pub mod progress;
pub mod metadata;
pub mod acquire;
pub mod extract;
pub mod dedup;
pub mod document;
pub mod transcript;
pub mod report;
pub mod pipeline;

pub use error::{Result, ShotDeckError};
pub use pipeline::{Collaborators, Pipeline, PipelineRequest, PipelineState};
pub use report::PipelineReport;
