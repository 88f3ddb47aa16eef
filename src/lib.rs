// src/lib.rs
//
// Driving-behavior analysis over vehicle telemetry.
//
// Signal flow:
//
//   RawSample buffer
//        |
//   cleanser  (parse, validate, dedup, gap-fill, calibrate)
//        |
//   features  (median smoothing, acceleration magnitude, Haversine distance)
//        |
//   segmenter (distance-bounded chunks)
//        |
//   classifier (priority-ordered event rules, per chunk)
//        |
//   scorer    (weighted penalties, 100-point scale)
//        |
//   AnalysisReport

pub mod classifier;
pub mod cleanser;
pub mod config;
pub mod error;
pub mod features;
pub mod pipeline;
pub mod rolling;
pub mod scorer;
pub mod segmenter;
pub mod types;

pub use classifier::EventCounts;
pub use config::{AnalysisConfig, ClassifierConfig};
pub use error::{AnalysisError, Result};
pub use pipeline::{analyze, AnalysisReport};
pub use scorer::ScoreWeights;
pub use types::{ChunkResult, CleanSample, EnrichedSample, Label, LabeledSample, RawSample};
