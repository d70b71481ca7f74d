pub mod narrative;

pub use narrative::{Narrative, NarrativeCase, explain};
