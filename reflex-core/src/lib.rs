pub mod draft;
pub mod mode;
pub mod phase;
pub mod stimulus;
pub mod trial;

pub use draft::RecordDraft;
pub use mode::{Difficulty, Mode};
pub use phase::{Phase, ResultKind};
pub use stimulus::{Color, Stimulus};
pub use trial::{Trial, TrialOutcome};
