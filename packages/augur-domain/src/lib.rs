pub mod evidence;
pub mod fixture;
pub mod narrative;
pub mod parse;
pub mod percent;
pub mod prediction;
pub mod prompt;
pub mod record;
pub mod stats;
pub mod time_serde;

pub use evidence::{Branch, EvidenceFragment, Reachability, RetrievedContext, SourceKind};
pub use fixture::{Fixture, FixtureReject, TeamRef};
pub use parse::{Field, ParseReport, ParsedResponse};
pub use percent::Percentage;
pub use prediction::{Pathway, PredictionDraft};
pub use prompt::{Persona, PromptInput, Selection, Tone};
pub use record::{MatchRecord, MatchStatus};
pub use stats::{FormEntry, FormSummary, HeadToHeadSummary, MatchResult};
