pub mod candidates;
pub mod canonical;
pub mod concept;
pub mod guesser;
pub mod index;
pub mod matcher;
pub mod similarity;
pub mod title;
pub mod transcript;

pub use candidates::{Candidate, CandidateSource, extract_candidates};
pub use canonical::{ColonPolicy, canonicalize, canonicalize_bytes, canonicalize_opt};
pub use concept::ConceptRef;
pub use guesser::{Guess, GuessPattern, NameGuesser};
pub use index::{ConceptIndex, ConceptVariant, KeyCollision, build_variants};
pub use matcher::{MatchClass, MatchOutcome, MatchResult, MatchThresholds, Matcher, VariantHit};
pub use title::{placeholder_title, title_looks_bad};
pub use transcript::EpisodeSplitter;
