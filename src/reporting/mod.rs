pub mod ranking;
pub mod types;

pub use ranking::{build_report, rank_moods, top_mood};
pub use types::{IdentitySummary, MoodReport, RankedMood};
