pub mod court;

pub use court::{CaptchaProbe, CaseSource, CourtClient, ScrapeError};
