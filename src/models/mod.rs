pub mod case;

pub use case::{
    CaseRecord, Dashboard, HistoryPage, Parties, ScrapedCase, ScrapedOrder, SearchStats,
};
