pub mod case_service;
pub mod case_service_impl;
pub use case_service::{CaseError, CaseService, FailureKind, SearchOutcome};
pub use case_service_impl::SeaOrmCaseService;

pub mod pdf;
pub use pdf::{OrderArchive, PdfError, PdfService, StoredPdf};
