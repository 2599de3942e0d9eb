pub use super::case_details::Entity as CaseDetails;
pub use super::cases::Entity as Cases;
pub use super::orders::Entity as Orders;
