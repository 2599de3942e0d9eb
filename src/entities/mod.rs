pub mod prelude;

pub mod case_details;
pub mod cases;
pub mod orders;
