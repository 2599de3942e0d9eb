mod check_captcha;
mod history;
mod init_db;
mod search;

pub use check_captcha::cmd_check_captcha;
pub use history::cmd_history;
pub use init_db::{cmd_init_db, insert_sample_cases};
pub use search::cmd_search;
