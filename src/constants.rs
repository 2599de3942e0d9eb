pub mod search {

    pub const MIN_FILING_YEAR: i32 = 1950;

    pub const MAX_CASE_NUMBER_DIGITS: usize = 10;

    /// Shortest digit run accepted as a numeric CAPTCHA.
    pub const MIN_CAPTCHA_DIGITS: usize = 3;
}

pub mod limits {

    pub const PARTY_TEXT_MAX_CHARS: usize = 500;

    pub const CASE_STATUS_MAX_CHARS: usize = 100;

    pub const ORDER_TYPE_MAX_CHARS: usize = 100;

    pub const PDF_URL_MAX_CHARS: usize = 500;

    pub const FILENAME_MAX_CHARS: usize = 100;

    pub const RECENT_CASES: u64 = 10;

    pub const DEFAULT_HISTORY_PAGE_SIZE: u64 = 20;

    pub const MAX_HISTORY_PAGE_SIZE: u64 = 100;
}

pub mod defaults {

    pub const CASE_STATUS: &str = "Active";

    pub const ORDER_TYPE: &str = "Order";

    pub const MISSING_PARTY: &str = "N/A";

    pub const CASE_TYPES: &[&str] = &[
        "Civil Appeal",
        "Criminal Appeal",
        "Civil Writ Petition",
        "Criminal Writ Petition",
        "Company Appeal",
        "Tax Appeal",
        "Service Matter",
        "Arbitration Petition",
        "Contempt Petition",
        "Execution Petition",
        "Regular Civil Suit",
        "Summary Civil Suit",
        "Miscellaneous Application",
        "Criminal Revision",
        "Criminal Misc.",
        "Bail Application",
    ];
}
