use crate::config::Config;
use crate::db::Store;
use crate::views::display_timestamp;

pub async fn cmd_history(config: &Config, limit: u64) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let cases = store.recent_cases(limit).await?;

    if cases.is_empty() {
        println!("No searches recorded yet.");
        return Ok(());
    }

    let stats = store.search_stats().await?;

    println!("Recent Searches (last {}):", cases.len());
    println!("{:-<70}", "");

    for case in cases {
        println!(
            "• #{} {} {}/{}",
            case.id, case.case_type, case.case_number, case.filing_year
        );
        println!(
            "  Status: {} | {}",
            case.status,
            display_timestamp(&case.search_timestamp)
        );
    }

    println!("{:-<70}", "");
    println!(
        "Total: {} | Found: {} | Not found: {} | Errors: {}",
        stats.total, stats.found, stats.not_found, stats.error
    );

    Ok(())
}
