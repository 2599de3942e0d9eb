use crate::api::validation;
use crate::config::Config;
use crate::services::SearchOutcome;
use crate::state::SharedState;
use crate::views::display_date;

pub async fn cmd_search(
    config: &Config,
    case_type: &str,
    case_number: &str,
    filing_year: &str,
) -> anyhow::Result<()> {
    let query = validation::search_query(
        case_type,
        case_number,
        filing_year,
        &config.scraper.case_types,
    )?;

    println!("Searching for: {query}");

    let state = SharedState::new(config.clone()).await?;
    let outcome = state.case_service.search(&query).await?;

    println!("{}", outcome.user_message());
    println!("Recorded as search #{}", outcome.case_id());

    let SearchOutcome::Found(record) = outcome else {
        return Ok(());
    };

    if let Some(detail) = &record.detail {
        println!();
        println!(
            "  Parties:      {} vs. {}",
            detail.parties_plaintiff.as_deref().unwrap_or("N/A"),
            detail.parties_defendant.as_deref().unwrap_or("N/A")
        );
        println!(
            "  Filed:        {}",
            display_date(detail.filing_date.as_deref())
        );
        println!(
            "  Next hearing: {}",
            display_date(detail.next_hearing_date.as_deref())
        );
        println!(
            "  Status:       {}",
            detail.case_status.as_deref().unwrap_or("Unknown")
        );
    }

    if record.orders.is_empty() {
        println!("  No orders listed.");
    } else {
        println!();
        println!("Orders:");
        for order in &record.orders {
            println!(
                "• [{}] {} {}",
                order.id,
                display_date(order.order_date.as_deref()),
                order.order_type.as_deref().unwrap_or("Order")
            );
            if let Some(url) = &order.pdf_url {
                println!("  {url}");
            }
        }
    }

    Ok(())
}
