use chrono::NaiveDate;
use serde_json::json;

use crate::config::Config;
use crate::constants::defaults::CASE_TYPES;
use crate::db::{NewSearch, Store};
use crate::domain::{CaseStatus, SearchQuery, current_year};
use crate::models::{Parties, ScrapedCase, ScrapedOrder};

pub async fn cmd_init_db(config: &Config, sample: bool) -> anyhow::Result<()> {
    println!("Creating database tables...");
    let store = Store::new(&config.general.database_path).await?;
    println!("✓ Database ready at {}", config.general.database_path);

    if !sample {
        return Ok(());
    }

    if store.count_cases().await? > 0 {
        println!("✓ Searches already recorded, skipping sample data");
        return Ok(());
    }

    let inserted = insert_sample_cases(&store).await?;
    println!("✓ Inserted {inserted} sample searches");

    let stats = store.search_stats().await?;
    println!();
    println!("Database Summary:");
    println!("  Total searches: {}", stats.total);
    println!("  Found:          {}", stats.found);
    println!("  Not found:      {}", stats.not_found);
    println!("  Orders:         {}", store.count_orders().await?);

    Ok(())
}

fn date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn sample_query(case_type: &str, number: &str, year: &str) -> anyhow::Result<SearchQuery> {
    let known: Vec<String> = CASE_TYPES.iter().map(|s| (*s).to_string()).collect();
    Ok(SearchQuery::parse(
        case_type,
        number,
        year,
        &known,
        current_year(),
    )?)
}

/// Records two found cases and one miss for trying out the dashboard.
pub async fn insert_sample_cases(store: &Store) -> anyhow::Result<usize> {
    let samples = [
        (
            sample_query("Civil Appeal", "1234", "2023")?,
            ScrapedCase {
                parties: Parties {
                    plaintiff: "ABC Corporation Ltd.".to_string(),
                    defendant: "XYZ Industries Pvt. Ltd.".to_string(),
                },
                filing_date: date(2023, 3, 15),
                next_hearing: date(2024, 1, 20),
                status: "Pending".to_string(),
                orders: vec![ScrapedOrder {
                    date: date(2023, 6, 10),
                    order_type: "Interim Order".to_string(),
                    pdf_url: "https://example.com/order1.pdf".to_string(),
                }],
            },
        ),
        (
            sample_query("Criminal Appeal", "5678", "2022")?,
            ScrapedCase {
                parties: Parties {
                    plaintiff: "State of Delhi".to_string(),
                    defendant: "John Doe".to_string(),
                },
                filing_date: date(2022, 8, 5),
                next_hearing: date(2023, 12, 15),
                status: "Under Trial".to_string(),
                orders: vec![ScrapedOrder {
                    date: date(2023, 1, 25),
                    order_type: "Judgment".to_string(),
                    pdf_url: "https://example.com/judgment1.pdf".to_string(),
                }],
            },
        ),
    ];

    let mut inserted = 0;
    for (query, case) in &samples {
        store
            .insert_search(NewSearch {
                query,
                status: CaseStatus::Found,
                response_data: Some(json!({ "success": true, "sample": true }).to_string()),
                scraped: Some(case),
            })
            .await?;
        inserted += 1;
    }

    let missing = sample_query("Civil Writ Petition", "9999", "2023")?;
    store
        .insert_search(NewSearch {
            query: &missing,
            status: CaseStatus::NotFound,
            response_data: Some(
                json!({ "success": false, "error": "Case not found" }).to_string(),
            ),
            scraped: None,
        })
        .await?;

    Ok(inserted + 1)
}
