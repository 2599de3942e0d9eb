use crate::constants::limits::{
    CASE_STATUS_MAX_CHARS, ORDER_TYPE_MAX_CHARS, PARTY_TEXT_MAX_CHARS, PDF_URL_MAX_CHARS,
};
use crate::domain::{CaseId, CaseStatus, SearchQuery};
use crate::entities::{case_details, cases, orders, prelude::*};
use crate::models::{CaseRecord, HistoryPage, ScrapedCase, SearchStats};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tracing::debug;

use super::truncate_chars;

/// Everything needed to append one search to the history.
pub struct NewSearch<'a> {
    pub query: &'a SearchQuery,

    pub status: CaseStatus,

    /// Raw JSON of the scrape outcome.
    pub response_data: Option<String>,

    /// Parsed case data; only written when `status` is [`CaseStatus::Found`].
    pub scraped: Option<&'a ScrapedCase>,
}

pub struct CaseRepository {
    conn: DatabaseConnection,
}

impl CaseRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Appends a case row and, for found cases, its detail and orders in one transaction.
    pub async fn insert_search(&self, search: NewSearch<'_>) -> Result<CaseId, DbErr> {
        let txn = self.conn.begin().await?;

        let latest = Cases::find()
            .select_only()
            .column(cases::Column::SearchTimestamp)
            .order_by_desc(cases::Column::SearchTimestamp)
            .into_tuple::<String>()
            .one(&txn)
            .await?;

        let now = format_timestamp(Utc::now());
        let search_timestamp = match latest {
            Some(previous) if previous > now => previous,
            _ => now,
        };

        let case = cases::ActiveModel {
            case_type: Set(search.query.case_type().to_string()),
            case_number: Set(search.query.case_number().to_string()),
            filing_year: Set(search.query.filing_year()),
            search_timestamp: Set(search_timestamp),
            response_data: Set(search.response_data),
            status: Set(search.status.as_str().to_string()),
            ..Default::default()
        };

        let case_id = Cases::insert(case).exec(&txn).await?.last_insert_id;

        if search.status == CaseStatus::Found
            && let Some(scraped) = search.scraped
        {
            let detail = case_details::ActiveModel {
                case_id: Set(case_id),
                parties_plaintiff: Set(Some(truncate_chars(
                    &scraped.parties.plaintiff,
                    PARTY_TEXT_MAX_CHARS,
                ))),
                parties_defendant: Set(Some(truncate_chars(
                    &scraped.parties.defendant,
                    PARTY_TEXT_MAX_CHARS,
                ))),
                filing_date: Set(scraped.filing_date.map(format_date)),
                next_hearing_date: Set(scraped.next_hearing.map(format_date)),
                case_status: Set(Some(truncate_chars(&scraped.status, CASE_STATUS_MAX_CHARS))),
                ..Default::default()
            };
            CaseDetails::insert(detail).exec(&txn).await?;

            if !scraped.orders.is_empty() {
                let rows = scraped.orders.iter().map(|order| orders::ActiveModel {
                    case_id: Set(case_id),
                    order_date: Set(order.date.map(format_date)),
                    order_type: Set(Some(truncate_chars(&order.order_type, ORDER_TYPE_MAX_CHARS))),
                    pdf_url: Set(Some(truncate_chars(&order.pdf_url, PDF_URL_MAX_CHARS))),
                    local_pdf_path: Set(None),
                    ..Default::default()
                });
                Orders::insert_many(rows).exec(&txn).await?;
            }
        }

        txn.commit().await?;

        debug!(case_id, status = %search.status, "Recorded case search");
        Ok(CaseId::new(case_id))
    }

    pub async fn get(&self, id: CaseId) -> Result<Option<cases::Model>, DbErr> {
        Cases::find_by_id(id.value()).one(&self.conn).await
    }

    /// Loads a case together with its detail row and orders.
    pub async fn get_record(&self, id: CaseId) -> Result<Option<CaseRecord>, DbErr> {
        let Some(case) = self.get(id).await? else {
            return Ok(None);
        };
        self.load_children(case).await.map(Some)
    }

    /// The most recent search for `case_number`, across all case types and years.
    pub async fn latest_by_case_number(
        &self,
        case_number: &str,
    ) -> Result<Option<CaseRecord>, DbErr> {
        let case = Cases::find()
            .filter(cases::Column::CaseNumber.eq(case_number))
            .order_by_desc(cases::Column::SearchTimestamp)
            .order_by_desc(cases::Column::Id)
            .one(&self.conn)
            .await?;

        match case {
            Some(case) => self.load_children(case).await.map(Some),
            None => Ok(None),
        }
    }

    async fn load_children(&self, case: cases::Model) -> Result<CaseRecord, DbErr> {
        let detail = CaseDetails::find()
            .filter(case_details::Column::CaseId.eq(case.id))
            .one(&self.conn)
            .await?;

        let orders = Orders::find()
            .filter(orders::Column::CaseId.eq(case.id))
            .order_by_asc(orders::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(CaseRecord {
            case,
            detail,
            orders,
        })
    }

    /// One page of the search history, newest first. `page` is 1-based.
    pub async fn history(&self, page: u64, per_page: u64) -> Result<HistoryPage, DbErr> {
        let page = page.max(1);
        let per_page = per_page.max(1);

        let paginator = Cases::find()
            .order_by_desc(cases::Column::SearchTimestamp)
            .order_by_desc(cases::Column::Id)
            .paginate(&self.conn, per_page);

        let totals = paginator.num_items_and_pages().await?;
        let cases = paginator.fetch_page(page - 1).await?;

        Ok(HistoryPage {
            cases,
            page,
            per_page,
            total_items: totals.number_of_items,
            total_pages: totals.number_of_pages,
        })
    }

    pub async fn recent(&self, limit: u64) -> Result<Vec<cases::Model>, DbErr> {
        Cases::find()
            .order_by_desc(cases::Column::SearchTimestamp)
            .order_by_desc(cases::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
    }

    pub async fn stats(&self) -> Result<SearchStats, DbErr> {
        let total = Cases::find().count(&self.conn).await?;
        let found = self.count_with_status(CaseStatus::Found).await?;
        let not_found = self.count_with_status(CaseStatus::NotFound).await?;
        let error = self.count_with_status(CaseStatus::Error).await?;

        Ok(SearchStats {
            total,
            found,
            not_found,
            error,
        })
    }

    async fn count_with_status(&self, status: CaseStatus) -> Result<u64, DbErr> {
        Cases::find()
            .filter(cases::Column::Status.eq(status.as_str()))
            .count(&self.conn)
            .await
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        Cases::find().count(&self.conn).await
    }
}

/// Fixed-width RFC 3339 so that string order matches time order.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
