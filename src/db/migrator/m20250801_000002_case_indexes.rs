use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Lookups by case number for the JSON API
        manager
            .create_index(
                Index::create()
                    .name("idx_cases_case_number")
                    .table(Cases::Table)
                    .col(Cases::CaseNumber)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // History and dashboard sort by timestamp
        manager
            .create_index(
                Index::create()
                    .name("idx_cases_search_timestamp")
                    .table(Cases::Table)
                    .col(Cases::SearchTimestamp)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_case_id")
                    .table(Orders::Table)
                    .col(Orders::CaseId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_orders_case_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_cases_search_timestamp").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_cases_case_number").to_owned())
            .await
    }
}

#[derive(Iden)]
enum Cases {
    Table,
    CaseNumber,
    SearchTimestamp,
}

#[derive(Iden)]
enum Orders {
    Table,
    CaseId,
}
