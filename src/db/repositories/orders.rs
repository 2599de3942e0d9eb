use crate::domain::OrderId;
use crate::entities::{cases, orders, prelude::*};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter};

pub struct OrderRepository {
    conn: DatabaseConnection,
}

impl OrderRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: OrderId) -> Result<Option<orders::Model>, DbErr> {
        Orders::find_by_id(id.value()).one(&self.conn).await
    }

    /// An order together with the case it belongs to.
    pub async fn get_with_case(
        &self,
        id: OrderId,
    ) -> Result<Option<(orders::Model, cases::Model)>, DbErr> {
        let row = Orders::find_by_id(id.value())
            .find_also_related(Cases)
            .one(&self.conn)
            .await?;

        Ok(row.and_then(|(order, case)| case.map(|case| (order, case))))
    }

    pub async fn set_local_path(&self, id: OrderId, path: &str) -> Result<(), DbErr> {
        Orders::update_many()
            .col_expr(
                orders::Column::LocalPdfPath,
                sea_orm::sea_query::Expr::value(path),
            )
            .filter(orders::Column::Id.eq(id.value()))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        Orders::find().count(&self.conn).await
    }
}
