//! Persistence for design sessions, material scores and orders.
//!
//! Handlers talk to the [`Store`] trait; [`PgStore`] is the PostgreSQL
//! implementation used in production.

use async_trait::async_trait;
use sqlx::PgPool;
use std::future::Future;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::domain::{DesignRecord, MaterialScoreRecord, OrderRecord, OrderStatus};

/// Limit/offset window for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub offset: i64,
}

/// Rows for one page plus the total row count.
pub type PageOf<T> = (Vec<T>, i64);

#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), sqlx::Error>;

    async fn insert_design(&self, design: &DesignRecord) -> Result<(), sqlx::Error>;
    async fn list_designs(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<PageOf<DesignRecord>, sqlx::Error>;
    async fn get_design(&self, user_id: Uuid, id: Uuid)
        -> Result<Option<DesignRecord>, sqlx::Error>;

    async fn insert_material_score(&self, score: &MaterialScoreRecord) -> Result<(), sqlx::Error>;
    async fn list_material_scores(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<PageOf<MaterialScoreRecord>, sqlx::Error>;

    async fn insert_order(&self, order: &OrderRecord) -> Result<(), sqlx::Error>;
    async fn list_orders(
        &self,
        user_id: Uuid,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<PageOf<OrderRecord>, sqlx::Error>;
    async fn get_order(&self, user_id: Uuid, id: Uuid) -> Result<Option<OrderRecord>, sqlx::Error>;

    /// Set the status of one of the user's orders. `None` when no such order.
    async fn update_order_status(
        &self,
        user_id: Uuid,
        id: Uuid,
        status: OrderStatus,
        notes: Option<String>,
    ) -> Result<Option<OrderRecord>, sqlx::Error>;
}

/// Run a write in the background; failures are logged and otherwise dropped.
pub fn spawn_detached<F>(record: &'static str, write: F) -> JoinHandle<()>
where
    F: Future<Output = Result<(), sqlx::Error>> + Send + 'static,
{
    tokio::spawn(async move {
        match write.await {
            Ok(()) => tracing::debug!(record, "Detached write completed"),
            Err(e) => tracing::warn!(record, error = %e, "Detached write failed"),
        }
    })
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const DESIGN_COLUMNS: &str =
    "id, user_id, prompt, preferences, generated_designs, status, created_at";
const SCORE_COLUMNS: &str = "id, user_id, design_id, materials, product_type, \
     sustainability_score, overall_score, grade, created_at";
const ORDER_COLUMNS: &str = "id, user_id, design_id, material_score_id, selected_materials, \
     customizations, quantity, shipping_address, manufacturing_preferences, estimated_price, \
     status, order_number, notes, created_at, updated_at";

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    async fn insert_design(&self, design: &DesignRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO designs (id, user_id, prompt, preferences, generated_designs, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(design.id)
        .bind(design.user_id)
        .bind(&design.prompt)
        .bind(&design.preferences)
        .bind(&design.generated_designs)
        .bind(&design.status)
        .bind(design.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_designs(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<PageOf<DesignRecord>, sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM designs WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, DesignRecord>(&format!(
            "SELECT {DESIGN_COLUMNS} FROM designs WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(user_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    async fn get_design(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<DesignRecord>, sqlx::Error> {
        sqlx::query_as::<_, DesignRecord>(&format!(
            "SELECT {DESIGN_COLUMNS} FROM designs WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn insert_material_score(&self, score: &MaterialScoreRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO material_scores
                (id, user_id, design_id, materials, product_type, sustainability_score,
                 overall_score, grade, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(score.id)
        .bind(score.user_id)
        .bind(score.design_id)
        .bind(&score.materials)
        .bind(&score.product_type)
        .bind(&score.sustainability_score)
        .bind(score.overall_score)
        .bind(&score.grade)
        .bind(score.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_material_scores(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<PageOf<MaterialScoreRecord>, sqlx::Error> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM material_scores WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<_, MaterialScoreRecord>(&format!(
            "SELECT {SCORE_COLUMNS} FROM material_scores WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(user_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    async fn insert_order(&self, order: &OrderRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO orders
                (id, user_id, design_id, material_score_id, selected_materials, customizations,
                 quantity, shipping_address, manufacturing_preferences, estimated_price,
                 status, order_number, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(order.design_id)
        .bind(order.material_score_id)
        .bind(&order.selected_materials)
        .bind(&order.customizations)
        .bind(order.quantity)
        .bind(&order.shipping_address)
        .bind(&order.manufacturing_preferences)
        .bind(order.estimated_price)
        .bind(&order.status)
        .bind(&order.order_number)
        .bind(&order.notes)
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_orders(
        &self,
        user_id: Uuid,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<PageOf<OrderRecord>, sqlx::Error> {
        let status = status.map(|s| s.as_str());

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM orders
            WHERE user_id = $1
            AND ($2::text IS NULL OR status = $2)
            "#,
        )
        .bind(user_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE user_id = $1 AND ($2::text IS NULL OR status = $2) \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        ))
        .bind(user_id)
        .bind(status)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    async fn get_order(&self, user_id: Uuid, id: Uuid) -> Result<Option<OrderRecord>, sqlx::Error> {
        sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_order_status(
        &self,
        user_id: Uuid,
        id: Uuid,
        status: OrderStatus,
        notes: Option<String>,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        sqlx::query_as::<_, OrderRecord>(&format!(
            "UPDATE orders SET status = $3, notes = $4, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(status.as_str())
        .bind(notes)
        .fetch_optional(&self.pool)
        .await
    }
}


#[cfg(test)]
mod tests {
    use super::testing::MemoryStore;
    use super::*;
    use crate::domain::{GenerateDesignRequest, MaterialScoreRecord, ScoreMaterialsRequest};
    use serde_json::json;
    use std::sync::Arc;

    fn design_for(user_id: Uuid, prompt: &str) -> DesignRecord {
        let req: GenerateDesignRequest = serde_json::from_value(json!({"prompt": prompt})).unwrap();
        DesignRecord::generated(user_id, &req, json!([]))
    }

    #[tokio::test]
    async fn detached_write_completes_in_background() {
        let store = Arc::new(MemoryStore::default());
        let design = design_for(Uuid::new_v4(), "a recycled denim tote");

        let handle = spawn_detached("design", {
            let store = store.clone();
            let design = design.clone();
            async move { store.insert_design(&design).await }
        });
        handle.await.unwrap();

        assert_eq!(store.designs.lock().len(), 1);
    }

    #[tokio::test]
    async fn detached_write_failure_is_swallowed() {
        let store = Arc::new(MemoryStore::default());
        store.fail();
        let design = design_for(Uuid::new_v4(), "a recycled denim tote");

        let handle = spawn_detached("design", {
            let store = store.clone();
            async move { store.insert_design(&design).await }
        });

        assert!(handle.await.is_ok());
        assert!(store.designs.lock().is_empty());
    }

    #[tokio::test]
    async fn lists_are_scoped_newest_first_and_paged() {
        let store = MemoryStore::default();
        let user = Uuid::new_v4();
        for prompt in ["first design prompt", "second design prompt", "third design prompt"] {
            store.insert_design(&design_for(user, prompt)).await.unwrap();
        }
        store
            .insert_design(&design_for(Uuid::new_v4(), "someone else's design"))
            .await
            .unwrap();

        let (rows, total) = store
            .list_designs(user, PageRequest { limit: 2, offset: 0 })
            .await
            .unwrap();
        assert_eq!(total, 3);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].prompt, "third design prompt");

        let req: ScoreMaterialsRequest =
            serde_json::from_value(json!({"materials": [{"name": "Cork"}]})).unwrap();
        let score = MaterialScoreRecord::scored(
            user,
            &req,
            json!({"overall_score": 7.0, "categories": {"x": {}}}),
        );
        store.insert_material_score(&score).await.unwrap();
        let (scores, _) = store
            .list_material_scores(user, PageRequest { limit: 10, offset: 0 })
            .await
            .unwrap();
        assert_eq!(scores[0].grade, "B");
    }
}
