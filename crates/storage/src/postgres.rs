use std::collections::HashMap;

use async_trait::async_trait;
use common::{CourierId, Money, OrderId, OrderState, ProductId, StoreId};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{
    NewOrder, OrderRecord, Result, StorageError,
    catalog::{ActiveProduct, ProductCatalog},
    grants::GrantDirectory,
    order::{CustomerInfo, LineItem},
    store::{OrderFilter, OrderStore},
};

const ORDER_COLUMNS: &str = "id, store_id, courier_id, customer_name, customer_phone, \
     customer_address, state, total_cents, failure_note, created_at, updated_at";

/// PostgreSQL-backed order store implementation.
///
/// The conditional writes are single guarded UPDATE statements; the
/// database's row lock is the only synchronization involved.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        tracing::info!("running database migrations");
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: PgRow) -> Result<OrderRecord> {
        let state: String = row.try_get("state")?;
        let state = state
            .parse::<OrderState>()
            .map_err(|e| StorageError::InvalidState(e.0))?;

        Ok(OrderRecord {
            id: OrderId::new(row.try_get("id")?),
            store_id: StoreId::new(row.try_get("store_id")?),
            courier_id: row
                .try_get::<Option<i64>, _>("courier_id")?
                .map(CourierId::new),
            customer: CustomerInfo {
                name: row.try_get("customer_name")?,
                phone: row.try_get("customer_phone")?,
                address: row.try_get("customer_address")?,
            },
            state,
            total: Money::from_cents(row.try_get("total_cents")?),
            failure_note: row.try_get("failure_note")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            items: Vec::new(),
        })
    }

    fn row_to_item(row: PgRow) -> Result<LineItem> {
        Ok(LineItem {
            product_id: ProductId::new(row.try_get("product_id")?),
            product_name: row.try_get("product_name")?,
            quantity: row.try_get::<i32, _>("quantity")? as u32,
            unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
            subtotal: Money::from_cents(row.try_get("subtotal_cents")?),
        })
    }

    async fn load_items(&self, order_id: OrderId) -> Result<Vec<LineItem>> {
        let rows = sqlx::query(
            r#"
            SELECT product_id, product_name, quantity, unit_price_cents, subtotal_cents
            FROM order_items
            WHERE order_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(order_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_item).collect()
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn insert(&self, order: NewOrder) -> Result<OrderRecord> {
        let total = order.total();

        // The order and its items land in one transaction
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO orders (store_id, customer_name, customer_phone, customer_address, state, total_cents)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ORDER_COLUMNS}
            "#,
        ))
        .bind(order.store_id.as_i64())
        .bind(&order.customer.name)
        .bind(&order.customer.phone)
        .bind(&order.customer.address)
        .bind(OrderState::PendingDispatch.as_str())
        .bind(total.cents())
        .fetch_one(&mut *tx)
        .await?;

        let mut record = Self::row_to_order(row)?;

        for item in &order.items {
            let item_row = sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, product_name, quantity, unit_price_cents, subtotal_cents)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING product_id, product_name, quantity, unit_price_cents, subtotal_cents
                "#,
            )
            .bind(record.id.as_i64())
            .bind(item.product_id.as_i64())
            .bind(&item.product_name)
            .bind(item.quantity as i32)
            .bind(item.unit_price.cents())
            .bind(item.subtotal().cents())
            .fetch_one(&mut *tx)
            .await?;

            record.items.push(Self::row_to_item(item_row)?);
        }

        tx.commit().await?;
        Ok(record)
    }

    async fn get(&self, id: OrderId) -> Result<Option<OrderRecord>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let mut record = Self::row_to_order(row)?;
                record.items = self.load_items(record.id).await?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn list(&self, store_id: StoreId, filter: &OrderFilter) -> Result<Vec<OrderRecord>> {
        let mut sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE store_id = $1");
        let mut param_count = 1;

        // Build dynamic query
        if filter.state.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND state = ${param_count}"));
        }
        if filter.created_from.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND created_at >= ${param_count}"));
        }
        if filter.created_to.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND created_at <= ${param_count}"));
        }
        if filter.product_ids.is_some() {
            param_count += 1;
            sql.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM order_items \
                 WHERE order_items.order_id = orders.id \
                 AND order_items.product_id = ANY(${param_count}))"
            ));
        }
        if filter.courier_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND courier_id = ${param_count}"));
        }

        sql.push_str(" ORDER BY created_at DESC, id DESC");

        // Build and execute query with parameters
        let mut sqlx_query = sqlx::query(&sql).bind(store_id.as_i64());

        if let Some(state) = filter.state {
            sqlx_query = sqlx_query.bind(state.as_str());
        }
        if let Some(from) = filter.created_from {
            sqlx_query = sqlx_query.bind(from);
        }
        if let Some(to) = filter.created_to {
            sqlx_query = sqlx_query.bind(to);
        }
        if let Some(ref ids) = filter.product_ids {
            let raw: Vec<i64> = ids.iter().map(|id| id.as_i64()).collect();
            sqlx_query = sqlx_query.bind(raw);
        }
        if let Some(courier_id) = filter.courier_id {
            sqlx_query = sqlx_query.bind(courier_id.as_i64());
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        let mut orders = rows
            .into_iter()
            .map(Self::row_to_order)
            .collect::<Result<Vec<_>>>()?;

        if orders.is_empty() {
            return Ok(orders);
        }

        // Attach all line items with a single query
        let order_ids: Vec<i64> = orders.iter().map(|order| order.id.as_i64()).collect();
        let item_rows = sqlx::query(
            r#"
            SELECT order_id, product_id, product_name, quantity, unit_price_cents, subtotal_cents
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY id ASC
            "#,
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut items_by_order: HashMap<i64, Vec<LineItem>> = HashMap::new();
        for row in item_rows {
            let order_id: i64 = row.try_get("order_id")?;
            items_by_order
                .entry(order_id)
                .or_default()
                .push(Self::row_to_item(row)?);
        }
        for order in &mut orders {
            if let Some(items) = items_by_order.remove(&order.id.as_i64()) {
                order.items = items;
            }
        }

        Ok(orders)
    }

    async fn update_state(
        &self,
        id: OrderId,
        expected: OrderState,
        new_state: OrderState,
        failure_note: Option<&str>,
    ) -> Result<Option<OrderRecord>> {
        // One guarded statement; RETURNING doubles as the confirming
        // re-read, so zero rows is the only other outcome
        let row = sqlx::query(&format!(
            r#"
            UPDATE orders
            SET state = $3, failure_note = COALESCE($4, failure_note), updated_at = NOW()
            WHERE id = $1 AND state = $2
            RETURNING {ORDER_COLUMNS}
            "#,
        ))
        .bind(id.as_i64())
        .bind(expected.as_str())
        .bind(new_state.as_str())
        .bind(failure_note)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let mut record = Self::row_to_order(row)?;
                record.items = self.load_items(record.id).await?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn claim(&self, id: OrderId, courier_id: CourierId) -> Result<Option<OrderRecord>> {
        // Courier and state move in the same guarded statement, so of
        // any number of concurrent claimers exactly one matches the row
        let row = sqlx::query(&format!(
            r#"
            UPDATE orders
            SET courier_id = $2, state = $3, updated_at = NOW()
            WHERE id = $1 AND state = $4 AND courier_id IS NULL
            RETURNING {ORDER_COLUMNS}
            "#,
        ))
        .bind(id.as_i64())
        .bind(courier_id.as_i64())
        .bind(OrderState::Assigned.as_str())
        .bind(OrderState::PendingDispatch.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let mut record = Self::row_to_order(row)?;
                record.items = self.load_items(record.id).await?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }
}

/// PostgreSQL-backed product catalog.
#[derive(Clone)]
pub struct PostgresProductCatalog {
    pool: PgPool,
}

impl PostgresProductCatalog {
    /// Creates a new PostgreSQL product catalog.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductCatalog for PostgresProductCatalog {
    async fn get_active_product(
        &self,
        product_id: ProductId,
        store_id: StoreId,
    ) -> Result<Option<ActiveProduct>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, price_cents
            FROM products
            WHERE id = $1 AND store_id = $2 AND active
            "#,
        )
        .bind(product_id.as_i64())
        .bind(store_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(ActiveProduct {
                product_id: ProductId::new(row.try_get("id")?),
                name: row.try_get("name")?,
                unit_price: Money::from_cents(row.try_get("price_cents")?),
            })),
            None => Ok(None),
        }
    }
}

/// PostgreSQL-backed grant directory.
#[derive(Clone)]
pub struct PostgresGrantDirectory {
    pool: PgPool,
}

impl PostgresGrantDirectory {
    /// Creates a new PostgreSQL grant directory.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GrantDirectory for PostgresGrantDirectory {
    async fn has_grant(&self, courier_id: CourierId, store_id: StoreId) -> Result<bool> {
        let granted: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM courier_store_grants
                WHERE courier_id = $1 AND store_id = $2
            )
            "#,
        )
        .bind(courier_id.as_i64())
        .bind(store_id.as_i64())
        .fetch_one(&self.pool)
        .await?;

        Ok(granted)
    }
}
