//! Experience order repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use atelier_core::{
    ExperienceKind, ExperienceOrderId, ExperienceOrderStatus, Handle, OrderReference, ProductId,
    Quote,
};

use super::RepositoryError;
use crate::models::experience::{CheckoutRequest, ExperienceOrder};

/// Repository for experience orders.
pub struct ExperienceOrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ExperienceOrderRepository<'a> {
    /// Create a new experience order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store an order and its priced lines in one transaction.
    ///
    /// `product_ids` maps each quoted handle to the product it was priced from.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the generated reference is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        request: &CheckoutRequest,
        quote: &Quote,
        product_ids: &HashMap<Handle, ProductId>,
    ) -> Result<ExperienceOrder, RepositoryError> {
        let reference = OrderReference::generate();
        let guest_count = request
            .details
            .guest_count
            .map(i32::try_from)
            .transpose()
            .map_err(|_| RepositoryError::DataCorruption("guest count out of range".to_owned()))?;
        let units = i64::try_from(quote.units)
            .map_err(|_| RepositoryError::DataCorruption("unit count out of range".to_owned()))?;

        let mut tx = self.pool.begin().await?;

        let (id, kind, status, created_at) = sqlx::query_as::<
            _,
            (ExperienceOrderId, ExperienceKind, ExperienceOrderStatus, DateTime<Utc>),
        >(
            r"
            INSERT INTO experience_orders (
                reference, kind, contact_name, contact_email, company, phone,
                event_name, preferred_date, guest_count, notes,
                currency_code, units, subtotal, discount_rate, discount, total
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING id, kind, status, created_at
            ",
        )
        .bind(reference.as_str())
        .bind(request.kind)
        .bind(request.contact.name.trim())
        .bind(request.contact.email.as_str())
        .bind(&request.contact.company)
        .bind(&request.contact.phone)
        .bind(&request.details.event_name)
        .bind(request.details.preferred_date)
        .bind(guest_count)
        .bind(&request.details.notes)
        .bind(quote.currency_code.code())
        .bind(units)
        .bind(quote.subtotal)
        .bind(quote.discount_rate)
        .bind(quote.discount)
        .bind(quote.total)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("order reference already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        for (position, line) in (0_i32..).zip(&quote.lines) {
            let quantity = i32::try_from(line.quantity)
                .map_err(|_| RepositoryError::DataCorruption("quantity out of range".to_owned()))?;
            sqlx::query(
                r"
                INSERT INTO experience_order_items (
                    order_id, product_id, product_handle, variant_sku, title,
                    quantity, unit_price, line_total, position
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ",
            )
            .bind(id)
            .bind(product_ids.get(&line.product_handle).copied())
            .bind(line.product_handle.as_str())
            .bind(&line.variant_sku)
            .bind(&line.title)
            .bind(quantity)
            .bind(line.unit_price)
            .bind(line.line_total)
            .bind(position)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(ExperienceOrder {
            id,
            reference,
            kind,
            status,
            created_at,
        })
    }
}
