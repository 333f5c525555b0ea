//! # Sales, Clients & Cash Closings
//!
//! The sale insert is the one idempotent write in the system: the row's
//! `client_token` column carries a unique constraint, and the insert asks
//! the service to ignore duplicates. Replaying a sale that already landed
//! returns `None` instead of a second row.

use tracing::info;

use mostrador_core::{CashClosing, Client, Sale};

use crate::client::Gateway;
use crate::error::GatewayResult;
use crate::wire::{CashClosingRow, ClientRow, SaleRow};

const SALES: &str = "sales";
const CLIENTS: &str = "clients";
const CLOSINGS: &str = "cash_closings";

impl Gateway {
    // =========================================================================
    // Sales
    // =========================================================================

    /// All sales, newest first.
    pub async fn fetch_sales(&self) -> GatewayResult<Vec<Sale>> {
        let rows: Vec<SaleRow> = self
            .fetch_rows(SALES, &[("order", "created_at.desc")])
            .await?;
        Ok(rows.into_iter().map(Sale::from).collect())
    }

    /// Records a sale, idempotently on its client token.
    ///
    /// Returns the stored sale (with the server-kept id), or `None` when
    /// the token has been seen before and the insert was dropped. A `None`
    /// during offline replay means the sale already landed on an earlier,
    /// interrupted attempt and is safe to dequeue.
    pub async fn insert_sale(&self, sale: &Sale) -> GatewayResult<Option<Sale>> {
        let row = SaleRow::from_sale(sale);
        let stored: Option<SaleRow> = self
            .insert_idempotent(SALES, "client_token", &row)
            .await?;

        match &stored {
            Some(row) => info!(id = %row.id, token = %row.client_token, total_cents = row.total_cents, "Sale recorded"),
            None => info!(token = %sale.client_token, "Sale already recorded, insert ignored"),
        }
        Ok(stored.map(Sale::from))
    }

    // =========================================================================
    // Clients
    // =========================================================================

    /// All clients.
    pub async fn fetch_clients(&self) -> GatewayResult<Vec<Client>> {
        let rows: Vec<ClientRow> = self.fetch_rows(CLIENTS, &[("order", "name.asc")]).await?;
        Ok(rows.into_iter().map(Client::from).collect())
    }

    /// Creates a client.
    pub async fn insert_client(&self, client: &Client) -> GatewayResult<Client> {
        let row = ClientRow::from(client);
        let stored: ClientRow = self.insert_returning(CLIENTS, &row).await?;
        Ok(stored.into())
    }

    /// Updates a client's contact data and credit fields.
    pub async fn update_client(&self, client: &Client) -> GatewayResult<()> {
        let row = ClientRow::from(client);
        let mut patch = serde_json::to_value(&row)?;
        if let Some(obj) = patch.as_object_mut() {
            obj.remove("id");
        }
        self.patch_by_id(CLIENTS, &client.id, &patch).await
    }

    /// Deletes a client.
    pub async fn delete_client(&self, id: &str) -> GatewayResult<()> {
        self.delete_by_ids(CLIENTS, std::slice::from_ref(&id.to_string()))
            .await
    }

    // =========================================================================
    // Cash Closings
    // =========================================================================

    /// All cash closings, newest first.
    pub async fn fetch_closings(&self) -> GatewayResult<Vec<CashClosing>> {
        let rows: Vec<CashClosingRow> = self
            .fetch_rows(CLOSINGS, &[("order", "created_at.desc")])
            .await?;
        Ok(rows.into_iter().map(CashClosing::from).collect())
    }

    /// Records an end-of-shift closing.
    pub async fn insert_closing(&self, closing: &CashClosing) -> GatewayResult<CashClosing> {
        let row = CashClosingRow::from(closing);
        let stored: CashClosingRow = self.insert_returning(CLOSINGS, &row).await?;
        info!(id = %stored.id, cashier = %stored.cashier_id, sales = stored.sale_ids.len(), "Cash closing recorded");
        Ok(stored.into())
    }
}
