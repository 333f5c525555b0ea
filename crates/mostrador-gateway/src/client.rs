//! # REST Client Core
//!
//! The `Gateway` handle and the generic row operations every entity
//! module builds on. The remote service exposes a PostgREST-style row API
//! under `/rest/v1/<table>`; filters and conflict targets ride in the
//! query string, write behavior in the `Prefer` header.
//!
//! ## Request Shapes
//! ```text
//! GET    /rest/v1/products?select=*&order=name.asc
//! POST   /rest/v1/sales?on_conflict=client_token     (Prefer: resolution=ignore-duplicates)
//! PATCH  /rest/v1/inventory_batches?id=eq.<id>
//! DELETE /rest/v1/categories?id=in.(a,b,c)
//! ```

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};

/// Handle to the remote data service.
///
/// Cloning is cheap; all clones share the same HTTP connection pool.
#[derive(Debug, Clone)]
pub struct Gateway {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl Gateway {
    /// Builds a gateway from configuration.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Gateway {
            http,
            base_url: config.base_url,
            api_key: config.api_key,
        })
    }

    /// URL for a table's row endpoint.
    fn table_url(&self, table: &str) -> GatewayResult<Url> {
        Ok(self.base_url.join(&format!("rest/v1/{}", table))?)
    }

    /// Attaches the auth headers every request carries.
    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Maps a non-success response to [`GatewayError::Api`].
    async fn check(response: Response) -> GatewayResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), %message, "Gateway request rejected");
        Err(GatewayError::Api {
            status: status.as_u16(),
            message,
        })
    }

    // =========================================================================
    // Generic Row Operations
    // =========================================================================

    /// Fetches all rows matching the query pairs (always `select=*`).
    pub(crate) async fn fetch_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
    ) -> GatewayResult<Vec<T>> {
        let mut url = self.table_url(table)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", "*");
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        debug!(table, "Gateway fetch");
        let response = self.authed(self.http.get(url)).send().await?;
        let response = Self::check(response).await?;
        let rows = response.json::<Vec<T>>().await?;
        debug!(table, count = rows.len(), "Gateway fetch complete");
        Ok(rows)
    }

    /// Inserts one row and returns the stored representation.
    pub(crate) async fn insert_returning<B, T>(&self, table: &str, row: &B) -> GatewayResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.table_url(table)?;

        debug!(table, "Gateway insert");
        let response = self
            .authed(self.http.post(url))
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;
        let response = Self::check(response).await?;

        let mut rows = response.json::<Vec<T>>().await?;
        rows.pop()
            .ok_or_else(|| GatewayError::Decode(format!("{}: empty insert representation", table)))
    }

    /// Inserts one row unless its conflict column already holds the value,
    /// in which case the insert is silently dropped server-side and `None`
    /// is returned.
    ///
    /// This is the idempotency primitive behind offline sale replay.
    pub(crate) async fn insert_idempotent<B, T>(
        &self,
        table: &str,
        conflict_column: &str,
        row: &B,
    ) -> GatewayResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut()
            .append_pair("on_conflict", conflict_column);

        debug!(table, conflict_column, "Gateway idempotent insert");
        let response = self
            .authed(self.http.post(url))
            .header("Prefer", "return=representation,resolution=ignore-duplicates")
            .json(row)
            .send()
            .await?;
        let response = Self::check(response).await?;

        let mut rows = response.json::<Vec<T>>().await?;
        Ok(rows.pop())
    }

    /// Patches the row with the given id.
    pub(crate) async fn patch_by_id<B>(&self, table: &str, id: &str, patch: &B) -> GatewayResult<()>
    where
        B: Serialize + ?Sized,
    {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{}", id));

        debug!(table, id, "Gateway patch");
        let response = self
            .authed(self.http.patch(url))
            .header("Prefer", "return=minimal")
            .json(patch)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Deletes every row whose id is in the set. A no-op on an empty set.
    pub(crate) async fn delete_by_ids(&self, table: &str, ids: &[String]) -> GatewayResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut url = self.table_url(table)?;
        url.query_pairs_mut()
            .append_pair("id", &format!("in.({})", ids.join(",")));

        debug!(table, count = ids.len(), "Gateway delete");
        let response = self.authed(self.http.delete(url)).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Probes the service root. Used by the network monitor to detect
    /// connectivity changes.
    pub async fn ping(&self) -> bool {
        let Ok(url) = self.table_url("") else {
            return false;
        };
        match self.authed(self.http.head(url)).send().await {
            Ok(response) => response.status() != StatusCode::GATEWAY_TIMEOUT,
            Err(_) => false,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> Gateway {
        Gateway::new(GatewayConfig::new("https://data.example.com", "key").unwrap()).unwrap()
    }

    #[test]
    fn test_table_url_joins_rest_prefix() {
        let url = gateway().table_url("products").unwrap();
        assert_eq!(url.as_str(), "https://data.example.com/rest/v1/products");
    }

    #[tokio::test]
    async fn test_fetch_against_unroutable_host_is_transport_error() {
        let gateway = Gateway::new(
            GatewayConfig::new("http://127.0.0.1:1", "key")
                .unwrap()
                .timeout(std::time::Duration::from_millis(200)),
        )
        .unwrap();

        let err = gateway
            .fetch_rows::<serde_json::Value>("products", &[])
            .await
            .unwrap_err();
        assert!(err.is_connectivity());
    }
}
