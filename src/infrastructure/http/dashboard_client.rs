use gloo_net::http::Request;
use web_sys::AbortController;

use crate::application::fetch_coordinator::{KlineRecord, MarketDataApi, TickerRecord};
use crate::domain::config::PRICE_LISTING_PAGE_LIMIT;
use crate::domain::errors::{FetchError, FetchResult};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{Symbol, TimeInterval};
use crate::infrastructure::http::dto::{parse_klines_response, parse_prices_response};

/// HTTP client against the dashboard backend, built on gloo.
pub struct DashboardHttpClient {
    base_url: String,
}

impl DashboardHttpClient {
    pub fn new() -> Self {
        Self::with_base_url("http://localhost:5000")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    async fn get_text(&self, url: &str) -> FetchResult<String> {
        // Tie the browser fetch to an AbortController so dropping this
        // future (a superseded request) aborts the network operation itself
        // instead of letting the response stream to waste.
        let controller = AbortController::new().ok();
        let signal = controller.as_ref().map(|c| c.signal());
        let mut guard = AbortOnDrop { controller };

        let response = Request::get(url)
            .abort_signal(signal.as_ref())
            .send()
            .await
            .map_err(|e| FetchError::Network(format!("request failed: {e}")))?;

        if !response.ok() {
            guard.disarm();
            return Err(FetchError::Network(format!("HTTP {}", response.status())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(format!("failed to read body: {e}")))?;
        guard.disarm();
        Ok(body)
    }
}

impl Default for DashboardHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketDataApi for DashboardHttpClient {
    async fn fetch_klines(
        &self,
        symbol: &Symbol,
        interval: TimeInterval,
        limit: usize,
    ) -> FetchResult<Vec<KlineRecord>> {
        let url = format!(
            "{}/api/klines/{}?interval={}&limit={}",
            self.base_url,
            symbol.value(),
            interval.as_query_str(),
            limit
        );
        get_logger().debug(
            LogComponent::Infrastructure("DashboardHTTP"),
            &format!("📡 GET {}", url),
        );
        let body = self.get_text(&url).await?;
        parse_klines_response(&body)
    }

    async fn fetch_price_listing(&self) -> FetchResult<Vec<TickerRecord>> {
        let url = format!(
            "{}/api/current-prices?page=1&limit={}",
            self.base_url, PRICE_LISTING_PAGE_LIMIT
        );
        let body = self.get_text(&url).await?;
        parse_prices_response(&body)
    }
}

struct AbortOnDrop {
    controller: Option<AbortController>,
}

impl AbortOnDrop {
    fn disarm(&mut self) {
        self.controller = None;
    }
}

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        if let Some(controller) = &self.controller {
            controller.abort();
        }
    }
}
