use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client as HttpClient;
use tracing::{debug, warn};

use super::models::{value_as_f64, value_as_i64, CandleRow, Envelope, TickerResult};
use crate::models::price::{Candle, CandleWindow, PricePoint, Resolution};
use crate::utils::errors::{ConfigError, PriceError};

/// Where prices come from.
///
/// The report service only talks to this trait, so it can run against the
/// live exchange or an in-memory source.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Latest traded price for `symbol`
    async fn fetch_current_price(&self, symbol: &str) -> Result<PricePoint, PriceError>;

    /// Candles whose open time falls inside `window`; empty when the
    /// provider has none
    async fn fetch_candles(
        &self,
        symbol: &str,
        window: &CandleWindow,
        resolution: Resolution,
    ) -> Result<Vec<Candle>, PriceError>;
}

/// Public market-data client for the Delta Exchange REST API
pub struct DeltaClient {
    http_client: HttpClient,
    base_url: String,
}

impl DeltaClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.delta.exchange";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a client with a custom API root and per-request timeout
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Send a GET and hand back the body of a 2xx response
    async fn get_body(&self, url: &str, query: &[(&str, String)]) -> Result<String, PriceError> {
        debug!("GET {} {:?}", url, query);

        let response = self
            .http_client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                warn!("Request to {} failed: {}", url, e);
                PriceError::from(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(PriceError::from)?;

        if !status.is_success() {
            warn!("{} returned HTTP {}", url, status.as_u16());
            return Err(Self::handle_error_response(status.as_u16(), &body));
        }

        Ok(body)
    }

    /// Map a non-2xx response to an API error, preferring the provider's own message
    fn handle_error_response(status: u16, body: &str) -> PriceError {
        let message = serde_json::from_str::<Envelope>(body)
            .ok()
            .and_then(|env| env.error)
            .map(|err| match err.get("code").and_then(|c| c.as_str()) {
                Some(code) => code.to_string(),
                None => err.to_string(),
            })
            .unwrap_or_else(|| body.to_string());

        PriceError::Api {
            status: Some(status),
            message,
        }
    }
}

#[async_trait]
impl PriceSource for DeltaClient {
    /// GET /v2/tickers/{symbol}
    async fn fetch_current_price(&self, symbol: &str) -> Result<PricePoint, PriceError> {
        let url = format!("{}/v2/tickers/{}", self.base_url, symbol);
        let body = self.get_body(&url, &[]).await?;
        parse_ticker(&body, Utc::now())
    }

    /// GET /v2/history/candles
    async fn fetch_candles(
        &self,
        symbol: &str,
        window: &CandleWindow,
        resolution: Resolution,
    ) -> Result<Vec<Candle>, PriceError> {
        let url = format!("{}/v2/history/candles", self.base_url);
        let query = [
            ("symbol", symbol.to_string()),
            ("resolution", resolution.as_param().to_string()),
            ("start", window.start.timestamp_millis().to_string()),
            ("end", window.end.timestamp_millis().to_string()),
        ];
        let body = self.get_body(&url, &query).await?;
        parse_candles(&body)
    }
}

/// Unwrap the `{ success, result }` envelope
fn open_envelope(body: &str) -> Result<Envelope, PriceError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| PriceError::Parse(format!("Response is not valid JSON: {}", e)))?;

    if !envelope.success {
        let message = envelope
            .error
            .as_ref()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "success flag was false".to_string());
        return Err(PriceError::Api {
            status: None,
            message,
        });
    }

    Ok(envelope)
}

/// Parse a ticker body into the current price, stamped with `fetched_at`
pub fn parse_ticker(body: &str, fetched_at: DateTime<Utc>) -> Result<PricePoint, PriceError> {
    let envelope = open_envelope(body)?;
    let result = envelope
        .result
        .filter(|r| !r.is_null())
        .ok_or_else(|| PriceError::Parse("Ticker response has no result".to_string()))?;

    let ticker: TickerResult = serde_json::from_value(result)
        .map_err(|e| PriceError::Parse(format!("Malformed ticker: {}", e)))?;

    let close = ticker
        .close
        .as_ref()
        .ok_or_else(|| PriceError::Parse("Ticker has no close field".to_string()))?;

    let value = value_as_f64(close)
        .ok_or_else(|| PriceError::Parse(format!("Ticker close is not numeric: {}", close)))?;

    Ok(PricePoint::new(value, fetched_at))
}

/// Parse a candle history body; `time` is epoch milliseconds
pub fn parse_candles(body: &str) -> Result<Vec<Candle>, PriceError> {
    let envelope = open_envelope(body)?;

    let rows: Vec<CandleRow> = match envelope.result {
        None | Some(serde_json::Value::Null) => return Ok(Vec::new()),
        Some(result) => serde_json::from_value(result)
            .map_err(|e| PriceError::Parse(format!("Malformed candle list: {}", e)))?,
    };

    rows.iter()
        .enumerate()
        .map(|(i, row)| -> Result<Candle, PriceError> {
            let time = row
                .time
                .as_ref()
                .and_then(value_as_i64)
                .ok_or_else(|| PriceError::Parse(format!("Candle {} has no valid time", i)))?;
            let open_time = DateTime::<Utc>::from_timestamp_millis(time)
                .ok_or_else(|| PriceError::Parse(format!("Candle {} time out of range: {}", i, time)))?;
            let close = row
                .close
                .as_ref()
                .and_then(value_as_f64)
                .ok_or_else(|| PriceError::Parse(format!("Candle {} has no valid close", i)))?;
            Ok(Candle { open_time, close })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_ticker_string_close() {
        let now = Utc::now();
        let body = r#"{"success":true,"result":{"symbol":"BTCUSDT","close":"50123.5"}}"#;
        let point = parse_ticker(body, now).unwrap();
        assert_eq!(point.value, 50123.5);
        assert_eq!(point.timestamp, now);
    }

    #[test]
    fn test_parse_ticker_numeric_close() {
        let body = r#"{"success":true,"result":{"close":50000}}"#;
        let point = parse_ticker(body, Utc::now()).unwrap();
        assert_eq!(point.value, 50000.0);
    }

    #[test]
    fn test_parse_ticker_success_false_is_api_error() {
        let body = r#"{"success":false,"error":{"code":"invalid_symbol"}}"#;
        match parse_ticker(body, Utc::now()) {
            Err(PriceError::Api { status: None, message }) => {
                assert!(message.contains("invalid_symbol"));
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_ticker_missing_close_is_parse_error() {
        let body = r#"{"success":true,"result":{"symbol":"BTCUSDT"}}"#;
        assert!(matches!(parse_ticker(body, Utc::now()), Err(PriceError::Parse(_))));
    }

    #[test]
    fn test_parse_ticker_non_numeric_close_is_parse_error() {
        let body = r#"{"success":true,"result":{"close":"n/a"}}"#;
        assert!(matches!(parse_ticker(body, Utc::now()), Err(PriceError::Parse(_))));
    }

    #[test]
    fn test_parse_ticker_invalid_json() {
        assert!(matches!(parse_ticker("<html>", Utc::now()), Err(PriceError::Parse(_))));
    }

    #[test]
    fn test_parse_candles() {
        let body = r#"{"success":true,"result":[
            {"time":1705296540000,"open":49010,"close":"49000.5"},
            {"time":1705296600000,"close":49100}
        ]}"#;
        let candles = parse_candles(body).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].close, 49000.5);
        assert_eq!(
            candles[0].open_time,
            Utc.timestamp_millis_opt(1705296540000).unwrap()
        );
        assert_eq!(candles[1].close, 49100.0);
    }

    #[test]
    fn test_parse_candles_empty_is_not_an_error() {
        assert!(parse_candles(r#"{"success":true,"result":[]}"#).unwrap().is_empty());
        assert!(parse_candles(r#"{"success":true,"result":null}"#).unwrap().is_empty());
        assert!(parse_candles(r#"{"success":true}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_candles_bad_row_is_parse_error() {
        let body = r#"{"success":true,"result":[{"time":1705296540000}]}"#;
        assert!(matches!(parse_candles(body), Err(PriceError::Parse(_))));
    }

    #[test]
    fn test_parse_candles_success_false() {
        let body = r#"{"success":false,"result":[]}"#;
        assert!(matches!(parse_candles(body), Err(PriceError::Api { .. })));
    }

    #[test]
    fn test_handle_error_response_uses_provider_code() {
        let err = DeltaClient::handle_error_response(
            404,
            r#"{"success":false,"error":{"code":"not_found"}}"#,
        );
        assert_eq!(
            err,
            PriceError::Api {
                status: Some(404),
                message: "not_found".to_string()
            }
        );
    }

    #[test]
    fn test_handle_error_response_plain_body() {
        let err = DeltaClient::handle_error_response(502, "Bad Gateway");
        assert_eq!(
            err,
            PriceError::Api {
                status: Some(502),
                message: "Bad Gateway".to_string()
            }
        );
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client =
            DeltaClient::with_base_url("https://api.example.com/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url, "https://api.example.com");
    }

    async fn local_listener() -> (tokio::net::TcpListener, String) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        (listener, url)
    }

    #[tokio::test]
    async fn test_http_500_is_api_error_with_status() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let (listener, url) = local_listener().await;
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 5\r\nconnection: close\r\n\r\nerror",
                )
                .await;
        });

        let client = DeltaClient::with_base_url(&url, Duration::from_secs(5)).unwrap();
        let result = client.fetch_current_price("BTCUSDT").await;

        assert_eq!(
            result,
            Err(PriceError::Api {
                status: Some(500),
                message: "error".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_unanswered_request_times_out_as_network_error() {
        let (listener, url) = local_listener().await;
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let client = DeltaClient::with_base_url(&url, Duration::from_millis(200)).unwrap();
        let window = CandleWindow {
            start: Utc.timestamp_millis_opt(0).unwrap(),
            end: Utc.timestamp_millis_opt(600_000).unwrap(),
        };
        let result = client
            .fetch_candles("BTCUSDT", &window, Resolution::OneMinute)
            .await;

        assert!(matches!(result, Err(PriceError::Network(_))), "got {:?}", result);
    }

    #[tokio::test]
    async fn test_closed_port_is_network_error() {
        let (listener, url) = local_listener().await;
        drop(listener);

        let client = DeltaClient::with_base_url(&url, Duration::from_secs(5)).unwrap();
        let result = client.fetch_current_price("BTCUSDT").await;

        assert!(matches!(result, Err(PriceError::Network(_))), "got {:?}", result);
    }
}
