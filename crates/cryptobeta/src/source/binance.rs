//! Binance public klines client.
//!
//! `GET {base_url}/api/v3/klines?symbol=..&interval=..[&limit=..]` answers with
//! an array of arrays. Field 0 is the open time in milliseconds, fields 1..=5
//! are open, high, low, close and volume as numeric strings.

use super::{Candle, CandleSource, close_prices};
use crate::{BetaError, DashboardConfig, Interval, PriceSeries, Result, Symbol};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Default public market data host.
pub const DEFAULT_BASE_URL: &str = "https://data-api.binance.vision";

/// Largest `limit` the klines endpoint accepts.
pub const MAX_LIMIT: u16 = 1000;

/// Binance klines client.
#[derive(Debug, Clone)]
pub struct BinanceClient {
    base_url: String,
    limit: Option<u16>,
    client: reqwest::Client,
}

impl BinanceClient {
    /// Create a client against the default public host.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            limit: None,
            client: reqwest::Client::builder().build()?,
        })
    }

    /// Create a client from dashboard configuration.
    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limit: config.limit,
            client,
        })
    }

    /// Number of candles requested per fetch; `None` uses the endpoint default.
    pub const fn with_limit(mut self, limit: Option<u16>) -> Self {
        self.limit = limit;
        self
    }

    /// Fetch raw candles for `symbol`, earliest first.
    pub async fn fetch_candles(&self, symbol: &Symbol, interval: Interval) -> Result<Vec<Candle>> {
        let url = format!("{}/api/v3/klines", self.base_url);

        let mut query = vec![
            ("symbol", symbol.as_str().to_string()),
            ("interval", interval.as_str().to_string()),
        ];
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }

        debug!(%symbol, %interval, "fetching klines");
        let response = self.client.get(&url).query(&query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BetaError::Status {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let candles = parse_klines(symbol, &body)?;
        debug!(%symbol, %interval, candles = candles.len(), "fetched klines");
        Ok(candles)
    }
}

impl CandleSource for BinanceClient {
    async fn fetch_closes(&self, symbol: &Symbol, interval: Interval) -> Result<PriceSeries> {
        let candles = self.fetch_candles(symbol, interval).await?;
        close_prices(&candles)
    }
}

/// Decode a klines response body.
///
/// Any record that is too short, has a field that is not a finite
/// non-negative numeric string, or breaks chronological order fails the
/// whole series.
pub fn parse_klines(symbol: &Symbol, body: &str) -> Result<Vec<Candle>> {
    let records: Vec<Vec<Value>> = serde_json::from_str(body)?;

    let mut candles: Vec<Candle> = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let malformed = |reason: String| BetaError::MalformedRecord {
            symbol: symbol.to_string(),
            index,
            reason,
        };

        if record.len() < 6 {
            return Err(malformed(format!(
                "expected at least 6 fields, got {}",
                record.len()
            )));
        }

        let open_ms = record[0]
            .as_i64()
            .ok_or_else(|| malformed(format!("open time {} is not an integer", record[0])))?;
        let open_time = DateTime::<Utc>::from_timestamp_millis(open_ms)
            .ok_or_else(|| malformed(format!("open time {open_ms} is out of range")))?;

        let field = |i: usize, name: &str| -> Result<f64> {
            let value = record[i]
                .as_str()
                .and_then(|s| s.parse::<f64>().ok())
                .ok_or_else(|| {
                    malformed(format!("{name} {} is not a numeric string", record[i]))
                })?;
            // `f64::from_str` accepts "NaN", "inf" and negative numbers.
            if !value.is_finite() || value < 0.0 {
                return Err(malformed(format!(
                    "{name} {value} is not a finite non-negative number"
                )));
            }
            Ok(value)
        };

        let candle = Candle {
            open_time,
            open: field(1, "open")?,
            high: field(2, "high")?,
            low: field(3, "low")?,
            close: field(4, "close")?,
            volume: field(5, "volume")?,
        };

        if let Some(prev) = candles.last()
            && prev.open_time >= candle.open_time
        {
            return Err(malformed(format!(
                "open time {} is not after {}",
                candle.open_time, prev.open_time
            )));
        }
        candles.push(candle);
    }

    Ok(candles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn eth() -> Symbol {
        Symbol::new("ETHUSDT").unwrap()
    }

    const BODY: &str = r#"[
        [1709251200000, "3340.00", "3360.10", "3335.50", "3350.25", "812.5", 1709254799999, "0", 100, "0", "0", "0"],
        [1709254800000, "3350.25", "3371.00", "3349.00", "3368.00", "640.0", 1709258399999, "0", 90, "0", "0", "0"]
    ]"#;

    #[test]
    fn test_parse_klines() {
        let candles = parse_klines(&eth(), BODY).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].close, 3350.25);
        assert_eq!(candles[1].open, 3350.25);
        assert_eq!(candles[1].volume, 640.0);
        assert_eq!(candles[0].open_time.timestamp_millis(), 1_709_251_200_000);
    }

    #[test]
    fn test_parse_empty_body() {
        assert!(parse_klines(&eth(), "[]").unwrap().is_empty());
    }

    #[test]
    fn test_non_numeric_close() {
        let body = r#"[[1709251200000, "1", "1", "1", "abc", "1"]]"#;
        match parse_klines(&eth(), body) {
            Err(BetaError::MalformedRecord { symbol, index, reason }) => {
                assert_eq!(symbol, "ETHUSDT");
                assert_eq!(index, 0);
                assert!(reason.contains("close"));
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_numeric_close_is_rejected() {
        // Prices arrive as strings; a bare number means the payload changed shape.
        let body = r#"[[1709251200000, "1", "1", "1", 2.5, "1"]]"#;
        assert!(matches!(
            parse_klines(&eth(), body),
            Err(BetaError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_nan_close_is_malformed() {
        let body = r#"[[1709251200000, "1", "1", "1", "NaN", "1"]]"#;
        let err = parse_klines(&eth(), body).unwrap_err();
        match &err {
            BetaError::MalformedRecord { index, reason, .. } => {
                assert_eq!(*index, 0);
                assert!(reason.contains("close"));
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
        assert!(err.is_fetch_failure());
    }

    #[test]
    fn test_negative_close_is_malformed() {
        let body = r#"[
            [1709251200000, "1", "1", "1", "2", "1"],
            [1709254800000, "1", "1", "1", "-1", "1"]
        ]"#;
        assert!(matches!(
            parse_klines(&eth(), body),
            Err(BetaError::MalformedRecord { index: 1, .. })
        ));
    }

    #[test]
    fn test_infinite_volume_is_malformed() {
        let body = r#"[[1709251200000, "1", "1", "1", "2", "inf"]]"#;
        assert!(matches!(
            parse_klines(&eth(), body),
            Err(BetaError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_short_record() {
        let body = r#"[[1709251200000, "1", "1", "1", "2"], [1709254800000, "1"]]"#;
        assert!(matches!(
            parse_klines(&eth(), body),
            Err(BetaError::MalformedRecord { index: 0, .. })
        ));
    }

    #[test]
    fn test_out_of_order_records() {
        let body = r#"[
            [1709254800000, "1", "1", "1", "2", "1"],
            [1709251200000, "1", "1", "1", "2", "1"]
        ]"#;
        assert!(matches!(
            parse_klines(&eth(), body),
            Err(BetaError::MalformedRecord { index: 1, .. })
        ));
    }

    #[test]
    fn test_not_an_array() {
        let body = r#"{"code": -1121, "msg": "Invalid symbol."}"#;
        let err = parse_klines(&eth(), body).unwrap_err();
        assert!(matches!(err, BetaError::Json(_)));
        assert!(err.is_fetch_failure());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = BinanceClient::with_base_url("http://localhost:8080/").unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    /// Serve one canned HTTP response on a local port.
    ///
    /// Returns the base URL and a handle yielding the request line received.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();

            let request = String::from_utf8_lossy(&request);
            request.lines().next().unwrap_or_default().to_string()
        });

        (base_url, handle)
    }

    #[tokio::test]
    async fn test_fetch_candles_server_error() {
        let (base_url, server) = serve_once("500 Internal Server Error", r#"{"msg":"boom"}"#).await;
        let client = BinanceClient::with_base_url(&base_url).unwrap();

        let err = client
            .fetch_candles(&eth(), Interval::OneHour)
            .await
            .unwrap_err();
        match &err {
            BetaError::Status { symbol, status } => {
                assert_eq!(symbol, "ETHUSDT");
                assert_eq!(*status, 500);
            }
            other => panic!("expected Status, got {other:?}"),
        }
        assert!(err.is_fetch_failure());
        assert!(!err.is_degenerate());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_candles_ok() {
        let (base_url, server) = serve_once("200 OK", BODY).await;
        let client = BinanceClient::with_base_url(&base_url)
            .unwrap()
            .with_limit(Some(2));

        let candles = client
            .fetch_candles(&eth(), Interval::FourHours)
            .await
            .unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[1].close, 3368.0);

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /api/v3/klines?"));
        assert!(request_line.contains("symbol=ETHUSDT"));
        assert!(request_line.contains("interval=4h"));
        assert!(request_line.contains("limit=2"));
    }

    #[tokio::test]
    async fn test_fetch_closes_from_server() {
        let (base_url, server) = serve_once("200 OK", BODY).await;
        let client = BinanceClient::with_base_url(&base_url).unwrap();

        let closes = client.fetch_closes(&eth(), Interval::OneHour).await.unwrap();
        assert_eq!(closes.as_slice(), &[3350.25, 3368.0]);

        let request_line = server.await.unwrap();
        assert!(!request_line.contains("limit="));
    }
}
