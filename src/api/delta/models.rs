use serde::Deserialize;
use serde_json::Value;

/// Envelope every endpoint wraps its payload in
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

/// Body of GET /v2/tickers/{symbol}
#[derive(Debug, Clone, Deserialize)]
pub struct TickerResult {
    pub close: Option<Value>,
}

/// One row of GET /v2/history/candles
#[derive(Debug, Clone, Deserialize)]
pub struct CandleRow {
    pub time: Option<Value>,
    pub close: Option<Value>,
}

/// Read a price the provider may send as either a JSON string or number
pub fn value_as_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Read an epoch timestamp sent as an integer, float, or numeric string
pub fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
