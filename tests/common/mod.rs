#![allow(dead_code)]

use std::time::Duration;

use feewatch::models::BlockHeights;
use feewatch::sources::{CoinGeckoOracle, HttpGraphClient};
use serde_json::{json, Value};
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const HEIGHTS: BlockHeights = BlockHeights {
    now: 300,
    yesterday: 200,
    week_ago: 100,
};

pub fn graph_client() -> HttpGraphClient {
    HttpGraphClient::new(Duration::from_secs(5)).unwrap()
}

pub fn endpoint(server: &MockServer, subgraph: &str) -> Url {
    Url::parse(&format!("{}/subgraphs/name/{}", server.uri(), subgraph)).unwrap()
}

pub fn oracle(server: &MockServer) -> CoinGeckoOracle {
    CoinGeckoOracle::new(
        reqwest::Client::new(),
        Url::parse(&format!("{}/api/v3", server.uri())).unwrap(),
        Duration::from_secs(60),
    )
}

/// GraphQL success envelope.
pub fn graph_data(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": data }))
}

/// Serve a `market_chart` series for `asset` over `days`.
pub async fn mount_chart(server: &MockServer, asset: &str, days: u32, prices: &[f64]) {
    let series: Vec<Value> = prices
        .iter()
        .enumerate()
        .map(|(i, p)| json!([1_700_000_000_000u64 + i as u64 * 3_600_000, p]))
        .collect();

    Mock::given(method("GET"))
        .and(path(format!("/api/v3/coins/{asset}/market_chart")))
        .and(query_param("vs_currency", "usd"))
        .and(query_param("days", days.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "prices": series })))
        .mount(server)
        .await;
}
