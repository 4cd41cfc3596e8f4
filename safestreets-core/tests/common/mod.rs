#![allow(dead_code)]

use std::net::SocketAddr;

use axum::Router;
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Serves `app` on an ephemeral local port and returns its base URL
pub async fn spawn(app: Router) -> String {
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let listener = TcpListener::bind(addr).await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{port}")
}

/// Overpass-style body with one supermarket node and one residential street
pub fn overpass_body() -> Value {
    json!({
        "version": 0.6,
        "elements": [
            { "type": "node", "id": 1, "lat": 40.001, "lon": -75.0, "tags": { "shop": "supermarket" } },
            { "type": "node", "id": 2, "lat": 40.0, "lon": -75.0 },
            { "type": "node", "id": 3, "lat": 40.0, "lon": -74.999 },
            {
                "type": "way",
                "id": 10,
                "nodes": [2, 3],
                "tags": { "highway": "residential", "lit": "yes" },
                "geometry": [ { "lat": 40.0, "lon": -75.0 }, { "lat": 40.0, "lon": -74.999 } ]
            },
            { "type": "relation", "id": 20, "center": { "lat": 40.002, "lon": -75.001 }, "tags": { "leisure": "park" } }
        ]
    })
}
