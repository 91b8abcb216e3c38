use axum::Json;
use serde_json::{Value, json};

use crate::RouteMeta;

pub const META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/api/health",
    desc: "Liveness check.",
    category: "utility",
};

pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}
