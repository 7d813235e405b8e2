use serde::Serialize;
use warp::reply::Json;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

/// Liveness check; never touches the table.
pub fn health() -> Json {
    warp::reply::json(&HealthBody { status: "ok" })
}
