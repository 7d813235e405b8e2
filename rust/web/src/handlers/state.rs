use crate::errors::IntoErrorResponse;
use crate::table::Table;
use std::sync::Arc;
use warp::Reply;

/// `GET /api/state`: the table as an unjoined viewer sees it.
pub async fn table_state(table: Arc<Table>) -> warp::reply::Response {
    match table.overview() {
        Ok(state) => warp::reply::json(&state).into_response(),
        Err(err) => err.into_http_response(),
    }
}
