use super::Stats;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::middleware::Next;
use actix_web::{web, Error};
use std::time::Instant;

/// Times the wrapped handler and reports to the [`Stats`] registered as app
/// data. Requests pass through untouched when none is registered.
pub async fn with_stats(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let start = Instant::now();
    let Some(stats) = req.app_data::<web::Data<Stats>>().cloned() else {
        return next.call(req).await;
    };

    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let tags = stats.tags(req.path(), user_agent);
    stats.observer().request_received(&tags, chrono::Utc::now());

    let res = next.call(req).await;

    stats.observer().record_latency(&tags, start.elapsed());
    res
}
