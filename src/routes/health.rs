use actix_web::HttpResponse;

pub async fn hello() -> HttpResponse {
    HttpResponse::Ok().json("Hello from message-service!")
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "health": true,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
