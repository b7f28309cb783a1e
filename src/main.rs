use actix_cors::Cors;
use actix_web::http::header;
use actix_web::middleware::{Logger, from_fn};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use env_logger::Env;
use message_service::config::Config;
use message_service::routes;
use message_service::stats::{Stats, with_stats};
use message_service::store;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Init logger to show info by default, but can be overridden by RUST_LOG
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cfg = Config::from_env_config()?;

    let store = store::connect(&cfg.db).await?;
    let stats = Stats::from_config(&cfg);
    let resource_path = cfg.resource_path();
    log::info!(
        "starting message server at {} (resource {resource_path}, stats {})",
        cfg.listen_addr(),
        if cfg.stats { "on" } else { "off" }
    );

    let listen_addr = cfg.listen_addr();
    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);
        if cfg.allowed_origins.is_empty() {
            cors = cors.allow_any_origin();
        }
        for origin in &cfg.allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        let resource_path = resource_path.clone();
        let body_limit = cfg.max_body_bytes;
        App::new()
            .wrap(from_fn(with_stats))
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(Data::from(store.clone()))
            .app_data(Data::new(stats.clone()))
            .configure(move |c| routes::configure(c, &resource_path, body_limit))
    })
    .bind(listen_addr)?
    .run()
    .await?;
    Ok(())
}
