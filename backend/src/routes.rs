use actix_files::Files;
use actix_web::{HttpResponse, web};
use log::info;
use serde_json::json;
use shared::ClientConfig;

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: String) {
    configure_api(cfg);
    cfg.service(Files::new("/", frontend_dir).index_file("index.html"));
}

pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/config").route(web::get().to(get_config)))
        .service(web::resource("/api/health").route(web::get().to(health)));
}

async fn get_config(config: web::Data<ClientConfig>) -> HttpResponse {
    info!("Serving client configuration");
    HttpResponse::Ok().json(config.get_ref())
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
