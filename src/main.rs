use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use taskledger::{config::Config, routes, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let state = AppState::from_config(&config).await.map_err(|e| {
        log::error!("failed to initialise storage: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;

    log::info!("Starting server at {}", config.server_url());
    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .configure(move |cfg| routes::configure_app(cfg, &state))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
