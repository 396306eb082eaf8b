use std::io;

use actix_web::{middleware::Logger, web, App, HttpServer};
use taskdesk::{
    auth::{AuthMiddleware, AuthService, TokenService},
    config::Config,
    routes,
    store::Stores,
};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| {
        log::error!("invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    let stores = Stores::connect(&config).await.map_err(|e| {
        log::error!("failed to open the store: {}", e);
        io::Error::new(io::ErrorKind::Other, e)
    })?;

    let tokens = TokenService::new(&config.jwt);
    let auth = AuthService::new(stores.users.clone(), tokens.clone(), config.bcrypt_cost);
    let cors_origin = config.cors_allowed_origin.clone();

    log::info!("Starting taskdesk server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(auth.clone()))
            .app_data(web::Data::from(stores.tasks.clone()))
            .wrap(AuthMiddleware::new(tokens.clone()))
            .wrap(routes::cors(&cors_origin))
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
