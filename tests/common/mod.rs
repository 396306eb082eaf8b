#![allow(dead_code)]

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{http::header, test};
use serde_json::json;
use taskdesk::auth::{AuthResponse, AuthService, TokenService};
use taskdesk::config::JwtConfig;
use taskdesk::store::Stores;

pub const ALLOWED_ORIGIN: &str = "http://localhost:5173";
pub const JWT_SECRET: &str = "integration-test-secret";

/// Everything an app instance under test shares: one in-memory store, one token service.
#[derive(Clone)]
pub struct TestContext {
    pub stores: Stores,
    pub tokens: TokenService,
    pub auth: AuthService,
}

impl TestContext {
    pub fn new() -> Self {
        let stores = Stores::in_memory();
        let tokens = TokenService::new(&JwtConfig {
            secret: JWT_SECRET.to_string(),
            ttl_seconds: 3600,
        });
        // bcrypt's minimum cost keeps the suite fast.
        let auth = AuthService::new(stores.users.clone(), tokens.clone(), 4);
        Self {
            stores,
            tokens,
            auth,
        }
    }
}

/// Builds the full application (auth gate, CORS, logger, routes) around a `TestContext`.
macro_rules! test_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($ctx.auth.clone()))
                .app_data(actix_web::web::Data::from($ctx.stores.tasks.clone()))
                .wrap(taskdesk::auth::AuthMiddleware::new($ctx.tokens.clone()))
                .wrap(taskdesk::routes::cors(common::ALLOWED_ORIGIN))
                .wrap(actix_web::middleware::Logger::default())
                .configure(taskdesk::routes::config),
        )
        .await
    };
}

pub struct TestUser {
    pub id: i32,
    pub email: String,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", self.token))
    }
}

pub async fn register_and_login_user<S, B>(
    app: &S,
    username: &str,
    email: &str,
    password: &str,
) -> Result<TestUser, String>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req_register = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "username": username,
            "email": email,
            "password": password
        }))
        .to_request();
    let resp_register = test::call_service(app, req_register).await;
    let status = resp_register.status();
    if !status.is_success() {
        let body = test::read_body(resp_register).await;
        return Err(format!(
            "Failed to register user. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }

    let req_login = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp_login = test::call_service(app, req_login).await;
    let status = resp_login.status();
    let body = test::read_body(resp_login).await;
    if !status.is_success() {
        return Err(format!(
            "Failed to log in. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }

    let auth: AuthResponse = serde_json::from_slice(&body)
        .map_err(|e| format!("Failed to parse login response: {}", e))?;

    Ok(TestUser {
        id: auth.id,
        email: auth.email,
        token: auth.token,
    })
}
