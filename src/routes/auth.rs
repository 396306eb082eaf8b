use crate::{
    auth::{AuthResponse, AuthService, LoginRequest, RegisterRequest},
    error::AppError,
};
use actix_web::{post, web, HttpResponse, Responder};

/// Register a new user
///
/// Creates a new user account and returns its public profile (never the password hash).
///
/// ## Responses:
/// - `201 Created`: the new user.
/// - `409 Conflict`: username or email already registered.
/// - `422 Unprocessable Entity`: invalid username, email or password.
#[post("/register")]
pub async fn register(
    auth: web::Data<AuthService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let user = auth.register(register_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Login user
///
/// Authenticates a user and returns `{id, username, email, token}`.
///
/// ## Responses:
/// - `200 OK`: credentials accepted.
/// - `401 Unauthorized`: malformed credentials, unknown email or wrong password, all with
///   the same message.
#[post("/login")]
pub async fn login(
    auth: web::Data<AuthService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let (user, token) = auth.login(login_data.into_inner()).await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        token,
    }))
}
