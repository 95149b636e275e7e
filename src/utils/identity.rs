// src/utils/identity.rs

use std::sync::LazyLock;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use rand::Rng;
use regex::Regex;

use crate::{
    config::Config,
    utils::jwt::{bearer_token, verify_jwt},
};

pub const GUEST_HEADER: &str = "x-guest-id";

const GUEST_PREFIX: &str = "guest_";
const GUEST_ID_LEN: usize = 10;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

static GUEST_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^guest_[a-z0-9]{10}$").expect("guest id pattern is valid")
});

/// Who is taking a test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    User(String),
    Guest(String),
}

impl Identity {
    /// Owner id attempts are recorded under.
    pub fn id(&self) -> &str {
        match self {
            Identity::User(id) | Identity::Guest(id) => id,
        }
    }
}

/// `guest_` followed by ten random base36 characters.
pub fn generate_guest_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..GUEST_ID_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    format!("{GUEST_PREFIX}{suffix}")
}

pub fn is_guest_id(value: &str) -> bool {
    GUEST_ID.is_match(value)
}

/// Axum Middleware: user or guest identity.
///
/// A bearer token wins and must be valid. Without one, a well-formed
/// `X-Guest-Id` header identifies a guest. Anything else is 401.
pub async fn identity_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let identity = if let Some(token) = bearer_token(req.headers()) {
        let claims =
            verify_jwt(token, &config.jwt_secret).map_err(|_| StatusCode::UNAUTHORIZED)?;
        Identity::User(claims.sub)
    } else {
        let guest = req
            .headers()
            .get(GUEST_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| is_guest_id(value))
            .ok_or(StatusCode::UNAUTHORIZED)?;
        Identity::Guest(guest.to_string())
    };

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
