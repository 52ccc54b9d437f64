use rocket::Request;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde_json::{Value, json};

use super::session::SessionStore;

pub const SESSION_COOKIE: &str = "session_token";

/// The authenticated admin, resolved from the private session cookie.
/// Every data route takes this guard.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub username: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let token = request
            .cookies()
            .get_private(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string());

        let Some(token) = token else {
            return Outcome::Error((Status::Unauthorized, ()));
        };

        let sessions = match request.rocket().state::<SessionStore>() {
            Some(sessions) => sessions,
            None => {
                tracing::error!("Session store not found in managed state");
                return Outcome::Error((Status::InternalServerError, ()));
            }
        };

        match sessions.validate(&token).await {
            Some(session) => {
                tracing::info!(username = %session.username, "Admin authenticated via session token");
                Outcome::Success(AdminUser {
                    username: session.username,
                })
            }
            None => {
                tracing::warn!("Invalid or expired session token");
                Outcome::Error((Status::Unauthorized, ()))
            }
        }
    }
}

#[catch(401)]
pub fn unauthorized_api(_req: &Request) -> Custom<Json<Value>> {
    let error_json = json!({
        "error": "Unauthorized",
        "message": "Authentication required"
    });

    Custom(Status::Unauthorized, Json(error_json))
}
