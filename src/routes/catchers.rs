//! Catchers aligning framework-level failures with the API error taxonomy.

use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{Request, catch};
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Unknown routes answer with a plain message naming method and path.
#[catch(404)]
pub fn not_found(req: &Request<'_>) -> String {
    format!("Route not found :: {} {}", req.method(), req.uri())
}

/// Rocket reports unparseable request bodies as 422; the API treats them as
/// bad input.
#[catch(422)]
pub fn unprocessable(req: &Request<'_>) -> status::Custom<Json<ErrorBody>> {
    status::Custom(
        Status::BadRequest,
        Json(ErrorBody {
            error: "BadRequest".to_string(),
            message: format!("Malformed request body for {} {}", req.method(), req.uri()),
        }),
    )
}

#[catch(500)]
pub fn internal_error() -> Json<ErrorBody> {
    Json(ErrorBody {
        error: "InternalError".to_string(),
        message: "An internal error occurred".to_string(),
    })
}
