//! REST API for managing tours.
//!
//! - `GET /health`
//! - `GET /tours` with `status`, `search`, `location`, `minPrice`, `maxPrice` filters
//! - `GET /tours/{id}`
//! - `POST /tours`, `PUT /tours/{id}`, `DELETE /tours/{id}` (bearer token, multipart bodies)
//! - `GET /uploads/...` serves stored tour images

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use auth::{AuthError, Authenticated, Claims, JwtAuth};
pub use error::{ApiError, AppError};
pub use router::create_router;
pub use state::AppState;
