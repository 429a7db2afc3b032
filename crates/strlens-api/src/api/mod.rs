//! APIモジュール

mod handlers;
mod routes;
mod state;

pub use handlers::{
  create_string, delete_string, filter_by_natural_language, get_string, health_check,
  list_strings, method_not_allowed, route_not_found,
};
pub use routes::{create_router, run_server};
pub use state::AppState;
