// handlers/protected/mod.rs - Protected handlers (scope required)
//
// Every route here is wrapped with `middleware::require_scope` when the router
// is built; handlers take the decoded `AuthPayload` as their first argument.

pub mod drinks;
pub mod utils;

pub use drinks::create as drinks_create;
pub use drinks::delete as drinks_delete;
pub use drinks::list_detail as drinks_list_detail;
pub use drinks::update as drinks_update;
