// handlers/mod.rs - Two-tier handler layout
//
// Public (no token) → Protected (bearer token carrying the route's scope)
pub mod public;
pub mod protected;
