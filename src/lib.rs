pub mod database;
pub mod model;
pub mod observability;
pub mod rate_limiting;
pub mod routes;
pub mod services;
pub mod startup;
