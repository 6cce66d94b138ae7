pub mod app;
mod deserializers;
pub mod flash;
mod pagination;
pub mod routes;
