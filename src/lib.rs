pub mod db;
pub mod play;
pub mod server;
pub mod telemetry;
