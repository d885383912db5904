#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Election map API server binary.
//!
//! Configuration comes from environment variables; see
//! [`election_map_server::ServerConfig`].

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    election_map_server::run_server().await
}
