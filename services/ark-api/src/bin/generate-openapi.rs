//! Writes the OpenAPI document without starting the server.
//!
//! Security declarations follow `AUTH_MODE` and `PUBLIC_ROUTES`, exactly as
//! the `/openapi.json` endpoint would serve them.
//!
//! ```sh
//! AUTH_MODE=hybrid cargo run -p ark-api --bin generate-openapi -- openapi.json
//! ```

use anyhow::Context;
use ark_api::auth::{public_routes, AuthMode};
use ark_api::openapi;
use std::env;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let path = env::args().nth(1).unwrap_or_else(|| "openapi.json".to_string());
    let auth_mode = AuthMode::parse(&env::var("AUTH_MODE").unwrap_or_default());
    let routes = public_routes(env::var("PUBLIC_ROUTES").ok().as_deref());

    let schema = openapi::render(auth_mode, &routes)?;
    let rendered = serde_json::to_string_pretty(&schema)?;
    std::fs::write(&path, rendered).with_context(|| format!("writing {path}"))?;

    println!("OpenAPI schema written to {path}");
    Ok(())
}
