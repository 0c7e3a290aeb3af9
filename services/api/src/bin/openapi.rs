//! services/api/src/bin/openapi.rs
//!
//! Prints the OpenAPI specification for the API service to stdout, for
//! generating clients without starting the server.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

fn main() {
    match ApiDoc::openapi().to_pretty_json() {
        Ok(spec) => println!("{}", spec),
        Err(e) => {
            eprintln!("Failed to serialize OpenAPI spec: {}", e);
            std::process::exit(1);
        }
    }
}
