pub mod api;
pub mod error;

use crate::cli::Args;
use crate::relay::Relay;
use std::error::Error;

pub use self::api::{ build_router, AppState };
pub use self::error::ApiError;

pub struct Server {
    relay: Relay,
    args: Args,
}

impl Server {
    pub fn new(relay: Relay, args: Args) -> Self {
        Self { relay, args }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        api::start_http_server(&self.args, self.relay.clone()).await
    }
}
