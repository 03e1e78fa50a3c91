pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod relay;
pub mod server;
pub mod session;

use cli::{ Args, ChatArgs };
use config::generation::GenerationConfig;
use log::{ info, warn };
use relay::Relay;
use server::Server;
use session::{ ChatSession, HttpRelayClient, TerminalView };
use std::error::Error;
use tokio::io::{ AsyncBufReadExt, BufReader };

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let generation = GenerationConfig::from_args(&args)?;

    info!("--- Relay Configuration ---");
    info!("Listen Address: {}", args.server_addr());
    info!("Model: {}", generation.model);
    info!("Base URL: {}", generation.base_url);
    info!("Max Output Tokens: {}", generation.max_output_tokens);
    info!("Temperature: {}", generation.temperature);
    for setting in &generation.safety_settings {
        info!("Safety: {} = {}", setting.category, setting.threshold);
    }
    info!("Request Timeout: {:?}", generation.request_timeout);
    info!("Rate Limit: {}", match args.rate_limit_per_second {
        0 => "disabled".to_string(),
        n => format!("{}/s", n),
    });
    info!("TLS Enabled: {}", args.enable_tls);
    info!("---------------------------");

    let api_key = args.api_key();
    if api_key.is_none() {
        warn!("GOOGLE_API_KEY is not set. Every question will fail with a credential error.");
    }

    let client = llm::new_client(api_key, &generation)?;
    let server = Server::new(Relay::new(client), args);
    server.run().await
}

pub async fn run_chat(args: ChatArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("Relay endpoint: {}", args.relay_url);

    let mut session = ChatSession::new(HttpRelayClient::new(args.relay_url), TerminalView::stdout());
    session.view_mut().prompt();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let outcome = session.submit_question(&line).await;
        if matches!(outcome, session::SubmitOutcome::Ignored) {
            session.view_mut().prompt();
        }
    }

    Ok(())
}
