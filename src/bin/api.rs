use std::sync::Arc;
use stock_voice_assistant::{
    api::{start_server, MessagingEndpoint},
    config::AssistantConfig,
    llm::GeminiClient,
    market::YahooFinanceClient,
    speech::{ElevenLabsTts, Speaker},
    Pipeline,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = AssistantConfig::from_env()?;

    info!("Stock Voice Assistant - API Server");
    info!("Port: {}", config.port);

    // Create clients (one per external service, shared by all requests)
    let model = Arc::new(GeminiClient::new(
        config.llm_api_key.clone(),
        config.llm_model.clone(),
        config.http_timeout,
    )?);
    info!("Language model: {}", model.model());

    let market = Arc::new(YahooFinanceClient::new(
        &config.market_data_url,
        config.http_timeout,
    )?);

    let tts = ElevenLabsTts::new(
        config.tts_api_key.clone(),
        config.voice_id.clone(),
        config.tts_model.clone(),
        config.output_format.clone(),
        config.http_timeout,
    )?;

    let pipeline = Arc::new(Pipeline::new(model, market));
    let endpoint = MessagingEndpoint::new(pipeline, Arc::new(Speaker::new(tts)));

    info!("Assistant initialized");

    start_server(endpoint, &config.bind_addr()).await?;

    Ok(())
}
