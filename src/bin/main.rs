use std::sync::Arc;
use stock_voice_assistant::{
    config::AssistantConfig,
    llm::GeminiClient,
    market::YahooFinanceClient,
    speech::{ElevenLabsTts, Speaker, SpeechSynthesizer},
    Pipeline,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const GREETING: &str = "Hello! How can I help you today?";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    dotenv::dotenv().ok();
    let config = AssistantConfig::from_env()?;

    let model = Arc::new(GeminiClient::new(
        config.llm_api_key.clone(),
        config.llm_model.clone(),
        config.http_timeout,
    )?);
    let market = Arc::new(YahooFinanceClient::new(
        &config.market_data_url,
        config.http_timeout,
    )?);
    let speaker = Speaker::new(ElevenLabsTts::new(
        config.tts_api_key.clone(),
        config.voice_id.clone(),
        config.tts_model.clone(),
        config.output_format.clone(),
        config.http_timeout,
    )?);
    let pipeline = Pipeline::new(model, market);

    info!("Console assistant starting");
    println!("{}", GREETING);
    if let Err(e) = speaker.speak(GREETING).await {
        error!("Greeting playback failed: {}", e);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"Query -> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("no") {
            break;
        }

        match pipeline.run(query).await {
            Ok(response) => {
                println!("Response : {}", response.text);
                if let Err(e) = speaker.speak(&response.text).await {
                    error!("Speech failed: {}", e);
                }
            }
            Err(e) => eprintln!("Request failed: {}", e),
        }
        println!("{}", "-".repeat(60));
    }

    println!("Thank you!");
    Ok(())
}
