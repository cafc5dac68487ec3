use imgdrop_core::UploadConfig;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = UploadConfig::from_env()?;

    // Initialize the application (telemetry, state, routes)
    let (_state, router) = imgdrop_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    imgdrop_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
