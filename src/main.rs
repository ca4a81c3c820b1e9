use folder_guard::configuration::get_configuration;
use folder_guard::startup::Application;
use folder_guard::telemetry::get_subscriber;
use folder_guard::telemetry::init_subscriber;

/// Initialise telemetry, load config, and start the server
#[tokio::main] // requires tokio features: macros, rt-multi-thread
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("folder-guard", "info", std::io::stdout);
    init_subscriber(subscriber);

    // a bad folder map (e.g. a name with an embedded '/') fails here, before
    // the server ever binds; at request time the engine only ever fails open
    let cfg = get_configuration()?;
    let server = Application::build(cfg).await?;
    server.run_until_stopped().await?;

    Ok(())
}
