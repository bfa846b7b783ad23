use anyhow::Context;
use agora_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load Agora settings")?;
    agora_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "agora-app bootstrap starting"
    );

    let (registry, state) = agora_app::bootstrap(settings).await?;
    tracing::info!("agora-app bootstrap complete");

    let served = agora_http::start_server(&registry, state).await;
    agora_app::shut_down(&registry).await?;
    served
}
