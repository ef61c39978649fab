use anyhow::Context;
use longbox_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load longbox settings")?;
    longbox_telemetry::init(&settings.telemetry)?;

    longbox_app::bootstrap::run(settings).await
}
