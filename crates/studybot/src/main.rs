use std::sync::Arc;

use studybot_core::config::Config;

#[tokio::main]
async fn main() -> Result<(), studybot_core::Error> {
    studybot_core::logging::init("studybot")?;

    let cfg = match Config::load() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            tracing::error!(error = %e, "cannot start");
            return Err(e);
        }
    };

    studybot_telegram::router::run_polling(cfg)
        .await
        .map_err(|e| studybot_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
