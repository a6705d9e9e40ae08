// Post-deployment validation binary.
//
// Runs after every deployment: samples the deployed site, probes it
// through every category validator, and exits 0 only when no hard
// failure remains. CI wires the exit status straight into the
// promote/rollback decision.

use anyhow::Result;
use log::error;

use sitewarden::config::ValidationConfig;
use sitewarden::orchestrator::run_validation;
use sitewarden::report::{render_report, write_ci_outputs};

async fn run() -> Result<bool> {
    let config = ValidationConfig::from_env()?;
    let summary = run_validation(&config).await?;

    render_report(&summary);
    if let Some(path) = &config.ci_output_path {
        write_ci_outputs(&summary, path)?;
    }

    Ok(summary.success)
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let code = match run().await {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(err) => {
            // Configuration-level problems fail loud: log and block
            error!("validation aborted: {err:#}");
            1
        }
    };
    std::process::exit(code);
}
