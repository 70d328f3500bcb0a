use std::sync::Arc;

use dash_app::cli::ProbeArgs;
use dash_app::cli::ProbeTarget;
use dash_app::config_loader;
use dash_app::config_loader::DashboardConfig;
use dash_app::tracing_setup;
use dash_http::RemoteClient;
use dash_http::RemoteClientConfig;
use dash_http::Request;
use dash_repository::CouponRepository;
use dash_repository::UserRepository;
use dash_types::ApiResult;
use dash_types::Fold;
use tracing::error;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = ProbeArgs::from_env_args();

    // Without a config file the client is configured from DASH_API_* / DASH_CB_* variables
    let (dashboard, client_config) = match &args.config {
        Some(path) => {
            let dashboard = config_loader::load_config_or_default(path);
            let client_config = dashboard.api.to_client_config();
            (dashboard, client_config)
        }
        None => (DashboardConfig::default(), RemoteClientConfig::from_env()),
    };

    let _guard = tracing_setup::init("dash_probe", &dashboard.logging);
    info!(base_url = %client_config.base_url, target = ?args.target, "dash_probe starting");

    let client = Arc::new(RemoteClient::new(client_config)?);
    if let Ok(token) = std::env::var("DASH_API_TOKEN") {
        client.set_token(token)?;
    }

    let output: ApiResult<serde_json::Value> = match args.target {
        ProbeTarget::Raw(path) => client.get(Request::new(path)).await,
        ProbeTarget::Coupons { page } => {
            CouponRepository::new(Arc::clone(&client)).list(page).await.and_then(|p| serde_json::to_value(p).map_err(to_api_error))
        }
        ProbeTarget::Users { page } => {
            UserRepository::new(Arc::clone(&client)).list(page).await.and_then(|p| serde_json::to_value(p).map_err(to_api_error))
        }
    };

    let stats = client.circuit_breaker().stats();
    info!(state = ?stats.state, failures = stats.failure_count, "Circuit breaker after probe");

    output.fold(
        |value| {
            println!("{}", serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()));
            Ok(())
        },
        |err| {
            error!(code = %err.code, status = err.status, message = %err.message, "Probe failed");
            Err(anyhow::anyhow!("{}: {}", err.code, err.user_message()))
        },
    )
}

fn to_api_error(err: serde_json::Error) -> dash_types::ApiError {
    dash_types::ApiError::serialization(err.to_string())
}
