use crate::{api::AppState, config::Settings, error, server::start_api_server};

pub async fn serve(settings: &Settings, state: AppState) {
    if let Err(e) = start_api_server(&settings.server_address, state).await {
        error!("Server stopped. Err: {}", e);
    }
}
