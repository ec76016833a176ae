use std::sync::Arc;

use mnemo_service::MnemoService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<MnemoService>,
}
impl AppState {
	pub fn new(config: mnemo_config::Config) -> Self {
		Self { service: Arc::new(MnemoService::new(config)) }
	}
}
