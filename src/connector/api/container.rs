use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::application::{CompletionProvider, StreamCompletionUseCase};
use crate::connector::{MockCompletionProvider, OpenAiClient};

/// Pacing applied to the mock provider so its replies visibly stream.
const MOCK_FRAGMENT_DELAY: Duration = Duration::from_millis(80);

pub struct ContainerConfig {
    /// Serve canned replies instead of calling a real provider.
    pub mock_provider: bool,
    /// Directory mounted under `/static`.
    pub static_dir: PathBuf,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            mock_provider: false,
            static_dir: PathBuf::from("static"),
        }
    }
}

/// Wires configuration, the completion provider and the use cases served by
/// the HTTP api. Built once at startup and shared read-only between requests.
pub struct Container {
    stream_use_case: Arc<StreamCompletionUseCase>,
    config: ContainerConfig,
}

impl Container {
    /// Build from the process environment. Missing provider credentials are
    /// not fatal; every chat request then answers with a configuration notice.
    pub fn new(config: ContainerConfig) -> Self {
        let provider: Option<Arc<dyn CompletionProvider>> = if config.mock_provider {
            debug!("Using mock completion provider");
            Some(Arc::new(
                MockCompletionProvider::echo().with_delay(MOCK_FRAGMENT_DELAY),
            ))
        } else {
            match OpenAiClient::from_env() {
                Ok(client) => {
                    debug!(
                        "Using OpenAI-compatible provider at {} (model {})",
                        client.endpoint(),
                        client.model_name()
                    );
                    Some(Arc::new(client))
                }
                Err(e) => {
                    warn!("{e}");
                    None
                }
            }
        };

        Self::with_provider(provider, config)
    }

    /// Build around an explicit provider (`None` = credentials absent).
    pub fn with_provider(
        provider: Option<Arc<dyn CompletionProvider>>,
        config: ContainerConfig,
    ) -> Self {
        Self {
            stream_use_case: Arc::new(StreamCompletionUseCase::new(provider)),
            config,
        }
    }

    pub fn stream_use_case(&self) -> Arc<StreamCompletionUseCase> {
        self.stream_use_case.clone()
    }

    pub fn provider_configured(&self) -> bool {
        self.stream_use_case.is_configured()
    }

    pub fn static_dir(&self) -> &Path {
        &self.config.static_dir
    }
}
