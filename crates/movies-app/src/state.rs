use std::sync::Arc;

use movies_dal::Pool;
use time::Date;

use crate::clock::{Clock, SystemClock};

#[derive(Clone)]
pub struct AppState {
    state: Arc<AppStateInner>,
}

impl AppState {
    pub fn new(app_config: AppConfig, pool: Pool) -> Self {
        Self::with_clock(app_config, pool, Arc::new(SystemClock))
    }

    pub fn with_clock(app_config: AppConfig, pool: Pool, clock: Arc<dyn Clock>) -> Self {
        AppState {
            state: Arc::new(AppStateInner {
                app_config,
                pool,
                clock,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.state.app_config
    }

    pub fn pool(&self) -> &Pool {
        &self.state.pool
    }

    /// Evaluation date for validation
    pub fn today(&self) -> Date {
        self.state.clock.today()
    }
}

struct AppStateInner {
    pool: Pool,
    app_config: AppConfig,
    clock: Arc<dyn Clock>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub default_page_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_page_size: 100,
        }
    }
}
