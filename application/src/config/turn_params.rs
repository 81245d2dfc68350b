//! Turn parameters: use case control for one dispatch cycle.
//!
//! [`TurnParams`] groups the static parameters that control
//! [`RunTurnUseCase`](crate::use_cases::run_turn::RunTurnUseCase) and the
//! dispatch decision in [`ChatEngine`](crate::use_cases::handle_inbound::ChatEngine).

use serde::{Deserialize, Serialize};
use std::time::Duration;
use turnstile_domain::ChatParameters;

/// Turn control parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnParams {
    /// Chance that a mention forces a dispatch before the counter runs out.
    pub at_react_possibility: f64,
    /// Upper bound on one backend call. `None` waits indefinitely.
    pub dispatch_timeout: Option<Duration>,
    /// Backend calls per turn; each attempt takes the next pool member.
    pub dispatch_attempts: usize,
    pub temperature: Option<f32>,
    /// Characters per second for fragment pacing (0 disables).
    pub words_per_second: u32,
    /// Sender id used when echoing the bot's own fragments into the window.
    pub bot_id: String,
    pub bot_name: String,
}

impl Default for TurnParams {
    fn default() -> Self {
        Self {
            at_react_possibility: 0.5,
            dispatch_timeout: Some(Duration::from_secs(60)),
            dispatch_attempts: 1,
            temperature: None,
            words_per_second: 0,
            bot_id: "bot".to_string(),
            bot_name: "turnstile".to_string(),
        }
    }
}

impl TurnParams {
    // ==================== Builder Methods ====================

    pub fn with_at_react_possibility(mut self, p: f64) -> Self {
        self.at_react_possibility = p;
        self
    }

    pub fn with_dispatch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.dispatch_timeout = timeout;
        self
    }

    pub fn with_dispatch_attempts(mut self, attempts: usize) -> Self {
        self.dispatch_attempts = attempts;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_bot_identity(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.bot_id = id.into();
        self.bot_name = name.into();
        self
    }

    // ==================== Derived Values ====================

    pub fn chat_parameters(&self) -> ChatParameters {
        ChatParameters {
            temperature: self.temperature,
            max_tokens: None,
        }
    }

    /// At least one attempt is always made.
    pub fn attempts(&self) -> usize {
        self.dispatch_attempts.max(1)
    }
}
