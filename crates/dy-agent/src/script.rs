//! Canned responses and timing for the simulated agent.

use std::time::Duration;

use dy_protocol::Message;

pub const DEFAULT_INITIAL_DELAY_MS: u64 = 600;
pub const DEFAULT_COMPLETION_DELAY_MS: u64 = 2000;
pub const DEFAULT_GREETING: &str = "I'm Dyad. What are we building today?";
pub const DEFAULT_ACKNOWLEDGMENT: &str =
    "Analyzing \"{input}\"... I'll start by scaffolding the core components.";
pub const DEFAULT_COMPLETION: &str = "Update complete. The changes are now live in the preview.";

/// Placeholder in the acknowledgment template replaced by the user's prompt.
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// Timing and text of the scripted response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorConfig {
    /// Delay between submission and the acknowledgment (ms).
    pub initial_delay_ms: u64,
    /// Delay between the acknowledgment and completion (ms).
    pub completion_delay_ms: u64,
    /// Assistant message a fresh transcript starts with, if any.
    pub greeting: Option<String>,
    /// Acknowledgment template; `{input}` is replaced verbatim.
    pub acknowledgment: String,
    pub completion: String,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: DEFAULT_INITIAL_DELAY_MS,
            completion_delay_ms: DEFAULT_COMPLETION_DELAY_MS,
            greeting: Some(DEFAULT_GREETING.to_string()),
            acknowledgment: DEFAULT_ACKNOWLEDGMENT.to_string(),
            completion: DEFAULT_COMPLETION.to_string(),
        }
    }
}

impl SimulatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delays(mut self, initial_ms: u64, completion_ms: u64) -> Self {
        self.initial_delay_ms = initial_ms;
        self.completion_delay_ms = completion_ms;
        self
    }

    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = Some(greeting.into());
        self
    }

    pub fn without_greeting(mut self) -> Self {
        self.greeting = None;
        self
    }

    pub fn with_acknowledgment(mut self, template: impl Into<String>) -> Self {
        self.acknowledgment = template.into();
        self
    }

    pub fn with_completion(mut self, completion: impl Into<String>) -> Self {
        self.completion = completion.into();
        self
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn completion_delay(&self) -> Duration {
        Duration::from_millis(self.completion_delay_ms)
    }

    /// Render the acknowledgment for `input`.
    pub fn acknowledge(&self, input: &str) -> String {
        self.acknowledgment.replace(INPUT_PLACEHOLDER, input)
    }

    /// Messages a new or reset transcript contains.
    pub fn initial_transcript(&self) -> Vec<Message> {
        self.greeting
            .iter()
            .map(|greeting| Message::assistant(greeting.clone()))
            .collect()
    }
}
