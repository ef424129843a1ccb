//! Engine configuration, following the teacher crate's `ValidatorConfig`
//! pattern: one struct, a `Default` impl carrying spec.md's constants, and
//! environment-driven overrides for the bits that are genuinely
//! deployment-specific (the AI reviewer's credentials).

use std::env;
use std::time::Duration;

/// Tunables for input limits, detector bounds, and timeouts. The defaults
/// are exactly the constants spec.md names; callers needing different
/// bounds (e.g. for a smaller/faster test run) construct their own.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub max_rows: usize,
    pub max_file_size_bytes: usize,
    pub max_account_id_len: usize,
    pub max_self_transfer_ratio: f64,

    pub cycle_max_cycles: usize,
    pub cycle_max_degree: usize,
    pub cycle_max_start_nodes: usize,
    pub cycle_max_depth: usize,

    pub smurfing_high_volume_threshold: usize,
    pub smurfing_min_fan: usize,
    pub smurfing_merchant_ratio_in_degree: usize,
    pub smurfing_merchant_ratio: usize,
    pub smurfing_window: Duration,

    pub shell_tx_count_threshold: usize,
    pub shell_high_volume_threshold: usize,
    pub shell_min_len: usize,
    pub shell_max_len: usize,
    pub shell_max_rings: usize,

    pub shell_skip_node_threshold: usize,
    pub cycle_timeout_small: Duration,
    pub cycle_timeout_large: Duration,
    pub cycle_timeout_node_threshold: usize,
    pub smurfing_timeout: Duration,
    pub shell_timeout: Duration,

    pub graph_visualization_cap: usize,

    pub ai_reviewer: AiReviewerConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_rows: 50_000,
            max_file_size_bytes: 20 * 1024 * 1024,
            max_account_id_len: 100,
            max_self_transfer_ratio: 0.5,

            cycle_max_cycles: 500,
            cycle_max_degree: 8,
            cycle_max_start_nodes: 300,
            cycle_max_depth: 5,

            smurfing_high_volume_threshold: 50,
            smurfing_min_fan: 10,
            smurfing_merchant_ratio_in_degree: 15,
            smurfing_merchant_ratio: 15,
            smurfing_window: Duration::from_secs(72 * 3600),

            shell_tx_count_threshold: 3,
            shell_high_volume_threshold: 50,
            shell_min_len: 4,
            shell_max_len: 6,
            shell_max_rings: 200,

            shell_skip_node_threshold: 2000,
            cycle_timeout_small: Duration::from_secs(15),
            cycle_timeout_large: Duration::from_secs(10),
            cycle_timeout_node_threshold: 1000,
            smurfing_timeout: Duration::from_secs(15),
            shell_timeout: Duration::from_secs(10),

            graph_visualization_cap: 500,

            ai_reviewer: AiReviewerConfig::from_env(),
        }
    }
}

impl AnalysisConfig {
    pub fn cycle_timeout(&self, node_count: usize) -> Duration {
        if node_count <= self.cycle_timeout_node_threshold {
            self.cycle_timeout_small
        } else {
            self.cycle_timeout_large
        }
    }

    pub fn shell_detection_skipped(&self, node_count: usize) -> bool {
        node_count > self.shell_skip_node_threshold
    }
}

/// Configuration for the optional §4.7 AI reviewer stage. Mirrors the
/// Python reference's `GROQ_API_KEY` / `GROQ_MODEL` globals: absence of an
/// API key disables the stage silently rather than erroring.
#[derive(Debug, Clone)]
pub struct AiReviewerConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
}

impl AiReviewerConfig {
    /// Reads `GROQ_API_KEY` (spec.md §6 names this exact variable) from the
    /// environment. A missing key disables the reviewer; it is not an
    /// error.
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("GROQ_API_KEY").ok().filter(|k| !k.is_empty()),
            endpoint: env::var("GROQ_API_BASE")
                .unwrap_or_else(|_| "https://api.groq.com/openai/v1/chat/completions".to_string()),
            model: env::var("GROQ_MODEL").unwrap_or_else(|_| "llama-3.3-70b-versatile".to_string()),
            temperature: 0.1,
        }
    }

    pub fn enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

/// CORS allow-list entry read from the environment, per spec.md §6. Not
/// used by this crate directly (CORS is the HTTP layer's job) but exposed
/// so that layer can build its allow-list the same way the Python
/// reference does.
pub fn frontend_url() -> Option<String> {
    env::var("FRONTEND_URL").ok().filter(|u| !u.is_empty())
}
