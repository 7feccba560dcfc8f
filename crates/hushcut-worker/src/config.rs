//! Worker configuration.

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Work directory for per-job scratch and output files
    pub work_dir: String,
    /// Noise floor for amplitude silence detection, in dBFS
    pub silence_threshold_db: f64,
    /// Minimum silence run length that counts as a removable gap
    pub min_silence_secs: f64,
    /// Maximum gap bridged when merging adjacent utterances
    pub merge_gap_secs: f64,
    /// Timeout applied to each external tool invocation, if any
    pub tool_timeout_secs: Option<u64>,
    /// Path to the Whisper model file; absent disables the speech tier
    pub speech_model_path: Option<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            work_dir: "/tmp/hushcut".to_string(),
            silence_threshold_db: hushcut_media::DEFAULT_THRESHOLD_DB,
            min_silence_secs: hushcut_media::DEFAULT_MIN_SILENCE_SECS,
            merge_gap_secs: hushcut_media::DEFAULT_MERGE_GAP_SECS,
            tool_timeout_secs: None,
            speech_model_path: None,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            work_dir: std::env::var("HUSHCUT_WORK_DIR").unwrap_or(defaults.work_dir),
            silence_threshold_db: std::env::var("HUSHCUT_SILENCE_THRESHOLD_DB")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.silence_threshold_db),
            min_silence_secs: std::env::var("HUSHCUT_MIN_SILENCE_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.min_silence_secs),
            merge_gap_secs: std::env::var("HUSHCUT_MERGE_GAP_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.merge_gap_secs),
            tool_timeout_secs: std::env::var("HUSHCUT_TOOL_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok()),
            speech_model_path: std::env::var("HUSHCUT_SPEECH_MODEL").ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorkerConfig::default();
        assert_eq!(config.silence_threshold_db, -50.0);
        assert_eq!(config.min_silence_secs, 1.0);
        assert!(config.tool_timeout_secs.is_none());
        assert!(config.speech_model_path.is_none());
    }
}
