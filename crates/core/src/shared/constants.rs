pub const DEFAULT_REFERENCE_COLUMN: &str = "text";
pub const DEFAULT_RECOGNIZED_COLUMN: &str = "rec";
pub const AUDIO_COLUMN: &str = "audio";
pub const INTENT_COLUMN: &str = "intent";

/// Intent assigned when the top prediction scores below the threshold.
pub const NONE_INTENT: &str = "None";

pub const DEFAULT_INTENT_THRESHOLD: f64 = 0.85;

/// Pause between consecutive scoring requests.
pub const DEFAULT_REQUEST_INTERVAL_MS: u64 = 500;

pub const DEFAULT_MIN_COUNT: usize = 1;
pub const DEFAULT_VERBOSITY: u8 = 2;

pub const LUIS_DEFAULT_SLOT: &str = "production";

pub const DATASET_DELIMITER: u8 = b'\t';
