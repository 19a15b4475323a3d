/// Constants module to avoid magic numbers in the codebase

// Network Configuration
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 8888;
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

// External runtime
pub const DEFAULT_OLLAMA_BINARY: &str = "ollama";
pub const DEFAULT_INSTALLER_SCRIPT: &str = "./ollama_pull_and_run.sh";

// Timeouts
pub const COMMAND_TIMEOUT_SECS: u64 = 30;
pub const GENERATION_TIMEOUT_SECS: u64 = 60;
pub const INSTALL_TIMEOUT_SECS: u64 = 1800; // 30 minutes for large model pulls
pub const SLOW_REQUEST_THRESHOLD_MS: u64 = 2000;

// Install worker
pub const INSTALL_QUEUE_CAPACITY: usize = 32;

// Default Model Configuration
pub const DEFAULT_MODEL: &str = "llama3.1:8b";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

// Models advertised by the relay out of the box
pub const DEFAULT_CATALOG: &[&str] = &[
    // Coding & software engineering
    "qwen2.5-coder:7b",
    "deepseek-coder:6.7b",
    "deepseek-r1",
    "glm-4.6",
    "deepseek-v3.1",
    // Vision-language & multimodal
    "qwen3-vl",
    "llava:7b",
    "moondream:1.8b",
    // General chat & reasoning
    "qwen3:7b",
    "llama3.1:8b",
    "gemma2:9b",
    "mistral:7b",
    // Lightweight / edge & embeddings
    "phi3:mini",
    "tinyllama:1.1b",
    "nomic-embed-text",
];
