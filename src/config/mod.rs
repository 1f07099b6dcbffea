use std::path::PathBuf;

use crate::cli::Args;

pub const DEFAULT_MODEL: &str = "meta-llama/llama-4-maverick:free";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub context_path: PathBuf,
    pub ui_context_path: PathBuf,
    pub versions_root: PathBuf,
    pub default_model: String,
    pub api_key: Option<String>,
    pub api_base: String,
    pub referer: String,
    pub title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            context_path: "context/prompt-v3.md".into(),
            ui_context_path: "context/ui-docs.md".into(),
            versions_root: "versions".into(),
            default_model: DEFAULT_MODEL.into(),
            api_key: None,
            api_base: "https://openrouter.ai/api".into(),
            referer: "http://localhost:3000".into(),
            title: "Scriptforge Relay".into(),
        }
    }
}

impl Config {
    /// Flags win over environment, environment over defaults.
    pub fn from_args(args: &Args) -> Self {
        let mut cfg = Config::default();
        cfg.port = args.port;
        cfg.context_path = PathBuf::from(&args.context);
        cfg.ui_context_path = PathBuf::from(&args.ui_context);
        if let Ok(root) = std::env::var("SCRIPTS_PATH") {
            if !root.trim().is_empty() {
                cfg.versions_root = PathBuf::from(root);
            }
        }
        if let Some(dir) = &args.versions_dir {
            cfg.versions_root = PathBuf::from(dir);
        }
        if let Some(model) = &args.model {
            cfg.default_model = model.clone();
        }
        cfg.api_key = std::env::var("OPENROUTER_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        cfg
    }
}
