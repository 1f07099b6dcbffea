use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "scriptforge", version, about = "Local relay: prompt -> OpenRouter -> versioned script file")]
pub struct Args {
    #[arg(long, default_value_t = 3000)]
    pub port: u16,

    /// Root directory for version files and the index. Overrides SCRIPTS_PATH.
    #[arg(long)]
    pub versions_dir: Option<String>,

    #[arg(long, default_value = "context/prompt-v3.md")]
    pub context: String,

    #[arg(long, default_value = "context/ui-docs.md")]
    pub ui_context: String,

    /// Default model when a request does not name one.
    #[arg(long)]
    pub model: Option<String>,
}
