use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use gemgate_core::proxy::BatchMode;

#[derive(Parser)]
#[command(
    name = "gemgate",
    about = "gemgate - password-gated Gemini chat and image proxy",
    version = env!("CARGO_PKG_VERSION"),
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, help = "Listen port (overrides config and GEMGATE_PORT)")]
    pub port: Option<u16>,

    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the server (default if no command specified)")]
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },

    #[command(about = "Interactive chat in the terminal")]
    Chat(ChatArgs),

    #[command(subcommand, about = "Inspect configuration")]
    Config(ConfigCommands),
}

#[derive(Args, Debug)]
pub struct ChatArgs {
    #[arg(long, help = "Use the image model (results are saved as files)")]
    pub image: bool,

    #[arg(short, long, help = "Chat model (defaults to gateway.chat_model)")]
    pub model: Option<String>,

    #[arg(long, help = "Gemini API key (defaults to GEMINI_API_SECRET / config)")]
    pub api_key: Option<String>,

    #[arg(long, help = "Preset prefix, e.g. Logo or Poster")]
    pub preset: Option<String>,

    #[arg(long = "style", help = "Style tag (repeatable)")]
    pub styles: Vec<String>,

    #[arg(long, help = "Free-form style text")]
    pub custom_style: Option<String>,

    #[arg(long, help = "Aspect ratio, e.g. 16:9")]
    pub aspect_ratio: Option<String>,

    #[arg(long, conflicts_with = "full_set", help = "Generations per style")]
    pub variations: Option<usize>,

    #[arg(long, requires = "variations", help = "Label variation results with their style")]
    pub label_styles: bool,

    #[arg(long, help = "Generate landing, blog and product pages")]
    pub full_set: bool,

    #[arg(short, long, default_value = ".", help = "Directory for generated images")]
    pub out_dir: PathBuf,
}

impl ChatArgs {
    pub fn batch_mode(&self) -> BatchMode {
        if self.full_set {
            BatchMode::FullSet
        } else if let Some(count) = self.variations {
            BatchMode::Variations { count, label_styles: self.label_styles }
        } else {
            BatchMode::Single
        }
    }
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Show current configuration (secrets masked)")]
    Show {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat_args(argv: &[&str]) -> ChatArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Some(Commands::Chat(args)) => args,
            _ => panic!("expected chat command"),
        }
    }

    #[test]
    fn bare_invocation_serves() {
        let cli = Cli::try_parse_from(["gemgate", "--port", "8080"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.port, Some(8080));
    }

    #[test]
    fn chat_flags_build_batch_mode() {
        let args = chat_args(&["gemgate", "chat", "--image", "--style", "Retro", "--style", "Dark Mode", "--variations", "2"]);
        assert!(args.image);
        assert_eq!(args.styles, vec!["Retro", "Dark Mode"]);
        assert_eq!(args.batch_mode(), BatchMode::Variations { count: 2, label_styles: false });

        let full = chat_args(&["gemgate", "chat", "--image", "--full-set"]);
        assert_eq!(full.batch_mode(), BatchMode::FullSet);
        assert_eq!(chat_args(&["gemgate", "chat"]).batch_mode(), BatchMode::Single);
    }

    #[test]
    fn full_set_and_variations_conflict() {
        assert!(Cli::try_parse_from(["gemgate", "chat", "--full-set", "--variations", "2"]).is_err());
    }
}
