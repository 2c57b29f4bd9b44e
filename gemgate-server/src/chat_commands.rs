//! `gemgate chat`: the chat and image pages as a terminal loop.
//!
//! Lines are submitted to the session; `/`-prefixed lines are commands.
//! Generated images are written to `--out-dir` instead of being shown.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use gemgate_core::modules::config::load_config;
use gemgate_core::proxy::{BatchProgress, ChatSession, GeminiClient, ImageSubmission};
use gemgate_types::{GenerationResult, InlineData, Part, PromptModifiers};

use crate::cli::ChatArgs;

const HELP: &str = "/attach <path>  queue an image for the next message (--image)\n\
                    /key <api-key>  use a different API key\n\
                    /clear          start a new conversation\n\
                    /quit           leave";

pub async fn run_chat(args: ChatArgs) -> Result<()> {
    let config = load_config()?;
    let client = GeminiClient::from_config(&config.gateway)?;
    let mut session = ChatSession::new(config.gateway.clone(), args.api_key.clone());

    let modifiers = PromptModifiers {
        preset: args.preset.clone(),
        styles: args.styles.clone(),
        custom_style: args.custom_style.clone(),
        aspect_ratio: args.aspect_ratio.clone(),
    };
    let mode = args.batch_mode();
    let model = if args.image {
        config.gateway.image_model.as_str()
    } else {
        args.model.as_deref().unwrap_or(config.gateway.chat_model.as_str())
    };

    if args.image {
        tokio::fs::create_dir_all(&args.out_dir)
            .await
            .with_context(|| format!("cannot create {}", args.out_dir.display()))?;
    }

    println!("{} {} ({})", "gemgate".cyan().bold(), model, "type /help for commands".dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut pending: Vec<InlineData> = Vec::new();
    let mut saved = 0usize;

    loop {
        stdout.write_all(format!("{} ", "you>".green().bold()).as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        if let Some(command) = line.strip_prefix('/') {
            let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
            match name {
                "quit" | "exit" => break,
                "help" => println!("{}", HELP),
                "clear" => {
                    session.clear();
                    pending.clear();
                    println!("{}", "Conversation cleared.".dimmed());
                },
                "key" => {
                    let key = rest.trim();
                    session.set_credential((!key.is_empty()).then(|| key.to_string()));
                    println!("{}", "API key updated.".dimmed());
                },
                "attach" => match queue_attachment(args.image, Path::new(rest.trim())).await {
                    Ok(inline) => {
                        println!("{} {} ({})", "attached".dimmed(), rest.trim(), inline.mime_type);
                        pending.push(inline);
                    },
                    Err(e) => println!("{} {:#}", "error:".red().bold(), e),
                },
                other => println!("{} unknown command /{}", "error:".red().bold(), other),
            }
            continue;
        }

        if line.is_empty() && pending.is_empty() {
            continue;
        }

        if args.image {
            let submission = ImageSubmission {
                prompt: line.to_string(),
                modifiers: modifiers.clone(),
                attachments: std::mem::take(&mut pending),
                mode,
            };
            match session.submit_image(&client, submission, print_progress).await {
                Ok(results) => {
                    for result in &results {
                        saved = print_result(result, &args.out_dir, saved).await?;
                    }
                },
                Err(e) => println!("{} {}", "error:".red().bold(), e),
            }
        } else {
            match session.submit_chat(&client, line, Some(model)).await {
                Ok(parts) => print_parts(&parts),
                Err(e) => println!("{} {}", "error:".red().bold(), e),
            }
        }
    }

    Ok(())
}

fn print_progress(progress: BatchProgress) {
    match progress.label {
        Some(label) => eprintln!("{}", format!("[{}/{}] {}", progress.current, progress.total, label).dimmed()),
        None => eprintln!("{}", format!("[{}/{}]", progress.current, progress.total).dimmed()),
    }
}

fn print_parts(parts: &[Part]) {
    for text in parts.iter().filter_map(Part::as_text).filter(|t| !t.is_empty()) {
        println!("{} {}", "gemini>".blue().bold(), text);
    }
}

/// Print the text parts and save the images. Returns the running image count.
async fn print_result(result: &GenerationResult, out_dir: &Path, mut saved: usize) -> Result<usize> {
    if let Some(label) = &result.label {
        println!("{}", label.yellow().bold());
    }
    print_parts(&result.parts);

    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
    for inline in result.parts.iter().filter_map(Part::as_inline_data) {
        saved += 1;
        let path = out_dir.join(image_file_name(&stamp, saved, &inline.mime_type));
        let bytes = STANDARD.decode(&inline.data).context("upstream image is not valid base64")?;
        tokio::fs::write(&path, bytes).await.with_context(|| format!("cannot write {}", path.display()))?;
        println!("{} {}", "saved".green(), path.display());
    }
    Ok(saved)
}

/// Chat mode has no attachment channel, so `/attach` is refused there.
async fn queue_attachment(image_mode: bool, path: &Path) -> Result<InlineData> {
    if !image_mode {
        bail!("attachments are only sent in --image mode");
    }
    read_attachment(path).await
}

async fn read_attachment(path: &Path) -> Result<InlineData> {
    let Some(mime_type) = mime_for_path(path) else {
        bail!("unsupported image type: {}", path.display());
    };
    let bytes = tokio::fs::read(path).await.with_context(|| format!("cannot read {}", path.display()))?;
    Ok(InlineData { mime_type: mime_type.to_string(), data: STANDARD.encode(bytes) })
}

fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "bin",
    }
}

fn image_file_name(stamp: &str, index: usize, mime: &str) -> PathBuf {
    PathBuf::from(format!("gemgate-{}-{}.{}", stamp, index, extension_for_mime(mime)))
}
