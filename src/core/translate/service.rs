//! Boundary to the external text-generation service.
//!
//! The core never talks to a network API itself. A run is handed a
//! [`ServiceBackend`]:
//!
//! - [`CommandService`]: spawns the configured program once per batch, writes
//!   `{"system": ..., "user": ...}` to its stdin and reads the reply from
//!   stdout.
//! - [`ReplayService`]: serves recorded replies `batch_<n>.json` or
//!   `batch_<n>.txt` from a directory.
//!
//! A reply is either the raw model text, or an envelope object
//! `{"content": "...", "usage": {...}}` carrying token usage.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use anyhow::{Context, Result, bail};
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

/// One batch's request.
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    /// 1-based batch index.
    pub batch: usize,
    pub system: String,
    pub user: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceReply {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct ReplyEnvelope {
    content: String,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

impl ServiceReply {
    /// Interpret collaborator output, unwrapping an envelope if present.
    pub fn from_output(output: String) -> Self {
        match serde_json::from_str::<ReplyEnvelope>(output.trim()) {
            Ok(envelope) => Self {
                text: envelope.content,
                usage: envelope.usage,
            },
            Err(_) => Self {
                text: output,
                usage: None,
            },
        }
    }
}

#[enum_dispatch]
pub trait TranslationService {
    fn translate(&self, request: &TranslationRequest) -> Result<ServiceReply>;
}

#[enum_dispatch(TranslationService)]
#[derive(Debug, Clone)]
pub enum ServiceBackend {
    Command(CommandService),
    Replay(ReplayService),
}

#[derive(Debug, Clone)]
pub struct CommandService {
    program: String,
    args: Vec<String>,
}

impl CommandService {
    pub fn new(command: &[String]) -> Result<Self> {
        let Some((program, args)) = command.split_first() else {
            bail!("No translator configured: set 'translator.command' in the config file");
        };
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl TranslationService for CommandService {
    fn translate(&self, request: &TranslationRequest) -> Result<ServiceReply> {
        let payload = json!({
            "system": request.system,
            "user": request.user,
        })
        .to_string();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env("NODELINGO_BATCH", request.batch.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start translator: {}", self.program))?;

        // Feed stdin from its own thread so a large request cannot block on a
        // full stdout pipe.
        let writer = child.stdin.take().map(|mut stdin| {
            thread::spawn(move || stdin.write_all(payload.as_bytes()))
        });

        let output = child
            .wait_with_output()
            .context("Failed to read translator output")?;
        let written = writer.map(|handle| handle.join());

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            );
        }

        match written {
            None | Some(Ok(Ok(()))) => {}
            // The program may answer without reading the whole request.
            Some(Ok(Err(e))) if e.kind() == ErrorKind::BrokenPipe => {
                debug!("{} closed its input early", self.program);
            }
            Some(Ok(Err(e))) => {
                return Err(e).context("Failed to send request to translator");
            }
            Some(Err(_)) => bail!("Failed to send request to translator"),
        }

        let stdout =
            String::from_utf8(output.stdout).context("Translator output is not valid UTF-8")?;
        Ok(ServiceReply::from_output(stdout))
    }
}

#[derive(Debug, Clone)]
pub struct ReplayService {
    dir: PathBuf,
}

impl ReplayService {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl TranslationService for ReplayService {
    fn translate(&self, request: &TranslationRequest) -> Result<ServiceReply> {
        for extension in ["json", "txt"] {
            let path = self
                .dir
                .join(format!("batch_{}.{}", request.batch, extension));
            if path.is_file() {
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read file: {}", path.display()))?;
                return Ok(ServiceReply::from_output(content));
            }
        }
        bail!(
            "No recorded reply for batch {} in {}",
            request.batch,
            self.dir.display()
        )
    }
}
