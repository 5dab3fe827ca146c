use crate::api::{start_generation, ApiClient, GenerationUpdate};
use crate::state::{GenerationEffect, GenerationState, ToastLevel, STATUS_COMPLETE};
use crate::types::BlogResult;
use crate::util::parse_bool_flag;
use anyhow::{bail, Result};
use std::io::{self, IsTerminal, Write};
use tokio::sync::mpsc;

const RESET: &str = "\x1b[0m";

/// Line-oriented progress for `quill generate` when no TUI is wanted.
///
/// In JSON mode progress is kept quiet and only the finished blog is written.
pub struct ProgressPrinter<W: Write> {
    out: W,
    state: GenerationState,
    colors_enabled: bool,
    json: bool,
    result: Option<Box<BlogResult>>,
    failure: Option<String>,
}

impl<W: Write> ProgressPrinter<W> {
    pub fn new(out: W, colors_enabled: bool, json: bool) -> Self {
        Self {
            out,
            state: GenerationState::new(),
            colors_enabled,
            json,
            result: None,
            failure: None,
        }
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn begin(&mut self, topic: &str) -> io::Result<()> {
        self.state.begin();
        if !self.json {
            let line = format!("* Generating: {topic}");
            self.print_styled("\x1b[1m", &line)?;
        }
        Ok(())
    }

    pub fn handle(&mut self, update: GenerationUpdate) -> io::Result<()> {
        let before = self.state.logs.len();
        let effects = self.state.apply(update);

        if !self.json {
            let fresh: Vec<(&'static str, String)> = self.state.logs[before..]
                .iter()
                .map(|entry| {
                    let style = if entry.is_error() {
                        "\x1b[31m"
                    } else if entry.is_completion() {
                        "\x1b[32m"
                    } else {
                        "\x1b[2m"
                    };
                    (style, format!("  [{}] {}", entry.node, entry.message))
                })
                .collect();
            for (style, line) in fresh {
                self.print_styled(style, &line)?;
            }
            if let Some((done, total, _)) = self.state.section_progress() {
                if self.state.current_node == "worker" {
                    self.print_styled("\x1b[36m", &format!("  sections {done}/{total}"))?;
                }
            }
        }

        for effect in effects {
            match effect {
                GenerationEffect::OpenBlog(blog) => self.result = Some(blog),
                GenerationEffect::Notify {
                    level: ToastLevel::Error,
                    message,
                } => self.failure = Some(message),
                GenerationEffect::Notify { .. } => {}
            }
        }
        Ok(())
    }

    pub fn cancelled(&mut self) -> io::Result<()> {
        self.state.is_generating = false;
        self.failure = Some("Generation cancelled.".to_string());
        if !self.json {
            self.print_styled("\x1b[33m", "* Generation cancelled.")?;
        }
        Ok(())
    }

    /// Print the outcome and hand back the blog when one was produced.
    pub fn finish(mut self) -> Result<Option<Box<BlogResult>>> {
        if let Some(message) = self.failure.take() {
            bail!(message);
        }

        let Some(blog) = self.result.take() else {
            if self.state.status_text != STATUS_COMPLETE {
                bail!("stream ended without a finished blog ({})", self.state.status_text);
            }
            return Ok(None);
        };

        if self.json {
            serde_json::to_writer_pretty(&mut self.out, &blog)?;
            writeln!(self.out)?;
        } else {
            let headline = format!("* {}", blog.plan.blog_title);
            self.print_styled("\x1b[1;32m", &headline)?;
            writeln!(
                self.out,
                "  id {}  ·  {}  ·  {} words  ·  {} sources  ·  {} images",
                blog.id,
                blog.plan.blog_kind,
                blog.word_count(),
                blog.evidence.len(),
                blog.image_specs.len()
            )?;
            writeln!(self.out, "  read it with: quill show {} --markdown", blog.id)?;
        }
        self.out.flush()?;
        Ok(Some(blog))
    }

    fn print_styled(&mut self, style: &str, line: &str) -> io::Result<()> {
        if self.colors_enabled {
            writeln!(self.out, "{style}{line}{RESET}")
        } else {
            writeln!(self.out, "{line}")
        }
    }
}

pub fn detect_color_support() -> bool {
    if std::env::var("QUILL_FORCE_COLOR")
        .ok()
        .and_then(parse_bool_flag)
        .unwrap_or(false)
    {
        return true;
    }

    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    io::stdout().is_terminal()
}

/// Stream one generation to stdout. Ctrl+C cancels it.
pub async fn run_generate(client: ApiClient, topic: String, as_of: String, json: bool) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut printer = ProgressPrinter::new(io::stdout(), !json && detect_color_support(), json);
    printer.begin(&topic)?;

    let handle = start_generation(client, topic, as_of, move |update| {
        let _ = tx.send(update);
    });

    loop {
        tokio::select! {
            update = rx.recv() => match update {
                Some(update) => printer.handle(update)?,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                handle.cancel();
                printer.cancelled()?;
                break;
            }
        }
    }
    handle.join().await;

    printer.finish().map(|_| ())
}
