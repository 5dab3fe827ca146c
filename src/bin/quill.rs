use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use quill::api::ApiClient;
use quill::app::printer::run_generate;
use quill::app::{build_runtime, TuiMode};
use quill::config::Config;
use quill::runtime::frontend::{FrontendAdapter, ScrollAction, UserInputEvent};
use quill::runtime::mode::RuntimeMode;
use quill::state::Route;
use quill::terminal;
use quill::types::DownloadKind;
use quill::ui::format::format_date;
use quill::ui::home::render_past_blogs;
use quill::ui::layout::{split_home_body, split_screen, split_tabs};
use quill::ui::progress::render_progress;
use quill::ui::render::{
    input_visual_rows, render_input, render_lines, render_status_line, render_tabs, render_toasts,
};
use quill::util::today_as_of;
use quill::{logging, proxy};
use ratatui::layout::Rect;
use ratatui::widgets::Clear;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const MAX_INPUT_ROWS: u16 = 6;

#[derive(Parser)]
#[command(name = "quill")]
#[command(version, about = "Terminal client for the blog generation pipeline")]
struct Cli {
    /// Base URL of the backend API (overrides QUILL_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive terminal UI (default)
    Tui,
    /// Generate a blog and stream progress to stdout
    Generate {
        topic: String,
        /// Reference date for research, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        as_of: Option<String>,
        /// Print the finished blog as JSON instead of progress lines
        #[arg(long)]
        json: bool,
    },
    /// List past blogs
    Blogs,
    /// Show one blog
    Show {
        id: String,
        /// Print the raw markdown body
        #[arg(long)]
        markdown: bool,
    },
    /// Download a blog artifact
    Download {
        id: String,
        #[arg(long, value_enum)]
        kind: KindArg,
        /// Directory to write into (defaults to the current directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run the edge proxy that forwards /api/* to the backend
    Proxy {
        /// Listen address (overrides QUILL_PROXY_ADDR)
        #[arg(long)]
        listen: Option<String>,
        /// Backend origin (overrides BACKEND_ORIGIN)
        #[arg(long)]
        backend: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Markdown,
    Images,
    Bundle,
}

impl From<KindArg> for DownloadKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Markdown => DownloadKind::Markdown,
            KindArg::Images => DownloadKind::Images,
            KindArg::Bundle => DownloadKind::Bundle,
        }
    }
}

struct ManagedTuiFrontend {
    terminal: terminal::TerminalType,
    quit: bool,
}

impl ManagedTuiFrontend {
    fn new() -> Result<Self> {
        let terminal = terminal::setup()?;
        Self::drain_startup_events();
        Ok(Self {
            terminal,
            quit: false,
        })
    }

    fn drain_startup_events() {
        for _ in 0..1024 {
            match event::poll(Duration::from_millis(0)) {
                Ok(true) => {
                    if event::read().is_err() {
                        break;
                    }
                }
                Ok(false) | Err(_) => break,
            }
        }
    }

    fn map_key(&mut self, key: KeyEvent, mode: &TuiMode) -> Option<UserInputEvent> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => Some(UserInputEvent::Interrupt),
            KeyCode::Char('r') if ctrl => Some(UserInputEvent::Refresh),
            KeyCode::Char('j') if ctrl => Some(UserInputEvent::Newline),
            KeyCode::Char('d') if ctrl => {
                if mode.input().0.is_empty() && !mode.is_generating() {
                    self.quit = true;
                }
                None
            }
            KeyCode::Enter
                if key.modifiers.contains(KeyModifiers::SHIFT)
                    || key.modifiers.contains(KeyModifiers::ALT) =>
            {
                Some(UserInputEvent::Newline)
            }
            KeyCode::Enter => Some(UserInputEvent::Submit),
            KeyCode::Tab => Some(UserInputEvent::NextTab),
            KeyCode::BackTab => Some(UserInputEvent::PrevTab),
            KeyCode::Esc => Some(UserInputEvent::Escape),
            KeyCode::Up => Some(UserInputEvent::Scroll(ScrollAction::LineUp)),
            KeyCode::Down => Some(UserInputEvent::Scroll(ScrollAction::LineDown)),
            KeyCode::PageUp => Some(UserInputEvent::Scroll(ScrollAction::PageUp(10))),
            KeyCode::PageDown => Some(UserInputEvent::Scroll(ScrollAction::PageDown(10))),
            KeyCode::Home => Some(UserInputEvent::Scroll(ScrollAction::Home)),
            KeyCode::End => Some(UserInputEvent::Scroll(ScrollAction::End)),
            KeyCode::Left => Some(UserInputEvent::CursorLeft),
            KeyCode::Right => Some(UserInputEvent::CursorRight),
            KeyCode::Backspace => Some(UserInputEvent::Backspace),
            KeyCode::Delete => Some(UserInputEvent::Delete),
            KeyCode::Char(ch) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                Some(UserInputEvent::Char(ch))
            }
            _ => None,
        }
    }
}

impl Drop for ManagedTuiFrontend {
    fn drop(&mut self) {
        let _ = terminal::restore();
    }
}

fn footer_split(footer: Rect, input_rows: u16) -> (Rect, Rect) {
    let input_rows = input_rows.min(footer.height.saturating_sub(1));
    let input = Rect {
        height: input_rows,
        ..footer
    };
    let hints = Rect {
        y: footer.y + input_rows,
        height: footer.height - input_rows,
        ..footer
    };
    (input, hints)
}

impl FrontendAdapter<TuiMode> for ManagedTuiFrontend {
    fn poll_user_input(&mut self, mode: &TuiMode) -> Option<UserInputEvent> {
        if mode.quit_requested() {
            self.quit = true;
            return None;
        }

        let Ok(has_event) = event::poll(Duration::from_millis(16)) else {
            self.quit = true;
            return None;
        };
        if !has_event {
            return None;
        }

        let Ok(ev) = event::read() else {
            self.quit = true;
            return None;
        };

        match ev {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.map_key(key, mode),
            Event::Paste(text) if !text.contains('\u{1b}') => Some(UserInputEvent::Paste(text)),
            _ => None,
        }
    }

    fn render(&mut self, mode: &TuiMode) {
        let status = mode.status_line();
        let hints = mode.key_hints();

        let _ = self.terminal.draw(|frame| {
            let area = frame.area();
            frame.render_widget(Clear, area);

            match mode.route() {
                Route::Home => {
                    let (input, cursor) = mode.input();
                    let input_width = area.width.saturating_sub(2).max(1) as usize;
                    let input_rows =
                        (input_visual_rows(input, input_width) as u16).clamp(1, MAX_INPUT_ROWS);
                    let panes = split_screen(area, input_rows + 1);
                    render_status_line(frame, panes.header, &status);

                    let (progress, list) = split_home_body(panes.body, mode.is_generating());
                    if let Some(progress) = progress {
                        render_progress(frame, progress, mode.generation());
                    }
                    render_past_blogs(
                        frame,
                        list,
                        mode.past_blogs(),
                        mode.selected_blog(),
                        mode.loading_past_blogs(),
                    );

                    let (input_area, hint_area) = footer_split(panes.footer, input_rows);
                    render_input(frame, input_area, input, cursor, mode.input_enabled());
                    render_status_line(frame, hint_area, hints);
                }
                Route::Blog(_) => {
                    let panes = split_screen(area, 1);
                    render_status_line(frame, panes.header, &status);
                    let (tabs, content) = split_tabs(panes.body);
                    render_tabs(frame, tabs, mode.active_tab());
                    render_lines(frame, content, mode.tab_lines(), mode.blog_scroll());
                    render_status_line(frame, panes.footer, hints);
                }
            }

            render_toasts(frame, mode.toasts().iter());
        });
    }

    fn should_quit(&self) -> bool {
        self.quit
    }
}

async fn run_tui(config: Config) -> Result<()> {
    let (mut runtime, mut ctx) = build_runtime(config)?;
    let mut frontend = ManagedTuiFrontend::new()?;
    runtime.run(&mut frontend, &mut ctx).await;
    Ok(())
}

async fn list_blogs(client: &ApiClient) -> Result<()> {
    let blogs = client.fetch_blogs().await.context("Failed to load past blogs.")?;
    if blogs.is_empty() {
        println!("No blogs yet.");
        return Ok(());
    }
    for blog in blogs {
        println!(
            "{}  {:<14} {:>6} W  {:<12}  {}",
            blog.id,
            blog.blog_kind.label(),
            blog.word_count,
            format_date(Some(&blog.created_at)),
            blog.title
        );
    }
    Ok(())
}

async fn show_blog(client: &ApiClient, id: &str, markdown: bool) -> Result<()> {
    let blog = client
        .fetch_blog(id)
        .await
        .context("Failed to load blog details.")?;
    if markdown {
        println!("{}", blog.final_markdown);
        return Ok(());
    }

    println!("{}", blog.plan.blog_title);
    println!(
        "{} · {} · {} words",
        blog.plan.blog_kind,
        format_date(Some(&blog.created_at)),
        blog.word_count()
    );
    println!("audience: {}  tone: {}", blog.plan.audience, blog.plan.tone);
    println!();
    for (i, task) in blog.plan.tasks.iter().enumerate() {
        println!("{:02} {} ({} words)", i + 1, task.title, task.target_words);
    }
    println!();
    println!("{} sources, {} images", blog.evidence.len(), blog.image_specs.len());
    for spec in &blog.image_specs {
        println!("  {}", client.image_url(&blog.id, &spec.filename));
    }
    Ok(())
}

async fn download(client: &ApiClient, id: &str, kind: DownloadKind, out: Option<PathBuf>) -> Result<()> {
    let dir = match out {
        Some(dir) => dir,
        None => std::env::current_dir().context("cannot resolve current directory")?,
    };
    let artifact = client
        .download(id, kind)
        .await
        .with_context(|| format!("Failed to download {}", kind.label()))?;
    let path = dir.join(&artifact.filename);
    tokio::fs::write(&path, &artifact.bytes)
        .await
        .with_context(|| format!("cannot write {}", path.display()))?;
    println!("{} downloaded successfully! {}", kind.label(), path.display());
    Ok(())
}

fn validate_as_of(raw: &str) -> Result<String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("--as-of must be YYYY-MM-DD, got '{raw}'"))?;
    Ok(raw.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Tui);

    let mut config = Config::load()?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if let Command::Proxy { listen, backend } = &command {
        if let Some(listen) = listen {
            config.proxy_addr = listen.clone();
        }
        if let Some(backend) = backend {
            config.backend_origin = Some(backend.clone());
        }
    }
    config.validate()?;

    logging::init(matches!(command, Command::Tui))?;
    tracing::debug!(api_url = %config.api_url, "configuration loaded");

    match command {
        Command::Tui => run_tui(config).await,
        Command::Generate { topic, as_of, json } => {
            let as_of = match as_of {
                Some(raw) => validate_as_of(&raw)?,
                None => today_as_of(),
            };
            run_generate(ApiClient::new(&config), topic, as_of, json).await
        }
        Command::Blogs => list_blogs(&ApiClient::new(&config)).await,
        Command::Show { id, markdown } => show_blog(&ApiClient::new(&config), &id, markdown).await,
        Command::Download { id, kind, out } => {
            download(&ApiClient::new(&config), &id, kind.into(), out).await
        }
        Command::Proxy { .. } => {
            let addr: SocketAddr = config.proxy_socket_addr()?;
            proxy::serve(addr, config.backend_origin.as_deref()).await
        }
    }
}
