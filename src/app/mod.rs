pub mod printer;

use crate::api::ApiClient;
use crate::config::Config;
use crate::runtime::context::RuntimeContext;
use crate::runtime::frontend::{ScrollAction, UserInputEvent};
use crate::runtime::mode::RuntimeMode;
use crate::runtime::r#loop::Runtime;
use crate::runtime::UiUpdate;
use crate::state::{
    AppAction, AppState, GenerationEffect, GenerationState, Route, Toast, ToastLevel,
    ToastQueue,
};
use crate::types::{BlogResult, DownloadKind, PastBlog};
use crate::ui::blog::{evidence_lines, image_lines, log_lines, plan_lines, preview_lines, BlogTab};
use crate::util::today_as_of;
use anyhow::{Context, Result};
use ratatui::text::Line;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

const DOUBLE_INTERRUPT_EXIT_WINDOW: Duration = Duration::from_millis(900);
const STATUS_CANCELLED: &str = "Generation cancelled.";

struct InputState {
    buffer: String,
    cursor_byte: usize,
}

impl InputState {
    fn clamp_left(&self, idx: usize) -> usize {
        crate::ui::text::floor_char_boundary(&self.buffer, idx)
    }

    fn prev_boundary(&self, idx: usize) -> usize {
        let i = self.clamp_left(idx);
        self.buffer[..i]
            .chars()
            .next_back()
            .map(|ch| i - ch.len_utf8())
            .unwrap_or(0)
    }

    fn next_boundary(&self, idx: usize) -> usize {
        let i = self.clamp_left(idx);
        self.buffer[i..]
            .chars()
            .next()
            .map(|ch| i + ch.len_utf8())
            .unwrap_or(self.buffer.len())
    }

    fn insert_str(&mut self, value: &str) {
        let cursor = self.clamp_left(self.cursor_byte);
        self.buffer.insert_str(cursor, value);
        self.cursor_byte = cursor + value.len();
    }

    fn backspace(&mut self) {
        let end = self.clamp_left(self.cursor_byte);
        let start = self.prev_boundary(end);
        self.buffer.replace_range(start..end, "");
        self.cursor_byte = start;
    }

    fn delete(&mut self) {
        let start = self.clamp_left(self.cursor_byte);
        let end = self.next_boundary(start);
        self.buffer.replace_range(start..end, "");
        self.cursor_byte = start;
    }

    fn take(&mut self) -> String {
        self.cursor_byte = 0;
        std::mem::take(&mut self.buffer)
    }
}

/// Interactive client: topic prompt and history on the home screen, live
/// pipeline progress while generating, and the tabbed article view.
pub struct TuiMode {
    client: ApiClient,
    generation: GenerationState,
    app: AppState,
    toasts: ToastQueue,
    input: InputState,
    generation_id: Option<u64>,
    selected_blog: usize,
    tab: BlogTab,
    blog_scroll: usize,
    loading_past_blogs: bool,
    loading_blog: Option<String>,
    last_download: Option<PathBuf>,
    last_interrupt_at: Option<Instant>,
    quit: bool,
}

impl TuiMode {
    pub fn new(client: ApiClient, toast_lifetime: Duration) -> Self {
        Self {
            client,
            generation: GenerationState::new(),
            app: AppState::default(),
            toasts: ToastQueue::new(toast_lifetime),
            input: InputState {
                buffer: String::new(),
                cursor_byte: 0,
            },
            generation_id: None,
            selected_blog: 0,
            tab: BlogTab::Preview,
            blog_scroll: 0,
            loading_past_blogs: false,
            loading_blog: None,
            last_download: None,
            last_interrupt_at: None,
            quit: false,
        }
    }

    /// Kick off the initial history fetch.
    pub fn start(&mut self, ctx: &mut RuntimeContext) {
        self.loading_past_blogs = true;
        ctx.load_past_blogs();
    }

    pub fn route(&self) -> &Route {
        &self.app.route
    }

    pub fn generation(&self) -> &GenerationState {
        &self.generation
    }

    pub fn current_blog(&self) -> Option<&BlogResult> {
        self.app.current_blog.as_deref()
    }

    pub fn past_blogs(&self) -> &[PastBlog] {
        &self.app.past_blogs
    }

    pub fn selected_blog(&self) -> usize {
        self.selected_blog
    }

    pub fn loading_past_blogs(&self) -> bool {
        self.loading_past_blogs
    }

    pub fn input(&self) -> (&str, usize) {
        (&self.input.buffer, self.input.cursor_byte)
    }

    pub fn input_enabled(&self) -> bool {
        !self.generation.is_generating
    }

    pub fn active_tab(&self) -> BlogTab {
        self.tab
    }

    pub fn blog_scroll(&self) -> usize {
        self.blog_scroll
    }

    pub fn toasts(&self) -> &[Toast] {
        self.toasts.visible()
    }

    pub fn status_line(&self) -> String {
        let mut parts = vec![format!("quill · {}", self.client.api_base())];
        if self.generation.is_generating {
            parts.push(format!("{:.0}%", self.generation.progress));
        }
        parts.push(self.generation.status_text.clone());
        if let Some(id) = &self.loading_blog {
            parts.push(format!("opening {id}..."));
        }
        if let Some(path) = &self.last_download {
            parts.push(format!("saved {}", path.display()));
        }
        parts.join("  │  ")
    }

    pub fn key_hints(&self) -> &'static str {
        match self.app.route {
            Route::Home if self.generation.is_generating => {
                "Ctrl+C cancel  ↑↓ select  Ctrl+R refresh"
            }
            Route::Home => {
                "Enter generate (empty: open selected)  Shift+Enter newline  ↑↓ select  Ctrl+R refresh  Ctrl+C×2 quit"
            }
            Route::Blog(_) => {
                "Tab/Shift+Tab switch  ↑↓ PgUp PgDn scroll  m markdown  i images  z bundle  Esc home"
            }
        }
    }

    /// Content of the active tab for the current blog.
    pub fn tab_lines(&self) -> Vec<Line<'static>> {
        let Some(blog) = self.app.current_blog.as_deref() else {
            return vec![Line::from("Waiting for the blog to finish generating...")];
        };
        match self.tab {
            BlogTab::Plan => plan_lines(&blog.plan),
            BlogTab::Evidence => evidence_lines(&blog.evidence, self.evidence_mode()),
            BlogTab::Preview => preview_lines(blog),
            BlogTab::Images => image_lines(blog, |filename| self.client.image_url(&blog.id, filename)),
            BlogTab::Logs => log_lines(&self.generation.logs, self.app.current_blog_from_history),
        }
    }

    /// Research mode is only known for a blog produced in this session.
    fn evidence_mode(&self) -> Option<&str> {
        if self.app.current_blog_from_history {
            None
        } else {
            self.generation.data.mode.as_deref()
        }
    }

    fn notify(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toasts.notify(level, message);
    }

    fn submit(&mut self, ctx: &mut RuntimeContext) {
        if self.generation.is_generating {
            return;
        }
        let topic = self.input.buffer.trim().to_string();
        if topic.is_empty() {
            self.open_selected(ctx);
            return;
        }

        self.input.take();
        self.last_interrupt_at = None;
        self.generation.begin();
        let id = ctx.start_generation(topic, today_as_of());
        self.generation_id = Some(id);
    }

    fn open_selected(&mut self, ctx: &mut RuntimeContext) {
        let Some(blog) = self.app.past_blogs.get(self.selected_blog) else {
            return;
        };
        let id = blog.id.clone();
        self.app.dispatch(AppAction::SetCurrentBlogId(Some(id.clone())));
        self.loading_blog = Some(id.clone());
        ctx.load_blog(id);
    }

    fn refresh_past_blogs(&mut self, ctx: &mut RuntimeContext) {
        self.loading_past_blogs = true;
        ctx.load_past_blogs();
    }

    fn start_download(&mut self, kind: DownloadKind, ctx: &mut RuntimeContext) {
        let Some(blog) = self.app.current_blog.as_deref() else {
            return;
        };
        if kind == DownloadKind::Images && blog.image_specs.is_empty() {
            self.notify(ToastLevel::Info, "This blog has no images to download.");
            return;
        }
        self.toasts.push(
            Toast::new(
                ToastLevel::Info,
                format!("Starting download for {}...", kind.label()),
            )
            .with_id(download_toast_id(kind)),
        );
        ctx.download(blog.id.clone(), kind);
    }

    fn go_home(&mut self) {
        self.app.dispatch(AppAction::Navigate(Route::Home));
        self.blog_scroll = 0;
    }

    fn handle_interrupt(&mut self, ctx: &mut RuntimeContext) {
        if self.generation.is_generating {
            ctx.cancel_generation();
            self.generation_id = None;
            self.generation.is_generating = false;
            self.generation.status_text = STATUS_CANCELLED.to_string();
            self.last_interrupt_at = Some(Instant::now());
            self.notify(ToastLevel::Info, STATUS_CANCELLED);
            return;
        }

        if !self.input.buffer.is_empty() {
            self.input.take();
            self.last_interrupt_at = Some(Instant::now());
            return;
        }

        if self.should_exit_on_interrupt() {
            self.quit = true;
            return;
        }
        self.notify(ToastLevel::Info, "Press Ctrl+C again to quit");
    }

    fn should_exit_on_interrupt(&mut self) -> bool {
        let now = Instant::now();
        let should_exit = self
            .last_interrupt_at
            .is_some_and(|last| now.duration_since(last) <= DOUBLE_INTERRUPT_EXIT_WINDOW);
        self.last_interrupt_at = Some(now);
        should_exit
    }

    fn move_selection(&mut self, action: ScrollAction) {
        let len = self.app.past_blogs.len();
        if len == 0 {
            return;
        }
        let last = len - 1;
        self.selected_blog = match action {
            ScrollAction::LineUp => self.selected_blog.saturating_sub(1),
            ScrollAction::LineDown => (self.selected_blog + 1).min(last),
            ScrollAction::PageUp(n) => self.selected_blog.saturating_sub(n),
            ScrollAction::PageDown(n) => (self.selected_blog + n).min(last),
            ScrollAction::Home => 0,
            ScrollAction::End => last,
        };
    }

    fn scroll_blog(&mut self, action: ScrollAction) {
        let max = self.tab_lines().len().saturating_sub(1);
        self.blog_scroll = match action {
            ScrollAction::LineUp => self.blog_scroll.saturating_sub(1),
            ScrollAction::LineDown => self.blog_scroll + 1,
            ScrollAction::PageUp(n) => self.blog_scroll.saturating_sub(n),
            ScrollAction::PageDown(n) => self.blog_scroll + n,
            ScrollAction::Home => 0,
            ScrollAction::End => max,
        }
        .min(max);
    }

    fn switch_tab(&mut self, tab: BlogTab) {
        self.tab = tab;
        self.blog_scroll = 0;
    }

    fn on_home_input(&mut self, input: UserInputEvent, ctx: &mut RuntimeContext) {
        let editable = self.input_enabled();
        match input {
            UserInputEvent::Char(ch) if editable => self.input.insert_str(ch.encode_utf8(&mut [0; 4])),
            UserInputEvent::Paste(text) if editable => self.input.insert_str(&text),
            UserInputEvent::Newline if editable => self.input.insert_str("\n"),
            UserInputEvent::Backspace if editable => self.input.backspace(),
            UserInputEvent::Delete if editable => self.input.delete(),
            UserInputEvent::CursorLeft => {
                self.input.cursor_byte = self.input.prev_boundary(self.input.cursor_byte)
            }
            UserInputEvent::CursorRight => {
                self.input.cursor_byte = self.input.next_boundary(self.input.cursor_byte)
            }
            UserInputEvent::Submit => self.submit(ctx),
            UserInputEvent::Scroll(action) => self.move_selection(action),
            UserInputEvent::Refresh => self.refresh_past_blogs(ctx),
            UserInputEvent::NextTab | UserInputEvent::PrevTab => {
                if let Some(id) = self.app.current_blog.as_ref().map(|blog| blog.id.clone()) {
                    self.app.dispatch(AppAction::Navigate(Route::Blog(id)));
                }
            }
            UserInputEvent::Escape => {
                self.input.take();
            }
            _ => {}
        }
    }

    fn on_blog_input(&mut self, input: UserInputEvent, ctx: &mut RuntimeContext) {
        match input {
            UserInputEvent::NextTab => self.switch_tab(self.tab.next()),
            UserInputEvent::PrevTab => self.switch_tab(self.tab.prev()),
            UserInputEvent::Scroll(action) => self.scroll_blog(action),
            UserInputEvent::Char('m') => self.start_download(DownloadKind::Markdown, ctx),
            UserInputEvent::Char('i') => self.start_download(DownloadKind::Images, ctx),
            UserInputEvent::Char('z') => self.start_download(DownloadKind::Bundle, ctx),
            UserInputEvent::Char(ch @ '1'..='5') => {
                let index = ch as usize - '1' as usize;
                self.switch_tab(BlogTab::ALL[index]);
            }
            UserInputEvent::Escape | UserInputEvent::Char('q') => self.go_home(),
            UserInputEvent::Refresh => self.refresh_past_blogs(ctx),
            _ => {}
        }
    }

    fn apply_effects(&mut self, effects: Vec<GenerationEffect>, ctx: &mut RuntimeContext) {
        for effect in effects {
            match effect {
                GenerationEffect::OpenBlog(blog) => {
                    self.generation_id = None;
                    self.app.open_generated(blog);
                    self.switch_tab(BlogTab::Preview);
                    self.refresh_past_blogs(ctx);
                }
                GenerationEffect::Notify { level, message } => self.notify(level, message),
            }
        }
    }
}

fn download_toast_id(kind: DownloadKind) -> String {
    format!("download-{}", kind.path_segment())
}

impl RuntimeMode for TuiMode {
    fn on_user_input(&mut self, input: UserInputEvent, ctx: &mut RuntimeContext) {
        if input == UserInputEvent::Interrupt {
            self.handle_interrupt(ctx);
            return;
        }
        self.last_interrupt_at = None;

        match self.app.route {
            Route::Home => self.on_home_input(input, ctx),
            Route::Blog(_) => self.on_blog_input(input, ctx),
        }
    }

    fn on_update(&mut self, update: UiUpdate, ctx: &mut RuntimeContext) {
        match update {
            UiUpdate::Generation { id, update } => {
                if self.generation_id != Some(id) {
                    tracing::debug!(generation = id, "dropping update from a replaced generation");
                    return;
                }
                let effects = self.generation.apply(update);
                if !self.generation.is_generating {
                    self.generation_id = None;
                }
                self.apply_effects(effects, ctx);
            }
            UiUpdate::PastBlogsLoaded(result) => {
                self.loading_past_blogs = false;
                match result {
                    Ok(blogs) => {
                        self.selected_blog = self.selected_blog.min(blogs.len().saturating_sub(1));
                        self.app.dispatch(AppAction::SetPastBlogs(blogs));
                    }
                    Err(_) => self.notify(ToastLevel::Error, "Failed to load past blogs."),
                }
            }
            UiUpdate::BlogLoaded(result) => {
                self.loading_blog = None;
                match result {
                    Ok(blog) => {
                        self.app.open_from_history(blog);
                        self.switch_tab(BlogTab::Preview);
                    }
                    Err(_) => self.notify(ToastLevel::Error, "Failed to load blog details."),
                }
            }
            UiUpdate::DownloadFinished { kind, result } => {
                let toast = match result {
                    Ok(path) => {
                        self.last_download = Some(path);
                        Toast::new(
                            ToastLevel::Success,
                            format!("{} downloaded successfully!", kind.label()),
                        )
                    }
                    Err(_) => Toast::new(
                        ToastLevel::Error,
                        format!("Failed to download {}", kind.label()),
                    ),
                };
                self.toasts.push(toast.with_id(download_toast_id(kind)));
            }
        }
    }

    fn on_tick(&mut self, now: Instant) {
        self.toasts.prune(now);
        self.app.resolve_route(self.generation.is_generating);
    }

    fn is_generating(&self) -> bool {
        self.generation.is_generating
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }
}

pub fn build_runtime(config: Config) -> Result<(Runtime<TuiMode>, RuntimeContext)> {
    let client = ApiClient::new(&config);
    let download_dir = std::env::current_dir().context("cannot resolve download directory")?;

    let (update_tx, update_rx) = mpsc::unbounded_channel::<UiUpdate>();
    let mut ctx = RuntimeContext::new(client.clone(), update_tx, download_dir);

    let mut mode = TuiMode::new(client, config.toast_lifetime());
    mode.start(&mut ctx);
    Ok((Runtime::new(mode, update_rx), ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock_client::{framed, MockApiClient};
    use crate::api::GenerationUpdate;
    use crate::state::{STATUS_COMPLETE, STATUS_ERROR, STATUS_INITIALIZING};
    use crate::types::{BlogKind, BlogPlan, SseEvent};
    use std::sync::Arc;

    fn sample_blog(id: &str) -> BlogResult {
        BlogResult {
            id: id.to_string(),
            plan: BlogPlan {
                blog_title: "Zero-copy parsing".to_string(),
                audience: "engineers".to_string(),
                tone: "direct".to_string(),
                blog_kind: BlogKind::Tutorial,
                constraints: Vec::new(),
                tasks: Vec::new(),
            },
            evidence: Vec::new(),
            image_specs: Vec::new(),
            final_markdown: "# Zero-copy parsing\n\nBorrow, don't copy.".to_string(),
            created_at: "2025-05-01T10:00:00Z".to_string(),
        }
    }

    fn past(id: &str) -> PastBlog {
        PastBlog {
            id: id.to_string(),
            title: format!("Post {id}"),
            slug: id.to_string(),
            created_at: "2025-05-01T10:00:00Z".to_string(),
            word_count: 900,
            has_images: false,
            blog_kind: BlogKind::Explainer,
        }
    }

    fn setup(responses: Vec<Vec<String>>) -> (TuiMode, RuntimeContext, mpsc::UnboundedReceiver<UiUpdate>) {
        let client = ApiClient::new_mock(Arc::new(MockApiClient::new(responses).holding_open()));
        let (tx, rx) = mpsc::unbounded_channel();
        let ctx = RuntimeContext::new(client.clone(), tx, std::env::temp_dir());
        (TuiMode::new(client, Duration::from_secs(4)), ctx, rx)
    }

    fn type_text(mode: &mut TuiMode, ctx: &mut RuntimeContext, text: &str) {
        for ch in text.chars() {
            mode.on_user_input(UserInputEvent::Char(ch), ctx);
        }
    }

    #[tokio::test]
    async fn submitting_a_topic_starts_generation() {
        let (mut mode, mut ctx, mut rx) = setup(vec![framed(&[
            r#"data: {"type":"progress","node":"router","data":{"current_step":"Routing topic"}}"#,
        ])]);

        type_text(&mut mode, &mut ctx, "rust async");
        mode.on_user_input(UserInputEvent::Submit, &mut ctx);

        assert!(mode.is_generating());
        assert!(!mode.input_enabled());
        assert_eq!(mode.input().0, "");
        assert_eq!(mode.generation().status_text, STATUS_INITIALIZING);

        let update = rx.recv().await.unwrap();
        mode.on_update(update, &mut ctx);
        assert_eq!(mode.generation().current_node, "router");
        assert_eq!(mode.generation().status_text, "Routing topic");
    }

    #[tokio::test]
    async fn typing_is_ignored_while_generating() {
        let (mut mode, mut ctx, _rx) = setup(vec![framed(&[])]);
        type_text(&mut mode, &mut ctx, "topic");
        mode.on_user_input(UserInputEvent::Submit, &mut ctx);

        type_text(&mut mode, &mut ctx, "more");
        assert_eq!(mode.input().0, "");
    }

    #[tokio::test]
    async fn complete_frame_opens_the_blog_on_preview() {
        let (mut mode, mut ctx, _rx) = setup(vec![framed(&[])]);
        type_text(&mut mode, &mut ctx, "zero copy");
        mode.on_user_input(UserInputEvent::Submit, &mut ctx);
        let id = mode.generation_id.unwrap();

        mode.on_update(
            UiUpdate::Generation {
                id,
                update: GenerationUpdate::Event(SseEvent::Complete {
                    data: Box::new(sample_blog("blog-7")),
                }),
            },
            &mut ctx,
        );

        assert!(!mode.is_generating());
        assert_eq!(mode.generation().status_text, STATUS_COMPLETE);
        assert_eq!(mode.route(), &Route::Blog("blog-7".into()));
        assert_eq!(mode.active_tab(), BlogTab::Preview);
        assert_eq!(mode.current_blog().unwrap().id, "blog-7");
        assert_eq!(mode.toasts()[0].level, ToastLevel::Success);
    }

    #[tokio::test]
    async fn error_frame_surfaces_message_and_stays_home() {
        let (mut mode, mut ctx, _rx) = setup(vec![framed(&[])]);
        type_text(&mut mode, &mut ctx, "topic");
        mode.on_user_input(UserInputEvent::Submit, &mut ctx);
        let id = mode.generation_id.unwrap();

        mode.on_update(
            UiUpdate::Generation {
                id,
                update: GenerationUpdate::Event(SseEvent::Error {
                    message: "quota exceeded".into(),
                }),
            },
            &mut ctx,
        );

        assert!(!mode.is_generating());
        assert_eq!(mode.generation().status_text, STATUS_ERROR);
        assert_eq!(mode.route(), &Route::Home);
        assert_eq!(mode.toasts()[0].message, "Generation failed: quota exceeded");
    }

    #[tokio::test]
    async fn updates_from_replaced_generations_are_dropped() {
        let (mut mode, mut ctx, _rx) = setup(vec![framed(&[])]);
        type_text(&mut mode, &mut ctx, "topic");
        mode.on_user_input(UserInputEvent::Submit, &mut ctx);
        let id = mode.generation_id.unwrap();

        mode.on_update(
            UiUpdate::Generation {
                id: id + 100,
                update: GenerationUpdate::Finished,
            },
            &mut ctx,
        );
        assert!(mode.is_generating());
    }

    #[tokio::test]
    async fn ctrl_c_cancels_then_quits_on_second_press() {
        let (mut mode, mut ctx, _rx) = setup(vec![framed(&[])]);
        type_text(&mut mode, &mut ctx, "topic");
        mode.on_user_input(UserInputEvent::Submit, &mut ctx);

        mode.on_user_input(UserInputEvent::Interrupt, &mut ctx);
        assert!(!mode.is_generating());
        assert!(!mode.quit_requested());
        assert_eq!(mode.generation().status_text, STATUS_CANCELLED);
        assert!(ctx.active_generation_id().is_none());

        mode.on_user_input(UserInputEvent::Interrupt, &mut ctx);
        assert!(mode.quit_requested());
    }

    #[tokio::test]
    async fn single_ctrl_c_when_idle_only_warns() {
        let (mut mode, mut ctx, _rx) = setup(Vec::new());
        mode.on_user_input(UserInputEvent::Interrupt, &mut ctx);
        assert!(!mode.quit_requested());

        mode.on_user_input(UserInputEvent::Char('x'), &mut ctx);
        mode.on_user_input(UserInputEvent::Backspace, &mut ctx);
        mode.on_user_input(UserInputEvent::Interrupt, &mut ctx);
        assert!(!mode.quit_requested());
    }

    #[tokio::test]
    async fn empty_submit_opens_selected_past_blog() {
        let (mut mode, mut ctx, _rx) = setup(Vec::new());
        mode.on_update(UiUpdate::PastBlogsLoaded(Ok(vec![past("a"), past("b")])), &mut ctx);
        mode.on_user_input(UserInputEvent::Scroll(ScrollAction::LineDown), &mut ctx);
        mode.on_user_input(UserInputEvent::Scroll(ScrollAction::LineDown), &mut ctx);
        assert_eq!(mode.selected_blog(), 1);

        mode.on_user_input(UserInputEvent::Submit, &mut ctx);
        assert_eq!(mode.app.current_blog_id.as_deref(), Some("b"));
        assert_eq!(mode.loading_blog.as_deref(), Some("b"));

        mode.on_update(UiUpdate::BlogLoaded(Ok(Box::new(sample_blog("b")))), &mut ctx);
        assert_eq!(mode.route(), &Route::Blog("b".into()));
        assert!(mode.app.current_blog_from_history);
        assert!(mode.tab_lines().len() > 1);
    }

    #[tokio::test]
    async fn load_failures_become_toasts() {
        let (mut mode, mut ctx, _rx) = setup(Vec::new());
        mode.on_update(UiUpdate::PastBlogsLoaded(Err("boom".into())), &mut ctx);
        mode.on_update(UiUpdate::BlogLoaded(Err("boom".into())), &mut ctx);

        let messages: Vec<_> = mode.toasts().iter().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, vec!["Failed to load past blogs.", "Failed to load blog details."]);
    }

    #[tokio::test]
    async fn download_toast_is_replaced_by_result() {
        let (mut mode, mut ctx, _rx) = setup(Vec::new());
        mode.app.open_generated(Box::new(sample_blog("b1")));

        mode.on_user_input(UserInputEvent::Char('m'), &mut ctx);
        assert_eq!(mode.toasts().len(), 1);
        assert_eq!(mode.toasts()[0].message, "Starting download for MD...");

        mode.on_update(
            UiUpdate::DownloadFinished {
                kind: DownloadKind::Markdown,
                result: Ok(PathBuf::from("/tmp/b1.md")),
            },
            &mut ctx,
        );
        assert_eq!(mode.toasts().len(), 1);
        assert_eq!(mode.toasts()[0].message, "MD downloaded successfully!");
        assert!(mode.status_line().contains("/tmp/b1.md"));

        mode.on_update(
            UiUpdate::DownloadFinished {
                kind: DownloadKind::Bundle,
                result: Err("404".into()),
            },
            &mut ctx,
        );
        assert_eq!(mode.toasts()[1].message, "Failed to download ZIP");
    }

    #[tokio::test]
    async fn blog_view_tabs_and_escape() {
        let (mut mode, mut ctx, _rx) = setup(Vec::new());
        mode.app.open_generated(Box::new(sample_blog("b1")));
        mode.switch_tab(BlogTab::Preview);

        mode.on_user_input(UserInputEvent::NextTab, &mut ctx);
        assert_eq!(mode.active_tab(), BlogTab::Images);
        mode.on_user_input(UserInputEvent::Char('1'), &mut ctx);
        assert_eq!(mode.active_tab(), BlogTab::Plan);

        mode.on_user_input(UserInputEvent::Escape, &mut ctx);
        assert_eq!(mode.route(), &Route::Home);
    }

    #[tokio::test]
    async fn blog_route_without_blog_resolves_home_on_tick() {
        let (mut mode, _ctx, _rx) = setup(Vec::new());
        mode.app.dispatch(AppAction::Navigate(Route::Blog("ghost".into())));
        mode.on_tick(Instant::now());
        assert_eq!(mode.route(), &Route::Home);
    }

    #[test]
    fn input_editing_respects_char_boundaries() {
        let mut input = InputState {
            buffer: String::new(),
            cursor_byte: 0,
        };
        input.insert_str("héllo");
        input.cursor_byte = 3;
        input.backspace();
        assert_eq!(input.buffer, "hllo");
        assert_eq!(input.cursor_byte, 1);
        input.delete();
        assert_eq!(input.buffer, "hlo");
    }
}
