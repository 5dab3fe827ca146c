use super::UiUpdate;
use tokio::sync::mpsc;

use super::{context::RuntimeContext, frontend::FrontendAdapter, mode::RuntimeMode};
use std::time::Instant;

pub struct Runtime<M: RuntimeMode> {
    pub mode: M,
    update_rx: mpsc::UnboundedReceiver<UiUpdate>,
}

impl<M: RuntimeMode> Runtime<M> {
    pub fn new(mode: M, update_rx: mpsc::UnboundedReceiver<UiUpdate>) -> Self {
        Self { mode, update_rx }
    }

    /// Drive the mode until the frontend or the mode asks to quit.
    ///
    /// Each tick drains background updates, renders once, then waits briefly
    /// for input inside `poll_user_input`.
    pub async fn run<F: FrontendAdapter<M>>(&mut self, frontend: &mut F, ctx: &mut RuntimeContext) {
        loop {
            self.drain_updates(ctx);
            self.mode.on_tick(Instant::now());
            frontend.render(&self.mode);

            if frontend.should_quit() || self.mode.quit_requested() {
                break;
            }

            if let Some(input) = frontend.poll_user_input(&self.mode) {
                self.mode.on_user_input(input, ctx);
            }
            tokio::task::yield_now().await;
        }

        ctx.cancel_generation();
    }

    pub fn drain_updates(&mut self, ctx: &mut RuntimeContext) {
        while let Ok(update) = self.update_rx.try_recv() {
            self.mode.on_update(update, ctx);
        }
    }
}
