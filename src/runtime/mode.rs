use super::context::RuntimeContext;
use super::frontend::UserInputEvent;
use super::UiUpdate;
use std::time::Instant;

pub trait RuntimeMode {
    fn on_user_input(&mut self, input: UserInputEvent, ctx: &mut RuntimeContext);
    fn on_update(&mut self, update: UiUpdate, ctx: &mut RuntimeContext);
    fn on_tick(&mut self, _now: Instant) {}
    fn is_generating(&self) -> bool;
    fn quit_requested(&self) -> bool;
}
