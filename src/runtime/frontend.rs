use super::mode::RuntimeMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollAction {
    LineUp,
    LineDown,
    PageUp(usize),
    PageDown(usize),
    Home,
    End,
}

/// Keyboard input after the frontend has decoded terminal events. What each
/// one means depends on the screen the mode is showing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserInputEvent {
    Char(char),
    Paste(String),
    Newline,
    Submit,
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    Scroll(ScrollAction),
    NextTab,
    PrevTab,
    Refresh,
    Escape,
    Interrupt,
}

pub trait FrontendAdapter<M: RuntimeMode> {
    fn poll_user_input(&mut self, mode: &M) -> Option<UserInputEvent>;
    fn render(&mut self, mode: &M);
    fn should_quit(&self) -> bool;
}
