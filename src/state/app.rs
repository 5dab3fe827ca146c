use crate::types::{BlogResult, PastBlog};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Blog(String),
}

#[derive(Debug, Clone)]
pub enum AppAction {
    SetCurrentBlogId(Option<String>),
    SetCurrentBlog(Option<Box<BlogResult>>),
    SetPastBlogs(Vec<PastBlog>),
    Navigate(Route),
}

/// Which article is on screen and where the user is.
#[derive(Debug, Clone)]
pub struct AppState {
    pub route: Route,
    pub current_blog_id: Option<String>,
    pub current_blog: Option<Box<BlogResult>>,
    pub past_blogs: Vec<PastBlog>,
    /// Set once the current blog was opened from the history list, where
    /// generation logs do not belong to it.
    pub current_blog_from_history: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            route: Route::Home,
            current_blog_id: None,
            current_blog: None,
            past_blogs: Vec::new(),
            current_blog_from_history: false,
        }
    }
}

impl AppState {
    pub fn dispatch(&mut self, action: AppAction) {
        match action {
            AppAction::SetCurrentBlogId(id) => self.current_blog_id = id,
            AppAction::SetCurrentBlog(blog) => {
                if let Some(blog) = &blog {
                    self.current_blog_id = Some(blog.id.clone());
                }
                self.current_blog = blog;
            }
            AppAction::SetPastBlogs(blogs) => self.past_blogs = blogs,
            AppAction::Navigate(route) => self.route = route,
        }
    }

    /// The blog view has nothing to show without a blog; fall back home
    /// unless a generation is still producing one.
    pub fn resolve_route(&mut self, is_generating: bool) -> &Route {
        if matches!(self.route, Route::Blog(_)) && self.current_blog.is_none() && !is_generating {
            self.route = Route::Home;
        }
        &self.route
    }

    pub fn open_generated(&mut self, blog: Box<BlogResult>) {
        let id = blog.id.clone();
        self.current_blog_from_history = false;
        self.dispatch(AppAction::SetCurrentBlog(Some(blog)));
        self.dispatch(AppAction::Navigate(Route::Blog(id)));
    }

    pub fn open_from_history(&mut self, blog: Box<BlogResult>) {
        let id = blog.id.clone();
        self.current_blog_from_history = true;
        self.dispatch(AppAction::SetCurrentBlog(Some(blog)));
        self.dispatch(AppAction::Navigate(Route::Blog(id)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blog_route_without_blog_falls_back_home() {
        let mut state = AppState::default();
        state.dispatch(AppAction::Navigate(Route::Blog("b1".into())));

        assert_eq!(state.resolve_route(true), &Route::Blog("b1".into()));
        assert_eq!(state.resolve_route(false), &Route::Home);
    }

    #[test]
    fn set_current_blog_id_is_independent() {
        let mut state = AppState::default();
        state.dispatch(AppAction::SetCurrentBlogId(Some("b9".into())));
        assert_eq!(state.current_blog_id.as_deref(), Some("b9"));
        assert!(state.current_blog.is_none());
    }
}
