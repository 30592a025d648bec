//! Modal dialogs as plain blocking calls.
//!
//! A front end implements [`Dialogs`]; each call returns only once the user
//! has answered, and exactly once per request.

#[derive(Debug, Clone, PartialEq)]
pub enum Choice<T> {
    Selected(T),
    Cancelled,
}

impl<T> Choice<T> {
    pub fn selected(self) -> Option<T> {
        match self {
            Self::Selected(value) => Some(value),
            Self::Cancelled => None,
        }
    }
}

pub trait Dialogs {
    /// Pick one of `items`; the answer is an index into it.
    fn select(&mut self, title: &str, items: &[String]) -> Choice<usize>;

    fn ask_text(&mut self, title: &str, prompt: &str) -> Choice<String>;

    fn confirm(&mut self, title: &str, question: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selected_unwraps_only_answers() {
        assert_eq!(Choice::Selected(3).selected(), Some(3));
        assert_eq!(Choice::<String>::Cancelled.selected(), None);
    }
}
