use serde::{Deserialize, Serialize};

/// Forum node (category) a topic is posted under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Numeric id stored on indexed topics
    pub id: i64,

    /// Short URL name, e.g. `python`
    pub name: String,

    /// Display title
    pub title: Option<String>,

    /// Alternative display title
    pub title_alternative: Option<String>,
}

impl Node {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            title: None,
            title_alternative: None,
        }
    }

    pub fn with_titles(mut self, title: Option<String>, title_alternative: Option<String>) -> Self {
        self.title = title;
        self.title_alternative = title_alternative;
        self
    }
}
