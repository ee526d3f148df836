pub mod matcher;
pub mod title;

pub use matcher::{eq_ignore_case, highlight, keywords_in_text, Segment};
pub use title::{split_title, TitleDisplay};
