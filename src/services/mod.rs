mod slack;

pub use slack::{SlackClient, SlackUpload};
