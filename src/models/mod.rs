mod feed_item;
mod insight;

pub use feed_item::FeedItem;
pub use insight::InsightRow;
