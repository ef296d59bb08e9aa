pub mod pagination;
pub mod slug;
pub mod urls;
