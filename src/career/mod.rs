//! Job-search helpers built on the scorer
//! Application tracking, cover letters, interview prep and search links

pub mod links;
pub mod packet;
pub mod store;
pub mod templates;
pub mod tracker;
