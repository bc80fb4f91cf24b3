pub mod answers;
pub mod json_store;
pub mod learned;
pub mod schema;
