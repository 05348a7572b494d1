// User CRUD: repository operations over the `user` table and their HTTP handlers.

pub mod handlers;
pub mod repository;
