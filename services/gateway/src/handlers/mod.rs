pub mod accounts;
pub mod admin;
pub mod authors;
pub mod books;
pub mod events;
