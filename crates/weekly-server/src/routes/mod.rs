pub mod discord;
pub mod events;
pub mod progress;
pub mod tools;
pub mod trello;
pub mod webhook;
pub mod weekly;
