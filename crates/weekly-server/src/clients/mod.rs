//! `reqwest` implementations of the core collaborator traits.

pub mod discord;
pub mod openai;
pub mod trello;

pub use discord::DiscordPublisher;
pub use openai::OpenAiGenerator;
pub use trello::TrelloBoards;
