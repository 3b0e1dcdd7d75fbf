//! crew-rs runs sequential crews of role-playing agents, and two-party agent
//! chats, against any OpenAI compatible LLM provider.
pub mod agent;
pub mod chat;
pub mod config;
pub mod conversation;
pub mod crew;
pub mod demos;
pub mod llm;
pub mod persistence;
pub mod report;
pub mod task;
