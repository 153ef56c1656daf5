pub mod handlers;
mod keyboards;
mod messages;
