// Notifier plugin implementations
pub mod discord;

pub use discord::DiscordNotifier;
