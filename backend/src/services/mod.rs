pub mod notifications;

pub use notifications::PushService;
