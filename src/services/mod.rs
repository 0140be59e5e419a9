pub mod accessories;
pub mod computers;
pub mod labs;
pub mod notification;
pub mod parts;
pub mod reports;
pub mod resolutions;
pub mod security;
pub mod specs;
pub mod transitions;
pub mod users;

pub use notification::NotificationService;
pub use security::{decode_token, issue_token, Claims, Role};
