pub mod notification;

pub use notification::{Notification, NotificationId, RawNotification, TableNo};
