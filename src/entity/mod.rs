pub mod audit_logs;
pub mod bookings;
pub mod movies;
pub mod shows;

pub use audit_logs::Entity as AuditLogs;
pub use bookings::Entity as Bookings;
pub use movies::Entity as Movies;
pub use shows::Entity as Shows;
