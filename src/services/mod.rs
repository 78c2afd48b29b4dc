pub mod admin_service;
pub mod booking_service;
pub mod favorite_service;
pub mod seat_lock;
pub mod show_service;
