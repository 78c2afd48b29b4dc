pub mod bookings;
pub mod favorites;
pub mod shows;
