pub mod venue;
pub mod custom_event;
pub mod event_booking;

pub use venue::{NewVenue, Venue};
pub use custom_event::{CustomEvent, EventStatus, NewCustomEvent};
pub use event_booking::{BookingContext, BookingStatus, EventBooking, NewEventBooking};
