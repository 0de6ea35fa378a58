//! Request/response DTOs for the REST surface.

pub mod booking_dto;
pub mod event_dto;
pub mod notification_dto;
pub mod user_dto;
pub mod waitlist_dto;

pub use booking_dto::{
    BookedSeatsResponse, BookingResponse, CreateBookingRequest, SeatLayoutResponse,
};
pub use event_dto::{
    AvailabilityQuery, AvailabilityResponse, CreateEventRequest, CreateEventResponse,
    TicketTypeDto,
};
pub use notification_dto::{BroadcastRequestDto, BroadcastResponse, NotificationDto};
pub use user_dto::{RegisterUserRequest, RegisterUserResponse};
pub use waitlist_dto::{JoinWaitlistRequest, WaitlistEntryResponse, WaitlistQuery};
