use utoipa::OpenApi;

use crate::models::{Booking, ClassView, ClientBooking, CreateBookingRequest};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        crate::handlers::list_classes,
        crate::handlers::create_booking,
        crate::handlers::list_client_bookings
    ),
    components(schemas(ClassView, Booking, ClientBooking, CreateBookingRequest)),
    tags(
        (name = "booking", description = "Fitness class booking operations")
    ),
)]
pub struct ApiDoc;
