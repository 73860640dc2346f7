mod cache;
mod client;
mod endpoint;
mod error;
mod schema;
mod transform;
mod types;
mod views;

pub use cache::{Clock, FreshnessCache, SystemClock};
pub use client::{HoraroClient, DEFAULT_TIMEOUT};
pub use endpoint::Endpoint;
pub use error::{EndpointError, FetchError};
pub use schema::HoraroResponse;
pub use transform::transform;
pub use types::{DailySchedule, EventInfo, Schedule, ScheduleEvent, ScheduleMeta};
pub use views::{group_by_day, upcoming, DEFAULT_UPCOMING_AMOUNT};
