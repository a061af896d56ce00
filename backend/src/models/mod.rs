pub mod matches;
pub mod rides;
pub mod users;

pub use matches::{MatchConfidence, MatchStatus, NewMatch, RideMatch};
pub use rides::{GenderPreference, NewRide, Ride, RideContext, RideStatus, RideWithOwner};
pub use users::{Building, Gender, User};
