use crate::AircraftRequest;

/// Produces aircraft requests independently of any scheduler state
pub trait RequestSource {
    fn next_request(&mut self) -> AircraftRequest;
}
