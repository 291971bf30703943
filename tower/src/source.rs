use rand::{
    distributions::{Distribution, WeightedIndex},
    rngs::SmallRng,
    Rng, SeedableRng,
};
use schema::{AircraftRequest, CallSign, RequestKind, RequestSource, ScheduleError};

const FLIGHT_NUMBERS: std::ops::RangeInclusive<u16> = 100..=999;
const FLIGHT_ID_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Relative likelihood of each kind of generated request
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KindWeights {
    pub landing: f64,
    pub takeoff: f64,
    pub emergency_landing: f64,
}

impl Default for KindWeights {
    /// Emergencies are rare; most traffic is inbound
    fn default() -> Self {
        Self {
            landing: 0.7,
            takeoff: 0.2,
            emergency_landing: 0.1,
        }
    }
}

impl KindWeights {
    const KINDS: [RequestKind; 3] = [
        RequestKind::Landing,
        RequestKind::Takeoff,
        RequestKind::EmergencyLanding,
    ];

    fn distribution(&self) -> Result<WeightedIndex<f64>, ScheduleError> {
        let weights = [self.landing, self.takeoff, self.emergency_landing];
        if !weights.iter().all(|w| w.is_finite()) || !weights.iter().sum::<f64>().is_finite() {
            return Err(ScheduleError::InvalidWeights(format!(
                "{self:?}: weights and their total must be finite"
            )));
        }

        WeightedIndex::new(weights)
            .map_err(|e| ScheduleError::InvalidWeights(format!("{self:?}: {e}")))
    }
}

/// The three shapes a generated call sign can take
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CallSignFormat {
    /// Registration marking only, e.g. `GABCD`
    Registration,
    /// Telephony designator followed by the last four letters of a registration, e.g. `BAWBCDE`
    TelephonyRegistration,
    /// Telephony designator and flight identification, e.g. `BAW 12X4`
    FlightIdentification,
}

/// Generates random aircraft requests from an injectable RNG
#[derive(Debug)]
pub struct RandomRequestSource<R = SmallRng> {
    rng: R,
    weights: KindWeights,
    kinds: WeightedIndex<f64>,
}

impl RandomRequestSource<SmallRng> {
    /// Reproducible source, the same seed always yields the same requests
    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(SmallRng::from_entropy())
    }
}

impl<R: Rng> RandomRequestSource<R> {
    pub fn new(rng: R) -> Self {
        let weights = KindWeights::default();
        let kinds = weights.distribution().expect("default weights");

        Self {
            rng,
            weights,
            kinds,
        }
    }

    /// Generate request kinds with the provided weights instead of the defaults
    pub fn with_weights(mut self, weights: KindWeights) -> Result<Self, ScheduleError> {
        self.kinds = weights.distribution()?;
        self.weights = weights;
        Ok(self)
    }

    pub fn weights(&self) -> KindWeights {
        self.weights
    }

    fn letters(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| char::from(self.rng.gen_range(b'A'..=b'Z')))
            .collect()
    }

    fn flight_identification(&mut self) -> String {
        (0..4)
            .map(|_| char::from(FLIGHT_ID_CHARS[self.rng.gen_range(0..FLIGHT_ID_CHARS.len())]))
            .collect()
    }

    fn call_sign(&mut self) -> CallSign {
        let format = match self.rng.gen_range(0..3) {
            0 => CallSignFormat::Registration,
            1 => CallSignFormat::TelephonyRegistration,
            _ => CallSignFormat::FlightIdentification,
        };

        let call_sign = match format {
            CallSignFormat::Registration => self.letters(5),
            CallSignFormat::TelephonyRegistration => {
                let telephony = self.letters(3);
                let registration = self.letters(5);
                format!("{}{}", telephony, &registration[1..])
            }
            CallSignFormat::FlightIdentification => {
                let telephony = self.letters(3);
                format!("{} {}", telephony, self.flight_identification())
            }
        };

        CallSign::new(call_sign)
    }
}

impl<R: Rng> RequestSource for RandomRequestSource<R> {
    fn next_request(&mut self) -> AircraftRequest {
        let kind = KindWeights::KINDS[self.kinds.sample(&mut self.rng)];
        let flight_number = self.rng.gen_range(FLIGHT_NUMBERS);
        let call_sign = self.call_sign();

        AircraftRequest::new(kind, flight_number, call_sign)
    }
}
