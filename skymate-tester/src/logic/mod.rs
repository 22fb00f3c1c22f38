pub mod journey_tester;
pub mod policy;
pub mod reports;
pub mod seeds;
pub mod tester;

pub use journey_tester::{DEFAULT_JOURNEY_SPINS, JourneyTester, SimulationPlan, SimulationSummary};
pub use policy::TravelerStrategy;
pub use seeds::resolve_seed_inputs;
pub use tester::*;
