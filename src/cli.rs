mod ami;
mod lookup;
mod rollout;

pub use ami::AmiArgs;
pub use lookup::LookupArgs;
pub use rollout::RolloutArgs;
