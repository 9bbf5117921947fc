mod export;
mod inspect;
mod kb_services;
mod mdl;
mod mutation;
mod runner;
mod throttle;
mod verify;

#[cfg(test)]
mod test_utils;

pub use export::*;
pub use inspect::*;
pub use kb_services::*;
pub use mdl::*;
pub use mutation::*;
pub use runner::*;
pub use throttle::*;
pub use verify::*;
