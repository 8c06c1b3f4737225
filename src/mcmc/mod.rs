pub mod burnin;
pub mod flatness;
pub mod sweep;

pub use burnin::burn_in;
pub use flatness::{flatness_ratio, rebase_log_dos, FlatnessController, RebaseMode};
pub use sweep::wl_sweep;
