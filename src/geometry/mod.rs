pub mod lattice;
pub mod shells;

pub use lattice::Lattice;
pub use shells::shell_offsets;
