pub mod interp;
pub mod transform;
