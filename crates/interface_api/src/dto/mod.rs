//! Request and response bodies

pub mod wizard;
