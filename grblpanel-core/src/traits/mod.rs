//! Collaborator traits
//!
//! These traits define the interface between the core logic and the
//! display layer and encoder hardware.

pub mod listener;
pub mod quadrature;

pub use listener::PanelListener;
pub use quadrature::QuadratureSource;
