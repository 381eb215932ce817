// Domain layer: catalog models, forms and the ports implemented by adapters.

pub mod forms;
pub mod model;
pub mod ports;
