// Domain layer: storefront models and the collaborator ports the workflow consumes.

pub mod model;
pub mod ports;
