// Domain layer: models, ordering rules and ports. Adapters implement the ports.

pub mod case_study;
pub mod model;
pub mod ordering;
pub mod ports;
pub mod string_list;
