pub mod dashboard;
pub mod energy;
pub mod finance;
pub mod site;
