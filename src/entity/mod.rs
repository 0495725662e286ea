pub mod greenhouses;
pub mod readings;
