pub mod lcoe;
pub mod project;
pub mod wacc;
