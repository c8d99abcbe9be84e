pub mod encoding;
pub mod generator;
pub mod overrides;
pub mod resource_check;
pub mod resource_table;
pub mod share_check;
