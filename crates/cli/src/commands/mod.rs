pub mod db;
pub mod make;
pub mod migrate;
