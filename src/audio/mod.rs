pub mod alert;
pub mod clips;
