pub mod transport;
pub mod triggerrule;
