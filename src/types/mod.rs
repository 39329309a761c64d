pub mod filter_spec;
pub mod firms_source;
pub mod observation;
pub mod region;
pub mod weather_record;
