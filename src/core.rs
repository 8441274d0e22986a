pub mod consumption;
pub mod cycle;
pub mod reading;
pub mod summary;
pub mod tariff;
