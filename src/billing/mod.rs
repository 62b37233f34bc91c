pub mod charges;
pub mod invoice;
pub mod pdf;
