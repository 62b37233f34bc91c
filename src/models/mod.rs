pub mod customer;
pub mod invoice;
pub mod pickup;
pub mod verification;
