// Routing segregation: public storefront, authenticated account/catalogue
// operations, and the admin nest.
pub mod admin;
pub mod authenticated;
pub mod public;
