pub mod crd;
pub mod pki;
