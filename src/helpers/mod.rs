pub(crate) mod reference;
pub(crate) mod xml;
pub(crate) mod zip;
