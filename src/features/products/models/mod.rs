mod product;

pub use product::*;
