mod parsed;

pub use parsed::ParsedAnnotation;
