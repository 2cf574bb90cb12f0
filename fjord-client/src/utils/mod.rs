// Utility modules

pub mod logging;
pub mod path_resolver;
pub mod querystring;
pub mod validation;
